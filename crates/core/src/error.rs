//! Error types for the Motiva domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. The failure policy
//! is asymmetric by design: retrieval, classification, and generation
//! errors abort the request, while persistence errors are recorded and
//! swallowed so the caller still receives the generated reply.

use thiserror::Error;

use crate::turn::Strategy;

/// The top-level error type for all Motiva operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation backend errors (fatal) ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Retrieval errors (fatal) ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Classification errors (fatal) ---
    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    // --- Strategy policy errors (construction-time) ---
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    // --- Template resolution errors (fatal) ---
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    // --- Persistence errors (non-fatal at the pipeline level) ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures in the retrieval context provider. Always fatal to the
/// request — no reply may be generated from an unclassified utterance.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Query reformulation failed: {0}")]
    Reformulation(String),

    #[error("Passage fetch failed: {0}")]
    Fetch(String),

    #[error("Retrieval timed out: {0}")]
    Timeout(String),
}

/// Failures in stance classification.
#[derive(Debug, Clone, Error)]
pub enum ClassificationError {
    /// The generation backend produced a label outside the stance
    /// enumeration. Must never be silently coerced to a default stance.
    #[error("Classifier produced a label outside the stance enumeration: {0:?}")]
    InvalidLabel(String),
}

/// Failures in the strategy selection policy. Weight tables are fixed
/// at selector construction, so these are construction-time errors and
/// unreachable during request processing.
#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("Invalid weight table: {0}")]
    InvalidWeights(String),
}

/// Failures resolving a strategy label to its instructional template.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    /// A strategy in the enumeration has no template. Signals an
    /// enumeration-mismatch bug and must fail loudly, never substitute
    /// empty text.
    #[error("No template registered for strategy {0}")]
    Missing(Strategy),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_status() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn invalid_label_preserves_raw_output() {
        let err = Error::Classification(ClassificationError::InvalidLabel("maybe".into()));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn template_error_names_strategy() {
        let err = Error::Template(TemplateError::Missing(Strategy::MetaphoricalReflection));
        assert!(err.to_string().contains("MR"));
    }
}
