//! Retriever trait — the abstraction over the reference-passage index.
//!
//! The orchestrator only needs two things from a retrieval backend:
//! fetch the top-k passages for a query, ranked by relevance. Query
//! reformulation against history lives above this trait, in the
//! retrieval crate's history-aware wrapper.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A reference passage returned by the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// The passage text.
    pub content: String,

    /// Where the passage came from (document name, URL, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Relevance score, higher = better.
    #[serde(default)]
    pub score: f32,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
            score: 0.0,
        }
    }
}

/// The passage index capability.
///
/// Implementations: embedding index (cosine over provider embeddings),
/// static keyword index for tests and offline development.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g. "embedding", "static").
    fn name(&self) -> &str;

    /// Fetch the top-k passages for a query, best first. Returns at
    /// most `k` passages; fewer when the index is small.
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<Passage>, RetrievalError>;
}
