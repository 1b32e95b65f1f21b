//! Configuration loading, validation, and management for Motiva.
//!
//! Loads configuration from `~/.motiva/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.motiva/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default generation provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model used for reply generation
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Temperature for reply generation
    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f32,

    /// Model used for classification and query reformulation.
    /// Classification always runs at temperature 0.
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Timeout applied to each external call (reformulation, retrieval,
    /// classification, generation), in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Dialogue pipeline configuration
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Strategy policy configuration
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Turn store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Speech adapter configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_generation_model() -> String {
    "gpt-4o-mini".into()
}
fn default_generation_temperature() -> f32 {
    0.7
}
fn default_classifier_model() -> String {
    "gpt-4o-mini".into()
}
fn default_request_timeout_secs() -> u64 {
    60
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("generation_model", &self.generation_model)
            .field("generation_temperature", &self.generation_temperature)
            .field("classifier_model", &self.classifier_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("dialogue", &self.dialogue)
            .field("policy", &self.policy)
            .field("retrieval", &self.retrieval)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("speech", &self.speech)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Dialogue pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// How many recent turns to reload as history per request.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Override the built-in MI persona system prompt. The persona must
    /// contain the `{strategy_instructions}` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_override: Option<String>,
}

fn default_history_limit() -> usize {
    10
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            persona_override: None,
        }
    }
}

/// Strategy policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Probability of drawing a reflection strategy.
    #[serde(default = "default_reflection_probability")]
    pub reflection_probability: f64,

    /// When true, the immediately prior strategy's weight is zeroed
    /// before each draw. Off by default — the reference policy writes
    /// `last_strategy` but never consults it.
    #[serde(default)]
    pub avoid_repeat: bool,

    /// Keep selector state per conversation identity instead of fresh
    /// per request. Required for avoid_repeat to act across turns.
    #[serde(default)]
    pub durable_state: bool,
}

fn default_reflection_probability() -> f64 {
    0.66
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reflection_probability: default_reflection_probability(),
            avoid_repeat: false,
            durable_state: false,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Index backend: "embedding" or "static".
    #[serde(default = "default_retrieval_backend")]
    pub backend: String,

    /// Embedding model for the embedding index.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Passages to retrieve per classification.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// JSON file of reference passages to load into the index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passages_file: Option<String>,
}

fn default_retrieval_backend() -> String {
    "embedding".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_top_k() -> usize {
    2
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: default_retrieval_backend(),
            embedding_model: default_embedding_model(),
            top_k: default_top_k(),
            passages_file: None,
        }
    }
}

/// Turn store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "sqlite" or "in_memory".
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path.
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_store_path() -> String {
    "~/.motiva/chat_log.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

/// Gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8741
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Speech adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Whether the gateway exposes the stt/tts endpoints.
    #[serde(default)]
    pub enabled: bool,

    /// Transcription model.
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Synthesis model.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Synthesis voice.
    #[serde(default = "default_tts_voice")]
    pub voice: String,

    /// Directory synthesized audio files are written to.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

fn default_stt_model() -> String {
    "whisper-1".into()
}
fn default_tts_model() -> String {
    "tts-1".into()
}
fn default_tts_voice() -> String {
    "alloy".into()
}
fn default_media_dir() -> String {
    "~/.motiva/media".into()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            voice: default_tts_voice(),
            media_dir: default_media_dir(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.motiva/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `MOTIVA_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("MOTIVA_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("MOTIVA_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("MOTIVA_MODEL") {
            config.generation_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".motiva")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation_temperature < 0.0 || self.generation_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "generation_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.policy.reflection_probability) {
            return Err(ConfigError::ValidationError(
                "policy.reflection_probability must be within [0.0, 1.0]".into(),
            ));
        }

        if self.dialogue.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "dialogue.history_limit must be at least 1".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available, either top-level or on any
    /// provider entry. `load()` has already folded the env vars in.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Expand a leading `~/` in a configured path.
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            dirs_home().join(rest)
        } else {
            PathBuf::from(path)
        }
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            generation_model: default_generation_model(),
            generation_temperature: default_generation_temperature(),
            classifier_model: default_classifier_model(),
            request_timeout_secs: default_request_timeout_secs(),
            dialogue: DialogueConfig::default(),
            policy: PolicyConfig::default(),
            retrieval: RetrievalConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            speech: SpeechConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
