//! LLM and speech provider implementations for Motiva.
//!
//! Every backend speaks the OpenAI-compatible API surface, so a single
//! implementation covers OpenAI, OpenRouter, Ollama, vLLM, and friends.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config, build_speech_provider};
