//! Core domain types and traits for Motiva.
//!
//! Motiva is a turn-based dialogue orchestrator for a
//! motivational-interviewing agent. This crate defines the value objects
//! that flow through the pipeline (stances, strategies, turns, messages)
//! and the capability traits the orchestrator depends on (generation
//! backend, retrieval context provider, turn store, speech adapters).
//!
//! No I/O happens here — implementations live in sibling crates.

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod speech;
pub mod store;
pub mod turn;

pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::Provider;
pub use retrieval::{Passage, Retriever};
pub use speech::SpeechProvider;
pub use store::{SelectorState, SelectorStateStore, TurnStore};
pub use turn::{ConversationHistory, Speaker, Stance, Strategy, Turn};
