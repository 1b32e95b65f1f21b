//! The Motiva dialogue pipeline.
//!
//! One request flows through a strict sequence: load history, classify
//! the utterance's stance, select a counseling strategy, generate the
//! reply under the persona and strategy template, persist the exchange.
//! Requests for the same conversation identity are serialized.

pub mod classifier;
pub mod engine;
pub mod generator;

#[cfg(test)]
pub mod test_helpers;

pub use classifier::UtteranceClassifier;
pub use engine::{DialogueEngine, EngineReply};
pub use generator::ResponseGenerator;
