//! Counseling strategy policy for Motiva.
//!
//! Stochastic strategy selection over fixed stance-conditioned weight
//! tables, plus the instructional templates and persona prompt that
//! turn a selected strategy into generation guidance.

pub mod persona;
pub mod selector;
pub mod templates;
pub mod weighted;

pub use persona::Persona;
pub use selector::StrategySelector;
pub use templates::StrategyTemplates;
pub use weighted::WeightedChoice;
