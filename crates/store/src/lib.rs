//! Persistence backends for Motiva.
//!
//! The conversation log (SQLite in production, in-memory for tests)
//! and the keyed selector-state repositories.

pub mod in_memory;
pub mod sqlite;
pub mod state;

pub use in_memory::InMemoryTurnStore;
pub use sqlite::SqliteTurnStore;
pub use state::{InMemoryStateStore, NoopStateStore};
