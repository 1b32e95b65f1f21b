//! Persistence traits — the turn log and the selector state repository.
//!
//! The turn store is append-only and best-effort: write failures are
//! logged by the pipeline and never abort the response. The selector
//! state store is the explicit keyed repository behind the optional
//! durable-policy-state feature; the default no-op store reproduces the
//! reference behavior of a fresh `SelectorState` per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::turn::{ConversationHistory, Strategy, Turn};

/// The conversation log capability.
///
/// Implementations: SQLite, in-memory (for testing).
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// The backend name (e.g. "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Write both records of a completed exchange.
    async fn append(
        &self,
        user_turn: &Turn,
        system_turn: &Turn,
    ) -> std::result::Result<(), StoreError>;

    /// Fetch the most recent `limit` turns for a conversation identity,
    /// returned in chronological order (oldest first) regardless of how
    /// the backend orders them.
    async fn load_recent(
        &self,
        identity: &str,
        limit: usize,
    ) -> std::result::Result<ConversationHistory, StoreError>;

    /// Total persisted turns for an identity.
    async fn count(&self, identity: &str) -> std::result::Result<usize, StoreError>;
}

/// Mutable state of the strategy selector.
///
/// `last_strategy` is written on every selection but only consulted
/// when repeat avoidance is explicitly enabled; by default it carries
/// no behavioral effect, matching the reference policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorState {
    /// Selections made with this state.
    pub turn_count: u32,

    /// The strategy selected before the current one, if any.
    pub last_strategy: Option<Strategy>,

    /// The most recent selection result.
    pub current_strategy: Option<Strategy>,
}

impl SelectorState {
    /// Record a completed selection.
    pub fn record(&mut self, strategy: Strategy) {
        self.turn_count += 1;
        self.last_strategy = self.current_strategy;
        self.current_strategy = Some(strategy);
    }
}

/// Keyed repository for per-conversation selector state.
///
/// Load-before-use, persist-after-use. The no-op implementation yields
/// a fresh state every request.
#[async_trait]
pub trait SelectorStateStore: Send + Sync {
    /// Load the state for an identity, or a fresh default when absent.
    async fn load(&self, identity: &str) -> std::result::Result<SelectorState, StoreError>;

    /// Persist the state for an identity.
    async fn persist(
        &self,
        identity: &str,
        state: &SelectorState,
    ) -> std::result::Result<(), StoreError>;
}
