//! Selector-state repositories.
//!
//! The default no-op store yields a fresh state per request, so
//! `last_strategy` resets every exchange, matching the reference
//! policy. The in-memory keyed store backs the durable-state option.

use async_trait::async_trait;
use motiva_core::error::StoreError;
use motiva_core::store::{SelectorState, SelectorStateStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Always loads a fresh state and persists nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStateStore;

#[async_trait]
impl SelectorStateStore for NoopStateStore {
    async fn load(&self, _identity: &str) -> Result<SelectorState, StoreError> {
        Ok(SelectorState::default())
    }

    async fn persist(&self, _identity: &str, _state: &SelectorState) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Keyed in-process selector state, kept for the life of the server.
#[derive(Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<String, SelectorState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SelectorStateStore for InMemoryStateStore {
    async fn load(&self, identity: &str) -> Result<SelectorState, StoreError> {
        let states = self.states.read().await;
        Ok(states.get(identity).cloned().unwrap_or_default())
    }

    async fn persist(&self, identity: &str, state: &SelectorState) -> Result<(), StoreError> {
        let mut states = self.states.write().await;
        states.insert(identity.to_string(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiva_core::turn::Strategy;

    #[tokio::test]
    async fn noop_store_always_fresh() {
        let store = NoopStateStore;
        let mut state = store.load("alice").await.unwrap();
        state.record(Strategy::Question);
        store.persist("alice", &state).await.unwrap();

        let reloaded = store.load("alice").await.unwrap();
        assert_eq!(reloaded.turn_count, 0);
        assert!(reloaded.current_strategy.is_none());
    }

    #[tokio::test]
    async fn in_memory_store_keyed_by_identity() {
        let store = InMemoryStateStore::new();
        let mut state = store.load("alice").await.unwrap();
        state.record(Strategy::Affirm);
        store.persist("alice", &state).await.unwrap();

        let alice = store.load("alice").await.unwrap();
        assert_eq!(alice.current_strategy, Some(Strategy::Affirm));
        assert_eq!(alice.turn_count, 1);

        let bob = store.load("bob").await.unwrap();
        assert_eq!(bob.turn_count, 0);
    }
}
