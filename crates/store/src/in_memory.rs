//! In-memory turn store for tests and offline development.

use async_trait::async_trait;
use motiva_core::error::StoreError;
use motiva_core::store::TurnStore;
use motiva_core::turn::{ConversationHistory, Turn};
use tokio::sync::RwLock;

/// A turn store backed by a Vec. Append order stands in for the
/// autoincrement id the SQLite backend uses as a tiebreaker.
#[derive(Default)]
pub struct InMemoryTurnStore {
    turns: RwLock<Vec<Turn>>,
}

impl InMemoryTurnStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TurnStore for InMemoryTurnStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, user_turn: &Turn, system_turn: &Turn) -> Result<(), StoreError> {
        let mut turns = self.turns.write().await;
        turns.push(user_turn.clone());
        turns.push(system_turn.clone());
        Ok(())
    }

    async fn load_recent(
        &self,
        identity: &str,
        limit: usize,
    ) -> Result<ConversationHistory, StoreError> {
        let turns = self.turns.read().await;
        let newest_first: Vec<Turn> = turns
            .iter()
            .rev()
            .filter(|t| t.identity == identity)
            .take(limit)
            .cloned()
            .collect();
        Ok(ConversationHistory::from_newest_first(newest_first))
    }

    async fn count(&self, identity: &str) -> Result<usize, StoreError> {
        let turns = self.turns.read().await;
        Ok(turns.iter().filter(|t| t.identity == identity).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiva_core::turn::{Stance, Strategy};

    #[tokio::test]
    async fn append_and_reload() {
        let store = InMemoryTurnStore::new();
        let (u1, s1) = Turn::exchange("alice", "one", "r1", Stance::Neutral, Strategy::Question);
        let (u2, s2) = Turn::exchange("alice", "two", "r2", Stance::Change, Strategy::Affirm);
        store.append(&u1, &s1).await.unwrap();
        store.append(&u2, &s2).await.unwrap();

        let history = store.load_recent("alice", 10).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.turns()[0].text, "one");
        assert_eq!(history.turns()[3].text, "r2");
        assert_eq!(store.count("alice").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn limit_keeps_newest() {
        let store = InMemoryTurnStore::new();
        for i in 0..5 {
            let (u, s) = Turn::exchange(
                "alice",
                format!("q{i}"),
                format!("a{i}"),
                Stance::Neutral,
                Strategy::Question,
            );
            store.append(&u, &s).await.unwrap();
        }

        let history = store.load_recent("alice", 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].text, "q4");
        assert_eq!(history.turns()[1].text, "a4");
    }
}
