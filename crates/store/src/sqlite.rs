//! SQLite conversation log.
//!
//! One `chat_log` table, two rows per exchange. Timestamps are stored
//! as RFC 3339 text; `created_at DESC, id DESC` recovers newest-first
//! order even when both rows of an exchange share a timestamp.

use async_trait::async_trait;
use chrono::Utc;
use motiva_core::error::StoreError;
use motiva_core::store::TurnStore;
use motiva_core::turn::{ConversationHistory, Speaker, Stance, Strategy, Turn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// The production SQLite turn store.
pub struct SqliteTurnStore {
    pool: SqlitePool,
}

impl SqliteTurnStore {
    /// Open (or create) the database at the given path.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite turn store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                identity    TEXT NOT NULL,
                speaker     TEXT NOT NULL,
                message     TEXT NOT NULL,
                stance      TEXT NOT NULL,
                strategy    TEXT NOT NULL,
                counterpart TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("chat_log table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_log_identity_created
             ON chat_log(identity, created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("identity index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, StoreError> {
        let identity: String = row
            .try_get("identity")
            .map_err(|e| StoreError::QueryFailed(format!("identity column: {e}")))?;
        let speaker_str: String = row
            .try_get("speaker")
            .map_err(|e| StoreError::QueryFailed(format!("speaker column: {e}")))?;
        let message: String = row
            .try_get("message")
            .map_err(|e| StoreError::QueryFailed(format!("message column: {e}")))?;
        let stance_str: String = row
            .try_get("stance")
            .map_err(|e| StoreError::QueryFailed(format!("stance column: {e}")))?;
        let strategy_str: String = row
            .try_get("strategy")
            .map_err(|e| StoreError::QueryFailed(format!("strategy column: {e}")))?;
        let counterpart: String = row
            .try_get("counterpart")
            .map_err(|e| StoreError::QueryFailed(format!("counterpart column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let speaker = Speaker::from_str(&speaker_str)
            .map_err(|e| StoreError::QueryFailed(format!("speaker value: {e}")))?;
        let stance = Stance::from_str(&stance_str)
            .map_err(|e| StoreError::QueryFailed(format!("stance value: {e}")))?;
        let strategy = Strategy::from_str(&strategy_str)
            .map_err(|e| StoreError::QueryFailed(format!("strategy value: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::QueryFailed(format!("created_at value: {e}")))?;

        Ok(Turn {
            identity,
            speaker,
            text: message,
            stance,
            strategy,
            counterpart,
            created_at,
        })
    }

    async fn insert_turn<'e, E>(executor: E, turn: &Turn) -> Result<(), StoreError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO chat_log (identity, speaker, message, stance, strategy, counterpart, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&turn.identity)
        .bind(turn.speaker.as_str())
        .bind(&turn.text)
        .bind(turn.stance.as_str())
        .bind(turn.strategy.code())
        .bind(&turn.counterpart)
        .bind(turn.created_at.to_rfc3339())
        .execute(executor)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl TurnStore for SqliteTurnStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, user_turn: &Turn, system_turn: &Turn) -> Result<(), StoreError> {
        // Both rows of an exchange land atomically.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Storage(format!("BEGIN failed: {e}")))?;

        Self::insert_turn(&mut *tx, user_turn).await?;
        Self::insert_turn(&mut *tx, system_turn).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(identity = %user_turn.identity, "Exchange appended");
        Ok(())
    }

    async fn load_recent(
        &self,
        identity: &str,
        limit: usize,
    ) -> Result<ConversationHistory, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT identity, speaker, message, stance, strategy, counterpart, created_at
            FROM chat_log
            WHERE identity = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(identity)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("history load: {e}")))?;

        let turns: Vec<Turn> = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<Result<_, _>>()?;

        Ok(ConversationHistory::from_newest_first(turns))
    }

    async fn count(&self, identity: &str) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_log WHERE identity = ?1")
            .bind(identity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteTurnStore {
        SqliteTurnStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn append_writes_both_records() {
        let store = test_store().await;
        let (user, system) = Turn::exchange(
            "alice",
            "お酒はやめたくない",
            "やめたくないのですね",
            Stance::Sustain,
            Strategy::SimpleReflection,
        );

        store.append(&user, &system).await.unwrap();
        assert_eq!(store.count("alice").await.unwrap(), 2);
        assert_eq!(store.count("bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn load_recent_restores_chronology() {
        let store = test_store().await;

        let (u1, s1) = Turn::exchange("alice", "first", "reply one", Stance::Neutral, Strategy::Question);
        store.append(&u1, &s1).await.unwrap();

        // Later timestamp for the second exchange.
        let (mut u2, mut s2) =
            Turn::exchange("alice", "second", "reply two", Stance::Change, Strategy::Affirm);
        let later = u1.created_at + chrono::Duration::seconds(5);
        u2.created_at = later;
        s2.created_at = later;
        store.append(&u2, &s2).await.unwrap();

        let history = store.load_recent("alice", 10).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.turns()[0].text, "first");
        assert_eq!(history.turns()[1].text, "reply one");
        assert_eq!(history.turns()[2].text, "second");
        assert_eq!(history.turns()[3].text, "reply two");
    }

    #[tokio::test]
    async fn load_recent_respects_limit_keeping_newest() {
        let store = test_store().await;
        let base = Utc::now();
        for i in 0..6 {
            let (mut u, mut s) = Turn::exchange(
                "alice",
                format!("question {i}"),
                format!("answer {i}"),
                Stance::Neutral,
                Strategy::Question,
            );
            let at = base + chrono::Duration::seconds(i);
            u.created_at = at;
            s.created_at = at;
            store.append(&u, &s).await.unwrap();
        }

        let history = store.load_recent("alice", 4).await.unwrap();
        assert_eq!(history.len(), 4);
        // The two most recent exchanges, oldest first.
        assert_eq!(history.turns()[0].text, "question 4");
        assert_eq!(history.turns()[3].text, "answer 5");
    }

    #[tokio::test]
    async fn same_timestamp_pair_keeps_user_before_system() {
        let store = test_store().await;
        let (user, system) = Turn::exchange(
            "alice",
            "utterance",
            "reply",
            Stance::Neutral,
            Strategy::Question,
        );
        store.append(&user, &system).await.unwrap();

        let history = store.load_recent("alice", 10).await.unwrap();
        assert_eq!(history.turns()[0].speaker, Speaker::User);
        assert_eq!(history.turns()[1].speaker, Speaker::System);
    }

    #[tokio::test]
    async fn labels_round_trip() {
        let store = test_store().await;
        let (user, system) = Turn::exchange(
            "alice",
            "in",
            "out",
            Stance::Sustain,
            Strategy::AmplifiedReflection,
        );
        store.append(&user, &system).await.unwrap();

        let history = store.load_recent("alice", 10).await.unwrap();
        for turn in history.turns() {
            assert_eq!(turn.stance, Stance::Sustain);
            assert_eq!(turn.strategy, Strategy::AmplifiedReflection);
        }
        assert_eq!(history.turns()[0].counterpart, "out");
        assert_eq!(history.turns()[1].counterpart, "in");
    }

    #[tokio::test]
    async fn identities_are_isolated() {
        let store = test_store().await;
        let (u1, s1) = Turn::exchange("alice", "a", "ra", Stance::Neutral, Strategy::Question);
        let (u2, s2) = Turn::exchange("bob", "b", "rb", Stance::Change, Strategy::Affirm);
        store.append(&u1, &s1).await.unwrap();
        store.append(&u2, &s2).await.unwrap();

        let history = store.load_recent("alice", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.turns().iter().all(|t| t.identity == "alice"));
    }

    #[tokio::test]
    async fn empty_history_for_unknown_identity() {
        let store = test_store().await;
        let history = store.load_recent("nobody", 10).await.unwrap();
        assert!(history.is_empty());
    }
}
