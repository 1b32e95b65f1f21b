//! The dialogue engine — one request, one exchange.
//!
//! Requests for the same conversation identity serialize through a
//! per-identity lock; different identities run fully in parallel. The
//! classify and generate stages carry an explicit timeout. History
//! load and persistence are best-effort: a failed load degrades to an
//! empty history, a failed write is logged and the reply still returned.

use motiva_core::error::{Error, ProviderError};
use motiva_core::store::{SelectorState, SelectorStateStore, TurnStore};
use motiva_core::turn::{ConversationHistory, Stance, Strategy, Turn};
use motiva_policy::StrategySelector;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::classifier::UtteranceClassifier;
use crate::generator::ResponseGenerator;

const DEFAULT_HISTORY_LIMIT: usize = 10;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The outcome of one processed exchange.
#[derive(Debug, Clone)]
pub struct EngineReply {
    /// The generated counselor reply.
    pub message: String,
    /// The stance the utterance was classified into.
    pub stance: Stance,
    /// The strategy the reply was generated under.
    pub strategy: Strategy,
}

/// Orchestrates the classify → select → generate → persist pipeline.
pub struct DialogueEngine {
    classifier: UtteranceClassifier,
    generator: ResponseGenerator,
    selector: StrategySelector,
    turn_store: Arc<dyn TurnStore>,
    state_store: Arc<dyn SelectorStateStore>,
    history_limit: usize,
    request_timeout: Duration,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DialogueEngine {
    pub fn new(
        classifier: UtteranceClassifier,
        generator: ResponseGenerator,
        selector: StrategySelector,
        turn_store: Arc<dyn TurnStore>,
        state_store: Arc<dyn SelectorStateStore>,
    ) -> Self {
        Self {
            classifier,
            generator,
            selector,
            turn_store,
            state_store,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Set how many recent turns are reloaded as history.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the timeout applied to the classify and generate stages.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Process one user utterance and produce the counselor reply.
    pub async fn respond(&self, identity: &str, input: &str) -> Result<EngineReply, Error> {
        let lock = self.lock_for(identity).await;
        let _guard = lock.lock().await;

        // History load is non-fatal: a broken store degrades to a
        // first-turn conversation rather than refusing the reply.
        let history = match self.turn_store.load_recent(identity, self.history_limit).await {
            Ok(history) => history,
            Err(e) => {
                warn!(identity, error = %e, "History load failed, continuing with empty history");
                ConversationHistory::default()
            }
        };

        let stance = self
            .timed("classification", self.classifier.classify(input, &history))
            .await?;

        let mut state = match self.state_store.load(identity).await {
            Ok(state) => state,
            Err(e) => {
                warn!(identity, error = %e, "Selector state load failed, starting fresh");
                SelectorState::default()
            }
        };

        // ThreadRng is not Send; keep it scoped between awaits.
        let strategy = {
            let mut rng = rand::rng();
            self.selector.select(&mut state, stance, &mut rng)
        };

        let message = self
            .timed("generation", self.generator.generate(input, &history, strategy))
            .await?;

        self.persist(identity, input, &message, stance, strategy, &state)
            .await;

        info!(identity, stance = %stance, strategy = %strategy, "Exchange completed");

        Ok(EngineReply {
            message,
            stance,
            strategy,
        })
    }

    /// Write the exchange and the selector state. Failures are logged,
    /// never surfaced: the reply has already been generated.
    async fn persist(
        &self,
        identity: &str,
        input: &str,
        message: &str,
        stance: Stance,
        strategy: Strategy,
        state: &SelectorState,
    ) {
        let (user_turn, system_turn) = Turn::exchange(identity, input, message, stance, strategy);

        if let Err(e) = self.turn_store.append(&user_turn, &system_turn).await {
            error!(identity, error = %e, "Failed to persist exchange");
        }

        if let Err(e) = self.state_store.persist(identity, state).await {
            error!(identity, error = %e, "Failed to persist selector state");
        }
    }

    async fn timed<T>(
        &self,
        stage: &str,
        fut: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Provider(ProviderError::Timeout(format!(
                "{stage} exceeded {}s",
                self.request_timeout.as_secs()
            )))),
        }
    }

    async fn lock_for(&self, identity: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(identity.to_string()).or_default().clone()
    }
}
