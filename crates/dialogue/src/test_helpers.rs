//! Shared test helpers for pipeline tests.

use async_trait::async_trait;
use motiva_core::error::{ProviderError, StoreError};
use motiva_core::message::Message;
use motiva_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use motiva_core::store::TurnStore;
use motiva_core::turn::{ConversationHistory, Turn};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses and
/// records every request it saw.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
    call_count: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            responses: Mutex::new(texts.iter().map(|t| make_text_response(t)).collect()),
            requests: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        self.requests.lock().unwrap().push(request);
        let response = responses[*count].clone();
        *count += 1;
        Ok(response)
    }
}

/// A provider that stalls longer than any reasonable request timeout.
pub struct StallingProvider;

#[async_trait]
impl Provider for StallingProvider {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(make_text_response("unreachable"))
    }
}

/// A turn store whose writes always fail. Reads succeed and are empty.
#[derive(Default)]
pub struct FailingTurnStore;

#[async_trait]
impl TurnStore for FailingTurnStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn append(&self, _user_turn: &Turn, _system_turn: &Turn) -> Result<(), StoreError> {
        Err(StoreError::Storage("disk on fire".into()))
    }

    async fn load_recent(
        &self,
        _identity: &str,
        _limit: usize,
    ) -> Result<ConversationHistory, StoreError> {
        Ok(ConversationHistory::default())
    }

    async fn count(&self, _identity: &str) -> Result<usize, StoreError> {
        Ok(0)
    }
}

/// A turn store whose reads fail too.
#[derive(Default)]
pub struct UnreadableTurnStore;

#[async_trait]
impl TurnStore for UnreadableTurnStore {
    fn name(&self) -> &str {
        "unreadable"
    }

    async fn append(&self, _user_turn: &Turn, _system_turn: &Turn) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load_recent(
        &self,
        _identity: &str,
        _limit: usize,
    ) -> Result<ConversationHistory, StoreError> {
        Err(StoreError::QueryFailed("connection refused".into()))
    }

    async fn count(&self, _identity: &str) -> Result<usize, StoreError> {
        Err(StoreError::QueryFailed("connection refused".into()))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
