//! History-aware retrieval.
//!
//! Mid-conversation utterances lean on prior turns ("それでもやめたく
//! ない" means nothing without the exchange before it), so the utterance
//! is first reformulated into a standalone query against the history.
//! The very first utterance of a conversation needs no reformulation
//! and goes straight to the index.

use motiva_core::error::RetrievalError;
use motiva_core::message::Message;
use motiva_core::provider::{Provider, ProviderRequest};
use motiva_core::retrieval::{Passage, Retriever};
use motiva_core::turn::{ConversationHistory, Speaker};
use std::sync::Arc;
use tracing::debug;

const REFORMULATION_PROMPT: &str = "Given a chat history and the latest user message which might reference context in the chat history, formulate a standalone message which can be understood without the chat history. Do NOT answer the message, just reformulate it if needed and otherwise return it as is.";

/// Wraps a passage index with history-aware query reformulation.
pub struct HistoryAwareRetriever {
    provider: Arc<dyn Provider>,
    retriever: Arc<dyn Retriever>,
    model: String,
}

impl HistoryAwareRetriever {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            retriever,
            model: model.into(),
        }
    }

    /// Retrieve the top-k passages for an utterance in the context of
    /// its conversation history.
    pub async fn retrieve_for(
        &self,
        utterance: &str,
        history: &ConversationHistory,
        k: usize,
    ) -> Result<Vec<Passage>, RetrievalError> {
        let query = if history.is_empty() {
            utterance.to_string()
        } else {
            self.reformulate(utterance, history).await?
        };

        debug!(
            backend = self.retriever.name(),
            reformulated = !history.is_empty(),
            "Retrieving passages"
        );

        self.retriever.retrieve(&query, k).await
    }

    /// Rewrite the utterance into a standalone query. Runs at
    /// temperature zero for stable retrieval.
    async fn reformulate(
        &self,
        utterance: &str,
        history: &ConversationHistory,
    ) -> Result<String, RetrievalError> {
        let mut messages = vec![Message::system(REFORMULATION_PROMPT)];

        for turn in history.turns() {
            messages.push(match turn.speaker {
                Speaker::User => Message::user(&turn.text),
                Speaker::System => Message::assistant(&turn.text),
            });
        }
        messages.push(Message::user(utterance));

        let request = ProviderRequest::new(&self.model, messages, 0.0);

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| RetrievalError::Reformulation(e.to_string()))?;

        let query = response.message.content.trim().to_string();
        if query.is_empty() {
            // An empty reformulation would retrieve garbage; fall back
            // to the raw utterance.
            return Ok(utterance.to_string());
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_index::StaticIndex;
    use async_trait::async_trait;
    use motiva_core::error::ProviderError;
    use motiva_core::provider::ProviderResponse;
    use motiva_core::turn::{Stance, Strategy, Turn};
    use std::sync::Mutex;

    /// Returns a fixed reformulation and records the requests it saw.
    struct RecordingProvider {
        reply: String,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            Ok(ProviderResponse {
                message: Message::assistant(&self.reply),
                usage: None,
                model: "mock".into(),
            })
        }
    }

    fn retriever_with(
        provider: Arc<RecordingProvider>,
    ) -> HistoryAwareRetriever {
        let index = Arc::new(StaticIndex::new(vec![
            Passage::new("alcohol sustain talk reference"),
            Passage::new("exercise change talk reference"),
        ]));
        HistoryAwareRetriever::new(provider, index, "mock-model")
    }

    fn one_exchange() -> ConversationHistory {
        let (user, system) = Turn::exchange(
            "alice",
            "I drink every night",
            "Tell me more about that",
            Stance::Neutral,
            Strategy::Question,
        );
        ConversationHistory::from_chronological(vec![user, system])
    }

    #[tokio::test]
    async fn empty_history_skips_reformulation() {
        let provider = Arc::new(RecordingProvider::new("unused"));
        let retriever = retriever_with(provider.clone());

        let hits = retriever
            .retrieve_for("alcohol sustain", &ConversationHistory::default(), 2)
            .await
            .unwrap();

        assert_eq!(provider.request_count(), 0);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].content.contains("alcohol"));
    }

    #[tokio::test]
    async fn history_triggers_reformulation() {
        let provider = Arc::new(RecordingProvider::new("alcohol sustain talk"));
        let retriever = retriever_with(provider.clone());

        let hits = retriever
            .retrieve_for("I still don't want to stop", &one_exchange(), 2)
            .await
            .unwrap();

        assert_eq!(provider.request_count(), 1);
        assert!(hits[0].content.contains("alcohol"));

        let requests = provider.requests.lock().unwrap();
        let req = &requests[0];
        assert_eq!(req.temperature, 0.0);
        // system prompt + 2 history turns + the new utterance
        assert_eq!(req.messages.len(), 4);
        assert_eq!(req.messages.last().unwrap().content, "I still don't want to stop");
    }

    #[tokio::test]
    async fn blank_reformulation_falls_back_to_utterance() {
        let provider = Arc::new(RecordingProvider::new("   "));
        let retriever = retriever_with(provider.clone());

        let hits = retriever
            .retrieve_for("exercise change", &one_exchange(), 1)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert!(hits[0].content.contains("exercise"));
    }
}
