//! Retrieval-augmented stance classification.
//!
//! The utterance is classified against retrieved reference passages and
//! a talk-type-annotated rendering of the conversation history. The
//! classifier always runs at temperature zero, and its output must
//! parse to one of the three stance labels exactly.

use motiva_core::error::Error;
use motiva_core::message::Message;
use motiva_core::provider::{Provider, ProviderRequest};
use motiva_core::turn::{ConversationHistory, Speaker, Stance};
use motiva_retrieval::HistoryAwareRetriever;
use std::sync::Arc;
use tracing::debug;

const CLASSIFIER_PROMPT: &str = "You are an assistant for classification tasks. \
Use the following pieces of retrieved context to classificate the client input. \
classificationには、client_talk_typeを参考にしてください\n\n\
{context}\
classificationの種類は、neutral, change, sustainの3種類から選んでください\
出力は、neutral, change, sustainのいずれかのみを返してください\n\nin Japanese";

/// Classifies a user utterance into a stance.
pub struct UtteranceClassifier {
    provider: Arc<dyn Provider>,
    retriever: HistoryAwareRetriever,
    model: String,
    top_k: usize,
}

impl UtteranceClassifier {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: HistoryAwareRetriever,
        model: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            retriever,
            model: model.into(),
            top_k,
        }
    }

    /// Classify one utterance in the context of its history.
    pub async fn classify(
        &self,
        utterance: &str,
        history: &ConversationHistory,
    ) -> Result<Stance, Error> {
        let passages = self
            .retriever
            .retrieve_for(utterance, history, self.top_k)
            .await?;

        let context: String = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = CLASSIFIER_PROMPT.replace("{context}", &context);

        let mut messages = vec![Message::system(system)];
        messages.extend(Self::render_history(history));
        messages.push(Message::user(utterance));

        // Temperature pinned to zero for deterministic labeling.
        let request = ProviderRequest::new(&self.model, messages, 0.0);
        let response = self.provider.complete(request).await?;

        let raw = response.message.content.clone();
        let stance: Stance = raw.parse()?;

        debug!(stance = %stance, passages = passages.len(), "Utterance classified");
        Ok(stance)
    }

    /// Render history for the classifier: user turns carry their
    /// recorded talk type alongside the message, system turns reduce to
    /// the bare stance label.
    fn render_history(history: &ConversationHistory) -> Vec<Message> {
        history
            .turns()
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::User => Message::user(format!(
                    "talk_type: {}, chat_message: {}",
                    turn.stance, turn.text
                )),
                Speaker::System => Message::assistant(turn.stance.as_str()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use motiva_core::retrieval::Passage;
    use motiva_retrieval::StaticIndex;
    use motiva_core::turn::{Strategy, Turn};

    fn classifier_with(provider: Arc<ScriptedProvider>) -> UtteranceClassifier {
        let index = Arc::new(StaticIndex::new(vec![
            Passage::new("client_talk_type: sustain — お酒はやめたくない"),
            Passage::new("client_talk_type: change — 運動を始めたい"),
        ]));
        let retriever =
            HistoryAwareRetriever::new(provider.clone(), index, "mock-model");
        UtteranceClassifier::new(provider, retriever, "mock-model", 2)
    }

    #[tokio::test]
    async fn classifies_first_utterance_without_reformulation() {
        let provider = Arc::new(ScriptedProvider::new(&["sustain"]));
        let classifier = classifier_with(provider.clone());

        let stance = classifier
            .classify("お酒はやめたくない", &ConversationHistory::default())
            .await
            .unwrap();

        assert_eq!(stance, Stance::Sustain);
        // Only the classification call: reformulation skipped on empty
        // history.
        assert_eq!(provider.call_count(), 1);

        let requests = provider.requests();
        assert_eq!(requests[0].temperature, 0.0);
        let system = &requests[0].messages[0].content;
        assert!(system.contains("client_talk_type"));
        assert!(system.contains("neutral, change, sustain"));
    }

    #[tokio::test]
    async fn invalid_label_surfaces_raw_output() {
        let provider = Arc::new(ScriptedProvider::new(&["maybe"]));
        let classifier = classifier_with(provider.clone());

        let err = classifier
            .classify("どうしよう", &ConversationHistory::default())
            .await
            .unwrap_err();

        match err {
            Error::Classification(
                motiva_core::error::ClassificationError::InvalidLabel(raw),
            ) => assert_eq!(raw, "maybe"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn surrounding_whitespace_tolerated() {
        let provider = Arc::new(ScriptedProvider::new(&[" change \n"]));
        let classifier = classifier_with(provider);

        let stance = classifier
            .classify("減らしたい", &ConversationHistory::default())
            .await
            .unwrap();
        assert_eq!(stance, Stance::Change);
    }

    #[tokio::test]
    async fn history_rendered_with_talk_types() {
        // With history present: reformulation call, then classification.
        let provider = Arc::new(ScriptedProvider::new(&["お酒の話", "sustain"]));
        let classifier = classifier_with(provider.clone());

        let (user, system) = Turn::exchange(
            "alice",
            "お酒はやめたくない",
            "やめたくないのですね",
            Stance::Sustain,
            Strategy::SimpleReflection,
        );
        let history = ConversationHistory::from_chronological(vec![user, system]);

        let stance = classifier
            .classify("それでも減らしたほうがいい？", &history)
            .await
            .unwrap();
        assert_eq!(stance, Stance::Sustain);
        assert_eq!(provider.call_count(), 2);

        let requests = provider.requests();
        let classification = &requests[1];
        // system + 2 history turns + utterance
        assert_eq!(classification.messages.len(), 4);
        assert_eq!(
            classification.messages[1].content,
            "talk_type: sustain, chat_message: お酒はやめたくない"
        );
        assert_eq!(classification.messages[2].content, "sustain");
    }
}
