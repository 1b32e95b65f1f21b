//! Reply generation under the MI persona.
//!
//! The system message is the persona with the selected strategy's
//! instructions spliced in; the conversation history follows as plain
//! alternating messages, then the new utterance.

use motiva_core::error::Error;
use motiva_core::message::Message;
use motiva_core::provider::{Provider, ProviderRequest};
use motiva_core::turn::{ConversationHistory, Speaker, Strategy};
use motiva_policy::{Persona, StrategyTemplates};
use std::sync::Arc;
use tracing::debug;

/// Generates the counselor reply for an exchange.
pub struct ResponseGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    persona: Persona,
    templates: StrategyTemplates,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            persona: Persona::builtin(),
            templates: StrategyTemplates::builtin(),
        }
    }

    /// Replace the built-in persona.
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Replace the built-in templates.
    pub fn with_templates(mut self, templates: StrategyTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Generate a reply to the utterance under the given strategy.
    pub async fn generate(
        &self,
        utterance: &str,
        history: &ConversationHistory,
        strategy: Strategy,
    ) -> Result<String, Error> {
        let instructions = self.templates.resolve(strategy)?;
        let system = self.persona.render(instructions);

        let mut messages = vec![Message::system(system)];
        for turn in history.turns() {
            messages.push(match turn.speaker {
                Speaker::User => Message::user(&turn.text),
                Speaker::System => Message::assistant(&turn.text),
            });
        }
        messages.push(Message::user(utterance));

        let request = ProviderRequest::new(&self.model, messages, self.temperature);
        let response = self.provider.complete(request).await?;

        let reply = response.message.content;
        debug!(strategy = %strategy, reply_len = reply.len(), "Reply generated");
        Ok(reply)
    }
}
