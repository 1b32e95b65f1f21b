//! Speech collaborator traits — speech-to-text and text-to-speech.
//!
//! These sit outside the core pipeline: the gateway uses them to accept
//! spoken input and to voice replies, but classification, selection,
//! and generation never touch audio.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Speech conversion capability.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Transcribe raw audio bytes into text.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: &str,
    ) -> std::result::Result<String, ProviderError>;

    /// Synthesize speech for the given text, returning encoded audio
    /// bytes (mp3).
    async fn synthesize(&self, text: &str) -> std::result::Result<Vec<u8>, ProviderError>;
}
