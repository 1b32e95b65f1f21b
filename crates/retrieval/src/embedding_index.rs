//! Embedding-backed passage index.
//!
//! Embeds every reference passage once at build time, then answers
//! queries by embedding the query and ranking passages by cosine
//! similarity.

use async_trait::async_trait;
use motiva_core::error::RetrievalError;
use motiva_core::provider::{EmbeddingRequest, Provider};
use motiva_core::retrieval::{Passage, Retriever};
use std::sync::Arc;
use tracing::{debug, info};

use crate::vector::rank_passages;

/// A passage index backed by provider embeddings.
pub struct EmbeddingIndex {
    provider: Arc<dyn Provider>,
    model: String,
    passages: Vec<(Passage, Vec<f32>)>,
}

impl EmbeddingIndex {
    /// Build an index by embedding all passages up front.
    pub async fn build(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        passages: Vec<Passage>,
    ) -> Result<Self, RetrievalError> {
        let model = model.into();

        if passages.is_empty() {
            return Ok(Self {
                provider,
                model,
                passages: Vec::new(),
            });
        }

        let inputs: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
        let response = provider
            .embed(EmbeddingRequest {
                model: model.clone(),
                inputs,
            })
            .await
            .map_err(|e| RetrievalError::Fetch(format!("Passage embedding failed: {e}")))?;

        if response.embeddings.len() != passages.len() {
            return Err(RetrievalError::Fetch(format!(
                "Embedding count mismatch: {} passages, {} embeddings",
                passages.len(),
                response.embeddings.len()
            )));
        }

        let indexed: Vec<(Passage, Vec<f32>)> =
            passages.into_iter().zip(response.embeddings).collect();

        info!(passages = indexed.len(), model = %model, "Embedding index built");

        Ok(Self {
            provider,
            model,
            passages: indexed,
        })
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[async_trait]
impl Retriever for EmbeddingIndex {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if self.passages.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(|e| RetrievalError::Fetch(format!("Query embedding failed: {e}")))?;

        let query_embedding = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Fetch("No embedding returned for query".into()))?;

        let hits = rank_passages(&self.passages, &query_embedding, k);
        debug!(query_len = query.len(), hits = hits.len(), "Passages retrieved");
        Ok(hits)
    }
}

/// Load reference passages from a JSON file.
///
/// The file holds an array of `{"content": ..., "source": ...}` objects,
/// `source` optional.
pub fn load_passages_file(path: &std::path::Path) -> Result<Vec<Passage>, RetrievalError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RetrievalError::Fetch(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| RetrievalError::Fetch(format!("Failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiva_core::error::ProviderError;
    use motiva_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};

    /// Embeds each text as a fixed vector keyed by a marker word.
    struct KeywordEmbedder;

    #[async_trait]
    impl Provider for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword_embedder"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("embeddings only".into()))
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            let embeddings = request
                .inputs
                .iter()
                .map(|text| {
                    if text.contains("sustain") {
                        vec![1.0, 0.0, 0.0]
                    } else if text.contains("change") {
                        vec![0.0, 1.0, 0.0]
                    } else {
                        vec![0.0, 0.0, 1.0]
                    }
                })
                .collect();
            Ok(EmbeddingResponse {
                embeddings,
                model: request.model,
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn build_and_retrieve() {
        let passages = vec![
            Passage::new("sustain talk defends the status quo"),
            Passage::new("change talk voices motivation to change"),
            Passage::new("neutral utterances show no clear lean"),
        ];
        let index = EmbeddingIndex::build(Arc::new(KeywordEmbedder), "test-model", passages)
            .await
            .unwrap();
        assert_eq!(index.len(), 3);

        let hits = index.retrieve("this is sustain", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].content.contains("sustain"));
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn empty_index_returns_nothing() {
        let index = EmbeddingIndex::build(Arc::new(KeywordEmbedder), "test-model", vec![])
            .await
            .unwrap();
        assert!(index.is_empty());
        let hits = index.retrieve("anything", 2).await.unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn passages_file_parses() {
        let json = r#"[
            {"content": "client sustain talk examples", "source": "manual.md"},
            {"content": "client change talk examples"}
        ]"#;
        let passages: Vec<Passage> = serde_json::from_str(json).unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].source.as_deref(), Some("manual.md"));
        assert!(passages[1].source.is_none());
    }
}
