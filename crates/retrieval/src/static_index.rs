//! Keyword-overlap passage index for tests and offline development.
//!
//! No provider calls: passages are scored by the fraction of query
//! words they contain.

use async_trait::async_trait;
use motiva_core::error::RetrievalError;
use motiva_core::retrieval::{Passage, Retriever};

/// A passage index that scores by keyword overlap.
pub struct StaticIndex {
    passages: Vec<Passage>,
}

impl StaticIndex {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    fn overlap_score(query: &str, passage: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let passage_lower = passage.to_lowercase();
        let words: Vec<&str> = query_lower.split_whitespace().collect();

        if words.is_empty() {
            return 0.0;
        }

        let hits = words
            .iter()
            .filter(|w| passage_lower.contains(**w))
            .count();
        hits as f32 / words.len() as f32
    }
}

#[async_trait]
impl Retriever for StaticIndex {
    fn name(&self) -> &str {
        "static"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let mut scored: Vec<Passage> = self
            .passages
            .iter()
            .map(|p| {
                let mut scored = p.clone();
                scored.score = Self::overlap_score(query, &p.content);
                scored
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}
