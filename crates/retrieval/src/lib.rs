//! Retrieval context provider for Motiva.
//!
//! Supplies the classifier with reference passages: a query (the raw
//! utterance, or a history-aware reformulation of it) is matched
//! against a passage index and the top-k hits are injected into the
//! classification prompt.

pub mod embedding_index;
pub mod history_aware;
pub mod static_index;
pub mod vector;

pub use embedding_index::{EmbeddingIndex, load_passages_file};
pub use history_aware::HistoryAwareRetriever;
pub use static_index::StaticIndex;
pub use vector::{cosine_similarity, rank_passages};
