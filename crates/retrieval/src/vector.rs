//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and passage ranking used by the
//! embedding index.

use motiva_core::retrieval::Passage;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank passages by cosine similarity to a query embedding.
///
/// Returns the top `limit` passages sorted by descending similarity,
/// with `score` set to the cosine similarity value.
pub fn rank_passages(
    passages: &[(Passage, Vec<f32>)],
    query_embedding: &[f32],
    limit: usize,
) -> Vec<Passage> {
    let mut scored: Vec<(f32, Passage)> = passages
        .iter()
        .map(|(passage, embedding)| {
            let sim = cosine_similarity(embedding, query_embedding);
            let mut p = passage.clone();
            p.score = sim;
            (sim, p)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn rank_returns_best_first() {
        let passages = vec![
            (Passage::new("far"), vec![0.0, 1.0]),
            (Passage::new("near"), vec![1.0, 0.1]),
            (Passage::new("middle"), vec![0.7, 0.7]),
        ];
        let ranked = rank_passages(&passages, &[1.0, 0.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].content, "near");
        assert_eq!(ranked[1].content, "middle");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn rank_limit_exceeds_index() {
        let passages = vec![(Passage::new("only"), vec![1.0, 0.0])];
        let ranked = rank_passages(&passages, &[1.0, 0.0], 5);
        assert_eq!(ranked.len(), 1);
    }
}
