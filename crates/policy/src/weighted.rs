//! Weighted random choice over a fixed candidate list.

use motiva_core::error::PolicyError;

/// A validated weight table over candidate indices.
///
/// Selection walks the cumulative weights with a strict less-than
/// comparison, so a draw landing exactly on a region boundary resolves
/// to the later candidate, and zero-weight candidates are unreachable.
/// The final candidate is the fallback for any residual draw.
#[derive(Debug, Clone)]
pub struct WeightedChoice {
    weights: Vec<u32>,
    total: u32,
}

impl WeightedChoice {
    /// Validate a weight table. At least one weight must be positive.
    pub fn new(weights: Vec<u32>) -> Result<Self, PolicyError> {
        if weights.is_empty() {
            return Err(PolicyError::InvalidWeights("weight table is empty".into()));
        }

        let total: u32 = weights.iter().sum();
        if total == 0 {
            return Err(PolicyError::InvalidWeights(
                "weight table sums to zero".into(),
            ));
        }

        Ok(Self { weights, total })
    }

    /// Map a uniform draw in [0, 1) to a candidate index.
    pub fn pick(&self, draw: f64) -> usize {
        let mut remaining = draw * self.total as f64;

        for (i, &w) in self.weights.iter().enumerate() {
            if remaining < w as f64 {
                return i;
            }
            remaining -= w as f64;
        }

        self.weights.len() - 1
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }
}
