//! Stochastic counseling strategy selection.
//!
//! Two-stage draw: first between the reflection and non-reflection
//! branches, then a weighted choice within the branch using a weight
//! table conditioned on the classified stance. The tables are fixed at
//! construction and validated once.
//!
//! Properties of the tables:
//! - MR carries weight zero in every reflection table and is never
//!   selected. The code stays in the enumeration for when the weights
//!   are revisited.
//! - AF carries weight zero under sustain, so sustain talk is never
//!   answered with an affirmation.
//! - Under change talk the reflection branch collapses to SiR and SuR.

use motiva_core::error::PolicyError;
use motiva_core::store::SelectorState;
use motiva_core::turn::{Stance, Strategy};
use rand::Rng;
use tracing::debug;

use crate::weighted::WeightedChoice;

/// Probability of the reflection branch.
pub const DEFAULT_REFLECTION_PROBABILITY: f64 = 0.66;

/// The stance-conditioned strategy selector.
pub struct StrategySelector {
    reflection_probability: f64,
    avoid_repeat: bool,
    reflection_sustain: WeightedChoice,
    reflection_change: WeightedChoice,
    reflection_neutral: WeightedChoice,
    non_reflection_sustain: WeightedChoice,
    non_reflection_other: WeightedChoice,
}

impl StrategySelector {
    /// Build a selector with the standard weight tables.
    pub fn new(reflection_probability: f64, avoid_repeat: bool) -> Result<Self, PolicyError> {
        if !(0.0..=1.0).contains(&reflection_probability) {
            return Err(PolicyError::InvalidWeights(format!(
                "reflection probability {reflection_probability} outside [0, 1]"
            )));
        }

        Ok(Self {
            reflection_probability,
            avoid_repeat,
            reflection_sustain: WeightedChoice::new(vec![1, 2, 0, 2, 1])?,
            reflection_change: WeightedChoice::new(vec![1, 0, 0, 0, 1])?,
            reflection_neutral: WeightedChoice::new(vec![1, 1, 0, 1, 1])?,
            non_reflection_sustain: WeightedChoice::new(vec![0, 1, 1, 1, 1, 1])?,
            non_reflection_other: WeightedChoice::new(vec![2, 1, 1, 1, 1, 1])?,
        })
    }

    /// Select a strategy for the given stance and record it on the
    /// state. `last_strategy` is always written; it only feeds back
    /// into the draw when repeat avoidance is enabled.
    pub fn select<R: Rng + ?Sized>(
        &self,
        state: &mut SelectorState,
        stance: Stance,
        rng: &mut R,
    ) -> Strategy {
        let branch_draw: f64 = rng.random();

        let (candidates, table): (&[Strategy], &WeightedChoice) =
            if branch_draw < self.reflection_probability {
                (&Strategy::REFLECTIONS, self.reflection_table(stance))
            } else {
                (&Strategy::NON_REFLECTIONS, self.non_reflection_table(stance))
            };

        let draw: f64 = rng.random();

        let index = if self.avoid_repeat {
            self.pick_avoiding(candidates, table, state.current_strategy, draw)
        } else {
            table.pick(draw)
        };

        let strategy = candidates[index];
        state.record(strategy);

        debug!(stance = %stance, strategy = %strategy, "Strategy selected");
        strategy
    }

    /// Pick with the previous strategy's weight zeroed. When zeroing
    /// would empty the branch, the unmodified table is used instead.
    fn pick_avoiding(
        &self,
        candidates: &[Strategy],
        table: &WeightedChoice,
        previous: Option<Strategy>,
        draw: f64,
    ) -> usize {
        let Some(previous) = previous else {
            return table.pick(draw);
        };
        let Some(position) = candidates.iter().position(|s| *s == previous) else {
            return table.pick(draw);
        };

        let mut weights = table.weights().to_vec();
        weights[position] = 0;

        match WeightedChoice::new(weights) {
            Ok(adjusted) => adjusted.pick(draw),
            Err(_) => table.pick(draw),
        }
    }

    fn reflection_table(&self, stance: Stance) -> &WeightedChoice {
        match stance {
            Stance::Sustain => &self.reflection_sustain,
            Stance::Change => &self.reflection_change,
            Stance::Neutral => &self.reflection_neutral,
        }
    }

    fn non_reflection_table(&self, stance: Stance) -> &WeightedChoice {
        match stance {
            Stance::Sustain => &self.non_reflection_sustain,
            Stance::Change | Stance::Neutral => &self.non_reflection_other,
        }
    }
}
