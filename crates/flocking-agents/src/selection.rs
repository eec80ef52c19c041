//! Weighted roulette-wheel selection.

use rand::{Rng, RngCore};

/// Items with normalized probabilities, sorted ascending.
#[derive(Debug, Clone)]
pub struct RouletteWheel<T> {
    slots: Vec<(T, f64)>,
}

impl<T> RouletteWheel<T> {
    /// Build a wheel from raw scores. Scores that are not strictly positive
    /// and finite are dropped. Returns `None` when nothing survives.
    pub fn from_scores(scored: impl IntoIterator<Item = (T, f64)>) -> Option<Self> {
        let mut slots: Vec<(T, f64)> = scored
            .into_iter()
            .filter(|(_, score)| score.is_finite() && *score > 0.0)
            .collect();
        if slots.is_empty() {
            return None;
        }
        let total: f64 = slots.iter().map(|(_, s)| s).sum();
        for (_, s) in &mut slots {
            *s /= total;
        }
        slots.sort_by(|a, b| a.1.total_cmp(&b.1));
        Some(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Normalized `(item, probability)` pairs in ascending probability.
    pub fn slots(&self) -> &[(T, f64)] {
        &self.slots
    }

    /// Pick the first slot whose cumulative probability exceeds a uniform
    /// roll.
    pub fn spin(&self, rng: &mut dyn RngCore) -> &T {
        let rolled: f64 = rng.random::<f64>();
        let mut cumulative = 0.0;
        for (item, p) in &self.slots {
            cumulative += p;
            if cumulative > rolled {
                return item;
            }
        }
        // Rounding can leave the sum a hair under the roll.
        &self.slots[self.slots.len() - 1].0
    }
}

/// Score every candidate and spin once. `None` if no score is positive.
pub fn select<T: Clone>(
    candidates: &[T],
    mut score: impl FnMut(&T) -> f64,
    rng: &mut dyn RngCore,
) -> Option<T> {
    let wheel = RouletteWheel::from_scores(candidates.iter().map(|c| (c.clone(), score(c))))?;
    Some(wheel.spin(rng).clone())
}
