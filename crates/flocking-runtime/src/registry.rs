//! Tour registry - follower counts of achiever tours.

use flocking_core::ledger::TourLedger;
use flocking_core::tour::Tour;
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

/// Maps each tour followed by at least one achiever to its follower count.
///
/// Tours whose count drops to zero are forgotten.
#[derive(Debug, Clone, Default)]
pub struct TourRegistry {
    followers: HashMap<Tour, usize>,
}

impl TourRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, tour: &Tour) -> usize {
        self.followers.get(tour).copied().unwrap_or(0)
    }

    /// Number of distinct tours.
    pub fn len(&self) -> usize {
        self.followers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }

    /// Sum of all follower counts.
    pub fn total_followers(&self) -> usize {
        self.followers.values().sum()
    }

    /// All tours, least followed first. Ties put the costlier tour first so
    /// the favourite always ends the list.
    pub fn tours_by_population(&self) -> Vec<(Tour, usize)> {
        let mut entries: Vec<(Tour, usize)> = self.followers.iter().map(|(t, c)| (t.clone(), *c)).collect();
        entries.sort_by(|a, b| preference((&a.0, a.1), (&b.0, b.1)));
        entries
    }

    /// The tour with the most followers. Ties go to the cheaper tour, then
    /// to the lexicographically smaller one.
    pub fn most_popular(&self) -> Option<(&Tour, usize)> {
        self.followers
            .iter()
            .map(|(t, c)| (t, *c))
            .max_by(|a, b| preference(*a, *b))
    }

    pub fn clear(&mut self) {
        self.followers.clear();
    }
}

/// Ascending preference: fewer followers, then higher cost, then the
/// lexicographically larger tour.
fn preference(a: (&Tour, usize), b: (&Tour, usize)) -> Ordering {
    let key = |(tour, count): (&Tour, usize)| (count, Reverse(tour.last_calculated_cost().unwrap_or(u64::MAX)));
    key(a).cmp(&key(b)).then_with(|| b.0.cmp(a.0))
}

impl TourLedger for TourRegistry {
    fn register_tour(&mut self, tour: &Tour) {
        *self.followers.entry(tour.clone()).or_insert(0) += 1;
    }

    fn unregister_tour(&mut self, tour: &Tour) {
        if let Some(count) = self.followers.get_mut(tour) {
            *count -= 1;
            if *count == 0 {
                self.followers.remove(tour);
            }
        }
    }
}
