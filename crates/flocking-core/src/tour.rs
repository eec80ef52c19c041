//! Tours - ordered node sequences with a cached cost.

use crate::error::{FlockError, Result};
use crate::graph::DistanceGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An ordered list of node indices.
///
/// Equality, hashing and ordering use only the location sequence, so the
/// cached cost never splits two otherwise identical tours in the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tour {
    locations: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost: Option<u64>,
}

impl Tour {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_locations(locations: Vec<usize>) -> Self {
        Self { locations, cost: None }
    }

    /// Append a node. Invalidates the cached cost.
    pub fn offer(&mut self, node: usize) {
        self.locations.push(node);
        self.cost = None;
    }

    /// Remove the last node. Invalidates the cached cost.
    pub fn pop_last(&mut self) -> Option<usize> {
        self.cost = None;
        self.locations.pop()
    }

    pub fn clear(&mut self) {
        self.locations.clear();
        self.cost = None;
    }

    pub fn locations(&self) -> &[usize] {
        &self.locations
    }

    pub fn first(&self) -> Option<usize> {
        self.locations.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.locations.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.locations.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.locations.contains(&node)
    }

    pub fn index_of(&self, node: usize) -> Option<usize> {
        self.locations.iter().position(|&n| n == node)
    }

    /// True if every node `0..node_count` appears at least once.
    pub fn visits_all(&self, node_count: usize) -> bool {
        let mut seen = vec![false; node_count];
        for &n in &self.locations {
            if let Some(slot) = seen.get_mut(n) {
                *slot = true;
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Sum of the `len - 1` edge lengths along the tour.
    pub fn cost(&self, graph: &DistanceGraph) -> Result<u64> {
        self.locations.windows(2).try_fold(0u64, |total, pair| {
            graph
                .edge_length(pair[0], pair[1])
                .map(|length| total + length as u64)
                .ok_or_else(|| FlockError::edge_not_found(pair[0], pair[1]))
        })
    }

    /// Compute the cost and cache it.
    pub fn calculate_cost(&mut self, graph: &DistanceGraph) -> Result<u64> {
        let cost = self.cost(graph)?;
        self.cost = Some(cost);
        Ok(cost)
    }

    /// Cached cost from the last [`Tour::calculate_cost`].
    pub fn last_calculated_cost(&self) -> Option<u64> {
        self.cost
    }

    /// Rotate a closed tour so it starts and ends at node 0, then orient it
    /// so the second node is the smaller of the two neighbours of 0.
    /// Open tours, tours already starting at 0, and tours without node 0
    /// are left alone.
    pub fn shift_to_zero(&mut self) {
        let n = self.locations.len();
        if n <= 2 || self.locations[0] == 0 || self.locations[0] != self.locations[n - 1] {
            return;
        }
        let Some(zero) = self.index_of(0) else {
            return;
        };
        let mut shifted = Vec::with_capacity(n);
        shifted.extend_from_slice(&self.locations[zero..]);
        shifted.extend_from_slice(&self.locations[1..zero]);
        shifted.push(0);
        if shifted[1] > shifted[shifted.len() - 2] {
            shifted.reverse();
        }
        self.locations = shifted;
    }
}

impl PartialEq for Tour {
    fn eq(&self, other: &Self) -> bool {
        self.locations == other.locations
    }
}

impl Eq for Tour {}

impl Hash for Tour {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.locations.hash(state);
    }
}

impl PartialOrd for Tour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.locations.cmp(&other.locations)
    }
}

impl From<Vec<usize>> for Tour {
    fn from(locations: Vec<usize>) -> Self {
        Self::from_locations(locations)
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.locations.iter().map(|n| n.to_string()).collect();
        match self.cost {
            Some(cost) => write!(f, "[{}] (length: {}, size: {})", path.join(" -> "), cost, self.len()),
            None => write!(f, "[{}] (size: {})", path.join(" -> "), self.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances;

    #[test]
    fn cost_sums_consecutive_edges() {
        let g = instances::basic();
        let mut tour = Tour::from_locations(vec![0, 1, 4, 3]);
        assert_eq!(tour.calculate_cost(&g).unwrap(), 10 + 20 + 9);
        assert_eq!(tour.last_calculated_cost(), Some(39));
    }

    #[test]
    fn cost_of_short_tours_is_zero() {
        let g = instances::basic();
        assert_eq!(Tour::new().cost(&g).unwrap(), 0);
        assert_eq!(Tour::from_locations(vec![2]).cost(&g).unwrap(), 0);
    }

    #[test]
    fn cost_with_missing_edge_fails() {
        let g = instances::basic();
        assert!(Tour::from_locations(vec![0, 3]).cost(&g).is_err());
    }

    #[test]
    fn offer_invalidates_cached_cost() {
        let g = instances::basic();
        let mut tour = Tour::from_locations(vec![0, 1]);
        tour.calculate_cost(&g).unwrap();
        tour.offer(2);
        assert_eq!(tour.last_calculated_cost(), None);
    }

    #[test]
    fn equality_ignores_cost_but_not_order() {
        let g = instances::basic();
        let mut a = Tour::from_locations(vec![0, 1, 2]);
        a.calculate_cost(&g).unwrap();
        let b = Tour::from_locations(vec![0, 1, 2]);
        assert_eq!(a, b);
        assert_ne!(a, Tour::from_locations(vec![2, 1, 0]));
    }

    #[test]
    fn shift_to_zero_rotates_closed_tour() {
        let mut tour = Tour::from_locations(vec![2, 3, 0, 1, 2]);
        tour.shift_to_zero();
        assert_eq!(tour.locations(), &[0, 1, 2, 3, 0]);
    }

    #[test]
    fn shift_to_zero_orients_smaller_neighbour_first() {
        let mut tour = Tour::from_locations(vec![3, 0, 1, 2, 3]);
        tour.shift_to_zero();
        // Rotation gives 0,1,2,3,0 which already has 1 < 3.
        assert_eq!(tour.locations(), &[0, 1, 2, 3, 0]);

        let mut tour = Tour::from_locations(vec![1, 0, 3, 2, 1]);
        tour.shift_to_zero();
        assert_eq!(tour.locations(), &[0, 1, 2, 3, 0]);
    }

    #[test]
    fn shift_to_zero_leaves_open_tours() {
        let mut tour = Tour::from_locations(vec![2, 0, 1]);
        tour.shift_to_zero();
        assert_eq!(tour.locations(), &[2, 0, 1]);
    }

    #[test]
    fn visits_all_checks_every_node() {
        assert!(Tour::from_locations(vec![0, 2, 1, 0]).visits_all(3));
        assert!(!Tour::from_locations(vec![0, 2, 0]).visits_all(3));
    }

    #[test]
    fn display_includes_length_once_known() {
        let g = instances::basic();
        let mut tour = Tour::from_locations(vec![0, 1]);
        assert_eq!(tour.to_string(), "[0 -> 1] (size: 2)");
        tour.calculate_cost(&g).unwrap();
        assert_eq!(tour.to_string(), "[0 -> 1] (length: 10, size: 2)");
    }
}
