//! Backtracking tracer over saturated edges.
//!
//! In chain tracing the flock marks a route by jamming it: an edge whose
//! segments (all but the last) are full is part of the chain. The tracer
//! walks only such edges from the start node, depth first, until the goal
//! accepts the walk.

use flocking_core::goal::GoalEvaluator;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::tour::Tour;
use std::collections::HashSet;

/// Default node budget of one trace.
pub const DEFAULT_MAX_EXPANSIONS: usize = 100_000;

pub struct SolutionBacktracker<'a> {
    graph: &'a SegmentedGraph,
    goal: &'a dyn GoalEvaluator,
    start_node: usize,
    max_expansions: usize,
    expansions: usize,
}

impl<'a> SolutionBacktracker<'a> {
    pub fn new(graph: &'a SegmentedGraph, goal: &'a dyn GoalEvaluator, start_node: usize) -> Self {
        Self {
            graph,
            goal,
            start_node,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            expansions: 0,
        }
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Partial walks examined so far.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Neighbours of `node` reached over a saturated edge, closest first.
    pub fn saturated_neighbors(&self, node: usize) -> Vec<usize> {
        self.graph
            .graph()
            .closest_neighbors(node)
            .into_iter()
            .filter(|&n| self.graph.edge(node, n).is_some_and(|e| self.graph.is_edge_full(&e)))
            .collect()
    }

    /// One two-node walk per saturated edge leaving the start node.
    pub fn root(&self) -> Vec<Tour> {
        self.saturated_neighbors(self.start_node)
            .into_iter()
            .map(|n| Tour::from_locations(vec![self.start_node, n]))
            .collect()
    }

    /// Walks that only go around in circles.
    ///
    /// Rejects a walk ending in `Y, X, Y, X`, and a walk that repeats a step
    /// `l -> s` where `l` is a node's last appearance before the end.
    pub fn reject(tour: &Tour) -> bool {
        let t = tour.locations();
        let n = t.len();
        if n >= 4 && t[n - 1] == t[n - 3] && t[n - 2] == t[n - 4] {
            return true;
        }

        let mut seen = HashSet::new();
        for last in (0..n).rev() {
            let node = t[last];
            if !seen.insert(node) || last + 1 >= n {
                continue;
            }
            let successor = t[last + 1];
            if (1..last).rev().any(|i| t[i] == successor && t[i - 1] == node) {
                return true;
            }
        }
        false
    }

    pub fn accept(&self, tour: &Tour) -> bool {
        self.goal.is_goal(self.graph.graph(), tour)
    }

    /// Saturated next steps. Unvisited nodes come first, closest first;
    /// visited ones follow in the order the walk first reached them.
    pub fn candidate_successors(&self, tour: &Tour) -> Vec<usize> {
        let Some(last) = tour.last() else {
            return Vec::new();
        };
        let (mut fresh, mut visited): (Vec<usize>, Vec<usize>) =
            self.saturated_neighbors(last).into_iter().partition(|&n| !tour.contains(n));
        visited.sort_by_key(|&n| tour.index_of(n));
        fresh.append(&mut visited);
        fresh
    }

    /// First accepted walk in depth-first order, or `None` if there is none
    /// or the budget runs out.
    pub fn trace(&mut self) -> Option<Tour> {
        self.expansions = 0;
        for mut tour in self.root() {
            if let Some(found) = self.search(&mut tour) {
                return Some(found);
            }
            if self.exhausted() {
                break;
            }
        }
        None
    }

    fn exhausted(&self) -> bool {
        self.expansions >= self.max_expansions
    }

    fn search(&mut self, tour: &mut Tour) -> Option<Tour> {
        if self.exhausted() {
            return None;
        }
        self.expansions += 1;
        if Self::reject(tour) {
            return None;
        }
        if self.accept(tour) {
            return Some(tour.clone());
        }
        for next in self.candidate_successors(tour) {
            tour.offer(next);
            let found = self.search(tour);
            tour.pop_last();
            if found.is_some() {
                return found;
            }
            if self.exhausted() {
                return None;
            }
        }
        None
    }
}
