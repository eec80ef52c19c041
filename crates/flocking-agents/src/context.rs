//! Per-step context handed to agents.

use flocking_core::goal::GoalEvaluator;
use flocking_core::ledger::TourLedger;
use flocking_core::segmented::SegmentedGraph;
use rand::RngCore;

/// How far short of a segment end an agent stops when it cannot enter the
/// next one.
pub const DEFAULT_MARGIN: f64 = 0.01;

/// Everything an agent may touch during one step.
pub struct TickContext<'a> {
    /// Occupancy counters. Agents move only through the walker, which keeps
    /// them consistent.
    pub graph: &'a mut SegmentedGraph,
    /// Follower counts of achiever tours.
    pub ledger: &'a mut dyn TourLedger,
    pub goal: &'a dyn GoalEvaluator,
    pub rng: &'a mut dyn RngCore,
    pub margin: f64,
}
