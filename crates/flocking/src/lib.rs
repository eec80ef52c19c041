//! # Flocking
//!
//! A boid flocking heuristic for shortest paths and closed tours on
//! weighted graphs.
//!
//! Every edge is cut into segments of bounded capacity. Explorer agents
//! wander out of the start node, picking edges by length and free room,
//! until their trail satisfies the goal. They then become achievers that
//! loop their tour and copy any shorter tour they see a neighbour follow.
//! The run ends once one tour is followed by enough of the flock.
//!
//! ## Quick Start
//!
//! ```rust
//! use flocking::prelude::*;
//! use flocking::core::instances;
//!
//! let problem = Problem::new(instances::basic(), GraphSettings::default());
//! let goal = EndNodeGoal::new(3);
//! let params = SolveParams::default().with_seed(42).with_max_agents(60);
//!
//! if let Some(tour) = problem.solve(params, &goal).unwrap() {
//!     println!("{}", tour);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`flocking_core`] - graph model, segments, tours, goals and errors
//! - [`flocking_agents`] - explorer, achiever and chain agents
//! - [`flocking_runtime`] - population, tick loop, tracer and observers
//!
//! ## Variants
//!
//! | Variant | Agents | Ends when |
//! |---------|--------|-----------|
//! | Consensus | explorers, then achievers | one tour reaches the density threshold |
//! | Chain tracing | chain agents | the backtracker reads a goal tour off saturated edges |

pub use flocking_agents as agents;
pub use flocking_core as core;
pub use flocking_runtime as runtime;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// ```rust
/// use flocking::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use flocking_core::types::{Color, Edge, Position, Tick};
    pub use flocking_core::graph::DistanceGraph;
    pub use flocking_core::segmented::{GraphSettings, SegmentedGraph};
    pub use flocking_core::tour::Tour;
    pub use flocking_core::goal::{EndNodeGoal, GoalEvaluator, GoalKind, TspGoal};

    // Error types
    pub use flocking_core::error::{FlockError, Result};

    // Agents
    pub use flocking_agents::agent::{Agent, AgentKind, StepOutcome};
    pub use flocking_agents::traits::AgentTraits;

    // Runtime
    pub use flocking_runtime::chain_tracing::{ChainTracing, ChainTracingSimulation};
    pub use flocking_runtime::config::{SimulationConfig, SolveParams};
    pub use flocking_runtime::observer::{
        NullObserver, ObserverEvent, RecordingObserver, SimulationObserver, TracingObserver,
    };
    pub use flocking_runtime::population::{AgentId, Population};
    pub use flocking_runtime::problem::{Problem, SolveOutcome};
    pub use flocking_runtime::simulation::Simulation;
    pub use flocking_runtime::stats::{AgentFrame, RunStats};
    pub use flocking_runtime::variant::{Consensus, Variant};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn version_is_set() {
        assert!(!super::VERSION.is_empty());
    }

    #[test]
    fn prelude_solves_the_basic_instance() {
        let problem = Problem::new(crate::core::instances::basic(), GraphSettings::default());
        let params = SolveParams::default().with_seed(42).with_max_agents(60).with_max_iterations(5000);
        let tour = problem.solve(params, &EndNodeGoal::new(3)).unwrap();
        assert!(tour.is_some());
    }
}
