//! # Flocking Core
//!
//! Shared model for the flocking heuristic: the weighted graph the boids
//! travel on, the capacity-limited segments that keep them spread out, and
//! the tours and goals that decide when a walk is a solution.
//!
//! - [`graph::DistanceGraph`] - symmetric integer distances, backed by petgraph
//! - [`segmented::SegmentedGraph`] - per-edge segment chains with occupancy counters
//! - [`tour::Tour`] - ordered node sequence with a lazily computed cost
//! - [`goal::GoalEvaluator`] - end-node and closed-tour acceptance
//! - [`instances`] - seeded problem generators
//!
//! ## Quick Start
//!
//! ```rust
//! use flocking_core::prelude::*;
//!
//! let graph = flocking_core::instances::basic();
//! let mut tour = Tour::from_locations(vec![0, 1, 2, 3]);
//! assert_eq!(tour.calculate_cost(&graph).unwrap(), 37);
//! assert!(EndNodeGoal::new(3).is_goal(&graph, &tour));
//! ```

pub mod types;
pub mod segment;
pub mod graph;
pub mod segmented;
pub mod tour;
pub mod goal;
pub mod ledger;
pub mod instances;
pub mod error;
pub mod prelude;
