//! Flocking Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use flocking_core::prelude::*;
//! ```

pub use crate::types::{Color, Edge, Position, Tick};
pub use crate::segment::Segment;
pub use crate::graph::DistanceGraph;
pub use crate::segmented::{CapacityOverride, EdgeOccupancy, GraphSettings, SegmentRef, SegmentedGraph};
pub use crate::tour::Tour;
pub use crate::goal::{EndNodeGoal, GoalEvaluator, GoalKind, TspGoal};
pub use crate::ledger::TourLedger;

// Re-export error types
pub use crate::error::{AgentError, ConfigError, FlockError, GraphError, OccupancyError, Result};
