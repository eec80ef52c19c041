//! # Flocking Agents
//!
//! The boids themselves. Every agent walks along directed edges of a
//! [`SegmentedGraph`](flocking_core::segmented::SegmentedGraph) and never
//! lands in a full segment.
//!
//! - **Explorer** - wanders from the start node until its path satisfies the goal
//! - **Achiever** - loops a goal tour forever and imitates visible peers with shorter tours
//! - **Chain** - explorer variant that propagates "cities checked" chains until edges saturate
//!
//! Agents hold no reference to the population. Each step receives a
//! [`TickContext`](context::TickContext) and returns a
//! [`StepOutcome`](agent::StepOutcome) for the population to apply.

pub mod traits;
pub mod context;
pub mod motion;
pub mod selection;
pub mod explorer;
pub mod achiever;
pub mod chain;
pub mod agent;
pub mod prelude;
