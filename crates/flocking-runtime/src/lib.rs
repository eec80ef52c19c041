//! # Flocking Runtime
//!
//! Runs the flock. A [`Problem`](problem::Problem) pairs a distance graph
//! with segment settings; each solve builds a fresh
//! [`Simulation`](simulation::Simulation) that owns the segmented graph and
//! the [`Population`](population::Population).
//!
//! Each tick:
//! 1. Explorers spawn at the start node while there is room and achievers
//!    are still a minority
//! 2. Every agent live at tick start takes one step, in handle order
//! 3. Dead agents are removed and promoted explorers become achievers
//! 4. The variant's convergence check runs (tour density, or the
//!    backtracking tracer for chain tracing)

pub mod config;
pub mod registry;
pub mod population;
pub mod spawn;
pub mod observer;
pub mod stats;
pub mod variant;
pub mod simulation;
pub mod backtracker;
pub mod chain_tracing;
pub mod problem;
pub mod prelude;
