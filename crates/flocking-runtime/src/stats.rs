//! Run statistics and per-tick agent frames.

use crate::population::AgentId;
use flocking_agents::agent::AgentKind;
use flocking_core::types::{Color, Position, Tick};
use serde::{Deserialize, Serialize};

/// Counters accumulated over one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub ticks: Tick,
    pub spawned: u64,
    /// Spawn slots dropped because every attempted segment was full.
    pub skipped_spawns: u64,
    pub died: u64,
    pub promoted: u64,
    /// Tours adopted from visible peers.
    pub adoptions: u64,
    pub peak_population: usize,
    pub converged: bool,
}

/// One agent as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentFrame {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Position,
    pub color: Color,
}
