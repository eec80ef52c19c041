//! Agent traits - the per-boid movement and selection parameters.
//!
//! Every spawned explorer gets a copy of the run's traits with its speed
//! jittered, so the flock does not move in lockstep.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Movement and selection parameters of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTraits {
    /// Distance covered per tick.
    pub speed: f64,
    /// How far ahead the agent sees peers.
    pub vision_range: f64,
    /// Exponent on inverse edge length when scoring edges.
    pub distance_weight: f64,
    /// Exponent on free capacity when scoring edges.
    pub occupancy_weight: f64,
}

impl Default for AgentTraits {
    fn default() -> Self {
        Self {
            speed: 2.0,
            vision_range: 4.0,
            distance_weight: 1.0,
            occupancy_weight: 1.0,
        }
    }
}

impl AgentTraits {
    /// Copy with speed scaled by a uniform factor in `[1 - jitter, 1 + jitter)`.
    pub fn jittered(&self, jitter: f64, rng: &mut dyn RngCore) -> Self {
        let factor = 1.0 + rng.random::<f64>() * 2.0 * jitter - jitter;
        Self {
            speed: self.speed * factor,
            ..*self
        }
    }
}
