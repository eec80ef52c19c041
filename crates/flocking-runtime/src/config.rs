//! Solve parameters and simulation tunables.

use flocking_agents::context::DEFAULT_MARGIN;
use flocking_agents::traits::AgentTraits;
use flocking_core::error::{FlockError, Result};
use flocking_core::graph::DistanceGraph;
use serde::{Deserialize, Serialize};

/// Parameters of one solve attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveParams {
    /// Explorers spawned per tick; fractions accumulate (default: 1.0).
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,
    /// Population cap (default: 400).
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
    /// Share of the population that must follow one tour (default: 0.7).
    #[serde(default = "default_density_threshold")]
    pub density_threshold: f64,
    /// Exponent on inverse edge length in edge scoring (default: 1.0).
    #[serde(default = "default_weight")]
    pub distance_weight: f64,
    /// Exponent on free capacity in edge scoring (default: 1.0).
    #[serde(default = "default_weight")]
    pub occupancy_weight: f64,
    /// How far agents see peers (default: 4.0).
    #[serde(default = "default_vision_range")]
    pub vision_range: f64,
    /// Base speed before jitter (default: 2.0).
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Tick budget (default: 1000).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// RNG seed; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_spawn_rate() -> f64 {
    1.0
}

fn default_max_agents() -> usize {
    400
}

fn default_density_threshold() -> f64 {
    0.7
}

fn default_weight() -> f64 {
    1.0
}

fn default_vision_range() -> f64 {
    4.0
}

fn default_speed() -> f64 {
    2.0
}

fn default_max_iterations() -> u64 {
    1000
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            spawn_rate: default_spawn_rate(),
            max_agents: default_max_agents(),
            density_threshold: default_density_threshold(),
            distance_weight: default_weight(),
            occupancy_weight: default_weight(),
            vision_range: default_vision_range(),
            speed: default_speed(),
            max_iterations: default_max_iterations(),
            seed: None,
        }
    }
}

impl SolveParams {
    /// Defaults with the population cap scaled to fifty agents per node.
    pub fn for_graph(graph: &DistanceGraph) -> Self {
        Self {
            max_agents: 50 * graph.node_count(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_agents(mut self, max_agents: usize) -> Self {
        self.max_agents = max_agents;
        self
    }

    /// Traits handed to every spawned agent before jitter.
    pub fn traits(&self) -> AgentTraits {
        AgentTraits {
            speed: self.speed,
            vision_range: self.vision_range,
            distance_weight: self.distance_weight,
            occupancy_weight: self.occupancy_weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.spawn_rate.is_finite() && self.spawn_rate >= 0.0) {
            return Err(FlockError::invalid_config("spawn_rate", self.spawn_rate, "must be a non-negative number"));
        }
        if self.max_agents == 0 {
            return Err(FlockError::invalid_config("max_agents", 0, "must be at least 1"));
        }
        if !(self.density_threshold > 0.0 && self.density_threshold <= 1.0) {
            return Err(FlockError::out_of_range("density_threshold", self.density_threshold, 0.0, 1.0));
        }
        for (field, value) in [
            ("distance_weight", self.distance_weight),
            ("occupancy_weight", self.occupancy_weight),
            ("vision_range", self.vision_range),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlockError::invalid_config(field, value, "must be a non-negative number"));
            }
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(FlockError::invalid_config("speed", self.speed, "must be positive"));
        }
        Ok(())
    }
}

/// Tunables that rarely change between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Node every explorer starts from (default: 0).
    #[serde(default)]
    pub start_node: usize,
    /// Retries when the spawn segment is full (default: 10).
    #[serde(default = "default_spawn_attempts")]
    pub spawn_attempts: u32,
    /// Relative spread of spawned speeds (default: 0.2).
    #[serde(default = "default_speed_jitter")]
    pub speed_jitter: f64,
    /// Gap kept before a full segment (default: 0.01).
    #[serde(default = "default_movement_margin")]
    pub movement_margin: f64,
    /// Spawning pauses once achievers exceed `live / achiever_ratio` (default: 3).
    #[serde(default = "default_achiever_ratio")]
    pub achiever_ratio: usize,
    /// Node budget of the backtracking tracer (default: 100 000).
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

fn default_spawn_attempts() -> u32 {
    10
}

fn default_speed_jitter() -> f64 {
    0.2
}

fn default_movement_margin() -> f64 {
    DEFAULT_MARGIN
}

fn default_achiever_ratio() -> usize {
    3
}

fn default_max_expansions() -> usize {
    100_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_node: 0,
            spawn_attempts: default_spawn_attempts(),
            speed_jitter: default_speed_jitter(),
            movement_margin: default_movement_margin(),
            achiever_ratio: default_achiever_ratio(),
            max_expansions: default_max_expansions(),
        }
    }
}

impl SimulationConfig {
    pub fn with_start_node(mut self, start_node: usize) -> Self {
        self.start_node = start_node;
        self
    }

    /// Check the tunables against the graph they will run on.
    pub fn validate(&self, graph: &DistanceGraph) -> Result<()> {
        if self.start_node >= graph.node_count() {
            return Err(FlockError::node_out_of_range(self.start_node, graph.node_count()));
        }
        if graph.neighbors(self.start_node).is_empty() {
            return Err(FlockError::invalid_config("start_node", self.start_node, "has no neighbours"));
        }
        if !(0.0..1.0).contains(&self.speed_jitter) {
            return Err(FlockError::out_of_range("speed_jitter", self.speed_jitter, 0.0, 1.0));
        }
        if !(self.movement_margin.is_finite() && self.movement_margin > 0.0) {
            return Err(FlockError::invalid_config("movement_margin", self.movement_margin, "must be positive"));
        }
        if self.achiever_ratio == 0 {
            return Err(FlockError::invalid_config("achiever_ratio", 0, "must be at least 1"));
        }
        Ok(())
    }
}
