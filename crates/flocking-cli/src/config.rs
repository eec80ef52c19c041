//! Configuration management for the flock CLI.

use anyhow::{Context, Result};
use flocking::core::instances;
use flocking::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "flocking.toml";

/// Project configuration, read from `flocking.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub instance: InstanceConfig,
    #[serde(default)]
    pub graph: GraphSettings,
    #[serde(default)]
    pub solve: SolveParams,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Which graph to generate and what to look for on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default)]
    pub kind: InstanceKind,
    #[serde(default = "default_cities")]
    pub cities: usize,
    /// Seed of the instance generator, independent of the solve seed.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub variant: VariantKind,
    #[serde(default)]
    pub goal: GoalKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    /// The fixed five-node shortest-path graph
    Basic,
    /// Complete graph with random lengths
    #[default]
    FullyConnected,
    /// Random graph where every node has degree two or more
    Sparse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Achievers converge on the densest tour
    #[default]
    Consensus,
    /// Chain agents jam a route and the backtracker traces it
    ChainTracing,
}

fn default_cities() -> usize {
    8
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            kind: InstanceKind::default(),
            cities: default_cities(),
            seed: 0,
            variant: VariantKind::default(),
            goal: GoalKind::default(),
        }
    }
}

impl InstanceConfig {
    pub fn build_graph(&self) -> Result<DistanceGraph> {
        let graph = match self.kind {
            InstanceKind::Basic => instances::basic(),
            InstanceKind::FullyConnected => instances::fully_connected(self.cities, self.seed),
            InstanceKind::Sparse => instances::sparse(self.cities, self.seed)
                .with_context(|| format!("Failed to generate sparse instance with {} cities", self.cities))?,
        };
        Ok(graph)
    }
}

impl Config {
    /// Load config from flocking.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find flocking.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_round_trips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.instance.cities, 8);
        assert_eq!(parsed.solve, SolveParams::default());
        assert_eq!(parsed.graph, GraphSettings::default());
    }

    #[test]
    fn partial_file_takes_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [instance]
            kind = "basic"
            goal = { kind = "end_node", node = 3 }

            [solve]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(parsed.instance.kind, InstanceKind::Basic);
        assert_eq!(parsed.instance.goal, GoalKind::EndNode { node: 3 });
        assert_eq!(parsed.solve.seed, Some(42));
        assert_eq!(parsed.solve.max_agents, 400);
        assert_eq!(parsed.simulation, SimulationConfig::default());
    }

    #[test]
    fn basic_instance_has_five_nodes() {
        let instance = InstanceConfig { kind: InstanceKind::Basic, ..InstanceConfig::default() };
        assert_eq!(instance.build_graph().unwrap().node_count(), 5);
    }
}
