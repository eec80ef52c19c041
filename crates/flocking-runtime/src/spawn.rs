//! Spawn policies - where new explorers enter the graph.

use flocking_core::error::{FlockError, Result};
use flocking_core::segmented::SegmentedGraph;
use flocking_core::types::Position;
use rand::{Rng, RngCore};

/// Picks the position of the next spawned agent.
pub trait SpawnPolicy {
    /// A free position, or `None` when every attempt hit a full segment.
    fn spawn_position(&mut self, graph: &SegmentedGraph, rng: &mut dyn RngCore) -> Result<Option<Position>>;
}

/// Spawn on an edge leaving the start node.
///
/// The first attempt uses the start of a random neighbouring edge. When its
/// first segment is full, up to `attempts` further tries pick a random edge
/// and a random offset along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartNodeSpawn {
    pub start_node: usize,
    pub attempts: u32,
}

impl StartNodeSpawn {
    pub fn new(start_node: usize, attempts: u32) -> Self {
        Self { start_node, attempts }
    }

    fn random_position(&self, graph: &SegmentedGraph, rng: &mut dyn RngCore, at_start: bool) -> Result<Position> {
        let neighbors = graph.graph().neighbors(self.start_node);
        if neighbors.is_empty() {
            return Err(FlockError::invalid_config("start_node", self.start_node, "has no neighbours"));
        }
        let to = neighbors[rng.random_range(0..neighbors.len())];
        let edge = graph
            .edge(self.start_node, to)
            .ok_or_else(|| FlockError::edge_not_found(self.start_node, to))?;
        let distance = if at_start { 0.0 } else { rng.random::<f64>() * f64::from(edge.length()) };
        Ok(Position::new(edge, distance))
    }
}

impl SpawnPolicy for StartNodeSpawn {
    fn spawn_position(&mut self, graph: &SegmentedGraph, rng: &mut dyn RngCore) -> Result<Option<Position>> {
        let position = self.random_position(graph, rng, true)?;
        if !graph.is_full(graph.segment_at(&position)?)? {
            return Ok(Some(position));
        }
        for _ in 0..self.attempts {
            let position = self.random_position(graph, rng, false)?;
            if !graph.is_full(graph.segment_at(&position)?)? {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }
}
