//! Seeded problem generators.
//!
//! The same seed always yields the same graph, so experiments can be
//! repeated without shipping data files.

use crate::error::{FlockError, Result};
use crate::graph::DistanceGraph;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Inclusive range of generated edge lengths.
const MIN_LENGTH: u32 = 1;
const MAX_LENGTH: u32 = 100;

/// The five-node shortest-path instance.
///
/// ```text
///   0 --10-- 1 --20-- 4
///            |        |
///           12        9
///            |        |
///            2 --15-- 3
/// ```
///
/// From 0 to 3 the two routes cost 37 (via 2) and 39 (via 4).
pub fn basic() -> DistanceGraph {
    let mut graph = DistanceGraph::new(5);
    for (a, b, length) in [(0, 1, 10), (1, 4, 20), (1, 2, 12), (2, 3, 15), (4, 3, 9)] {
        graph.set_edge_length(a, b, length).expect("instance edge endpoints are in range");
    }
    graph
}

/// Complete graph with random lengths in `1..=100`.
pub fn fully_connected(node_count: usize, seed: u64) -> DistanceGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut graph = DistanceGraph::new(node_count);
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let length = rng.random_range(MIN_LENGTH..=MAX_LENGTH);
            graph.set_edge_length(i, j, length).expect("instance edge endpoints are in range");
        }
    }
    graph
}

/// Erdős–Rényi graph with edge probability about one in ten, patched so
/// every node ends up with at least two neighbours.
pub fn sparse(node_count: usize, seed: u64) -> Result<DistanceGraph> {
    if node_count < 3 {
        return Err(FlockError::out_of_range("node_count", node_count as f64, 3.0, f64::INFINITY));
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut graph = DistanceGraph::new(node_count);
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let length = rng.random_range(MIN_LENGTH..=MAX_LENGTH);
            let dice = rng.random_range(0..node_count);
            if dice <= node_count / 10 {
                graph.set_edge_length(i, j, length)?;
            }
        }
        while graph.neighbors(i).len() < 2 {
            let other = rng.random_range(0..node_count);
            if other != i && !graph.has_edge(i, other) {
                let length = rng.random_range(MIN_LENGTH..=MAX_LENGTH);
                graph.set_edge_length(i, other, length)?;
            }
        }
    }
    Ok(graph)
}
