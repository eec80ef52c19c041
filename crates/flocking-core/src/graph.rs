//! Symmetric integer distance graph.
//!
//! Backed by petgraph's undirected `Graph`. Node weights are the node
//! indices themselves, edge weights are lengths. A missing edge is `None`
//! everywhere in this API.

use crate::error::{FlockError, Result};
use crate::types::Edge;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Undirected graph over nodes `0..n` with integer edge lengths.
#[derive(Debug, Clone)]
pub struct DistanceGraph {
    graph: UnGraph<usize, u32>,
}

impl DistanceGraph {
    /// Graph with `node_count` nodes and no edges.
    pub fn new(node_count: usize) -> Self {
        let mut graph = UnGraph::with_capacity(node_count, node_count * 2);
        for node in 0..node_count {
            graph.add_node(node);
        }
        Self { graph }
    }

    /// Build from `(a, b, length)` triples.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize, u32)]) -> Result<Self> {
        let mut graph = Self::new(node_count);
        for &(a, b, length) in edges {
            graph.set_edge_length(a, b, length)?;
        }
        Ok(graph)
    }

    fn index(&self, node: usize) -> Result<NodeIndex> {
        if node < self.graph.node_count() {
            Ok(NodeIndex::new(node))
        } else {
            Err(FlockError::node_out_of_range(node, self.graph.node_count()))
        }
    }

    /// Insert or overwrite the edge between `a` and `b`.
    pub fn set_edge_length(&mut self, a: usize, b: usize, length: u32) -> Result<()> {
        let ia = self.index(a)?;
        let ib = self.index(b)?;
        self.graph.update_edge(ia, ib, length);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edge_length(&self, a: usize, b: usize) -> Option<u32> {
        let ia = self.index(a).ok()?;
        let ib = self.index(b).ok()?;
        self.graph.find_edge(ia, ib).map(|e| self.graph[e])
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edge_length(a, b).is_some()
    }

    /// Directed edge `a -> b`, if the nodes are connected.
    pub fn edge(&self, a: usize, b: usize) -> Option<Edge> {
        self.edge_length(a, b).map(|length| Edge::new(a, b, length))
    }

    fn weighted_neighbors(&self, node: usize) -> Vec<(usize, u32)> {
        let Ok(idx) = self.index(node) else {
            return Vec::new();
        };
        let mut out: Vec<(usize, u32)> = self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (self.graph[other], *e.weight())
            })
            .collect();
        out.sort_unstable();
        out.dedup_by_key(|(n, _)| *n);
        out
    }

    /// Neighbors in ascending index order.
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        self.weighted_neighbors(node).into_iter().map(|(n, _)| n).collect()
    }

    /// Neighbors ordered by edge length, ties broken by index.
    pub fn closest_neighbors(&self, node: usize) -> Vec<usize> {
        let mut neighbors = self.weighted_neighbors(node);
        neighbors.sort_by_key(|&(n, length)| (length, n));
        neighbors.into_iter().map(|(n, _)| n).collect()
    }

    /// Every edge in both directions, sorted.
    pub fn directed_edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.graph.edge_count() * 2);
        for e in self.graph.edge_references() {
            let a = self.graph[e.source()];
            let b = self.graph[e.target()];
            edges.push(Edge::new(a, b, *e.weight()));
            if a != b {
                edges.push(Edge::new(b, a, *e.weight()));
            }
        }
        edges.sort_unstable();
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DistanceGraph {
        DistanceGraph::from_edges(4, &[(0, 1, 10), (0, 2, 4), (0, 3, 4), (2, 3, 7)]).unwrap()
    }

    #[test]
    fn lengths_are_symmetric() {
        let g = sample();
        assert_eq!(g.edge_length(0, 1), Some(10));
        assert_eq!(g.edge_length(1, 0), Some(10));
        assert_eq!(g.edge_length(1, 2), None);
        assert_eq!(g.edge_length(0, 9), None);
    }

    #[test]
    fn neighbors_sorted_by_index() {
        assert_eq!(sample().neighbors(0), vec![1, 2, 3]);
    }

    #[test]
    fn closest_neighbors_break_ties_by_index() {
        assert_eq!(sample().closest_neighbors(0), vec![2, 3, 1]);
    }

    #[test]
    fn set_edge_overwrites_existing_length() {
        let mut g = sample();
        g.set_edge_length(1, 0, 3).unwrap();
        assert_eq!(g.edge_length(0, 1), Some(3));
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn out_of_range_node_is_rejected() {
        let mut g = DistanceGraph::new(2);
        assert!(g.set_edge_length(0, 2, 1).is_err());
    }

    #[test]
    fn directed_edges_cover_both_directions() {
        let edges = sample().directed_edges();
        assert_eq!(edges.len(), 8);
        assert!(edges.contains(&Edge::new(3, 2, 7)));
        assert!(edges.contains(&Edge::new(2, 3, 7)));
    }
}
