//! Error types for flocking operations.
//!
//! Occupancy violations are fatal and travel all the way out of a solve.
//! Everything recoverable (a dead agent, a skipped spawn) is an outcome,
//! not an error.

use crate::types::Edge;
use thiserror::Error;

/// Result type for flocking operations.
pub type Result<T> = std::result::Result<T, FlockError>;

/// Errors that can occur while building or running a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    /// Graph-related errors.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    /// Segment occupancy invariant violated.
    #[error("Occupancy invariant violated: {0}")]
    Occupancy(#[from] OccupancyError),
    /// Agent-related errors.
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),
    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for FlockError {
    fn from(e: std::io::Error) -> Self {
        FlockError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FlockError {
    fn from(e: serde_json::Error) -> Self {
        FlockError::Serialization(e.to_string())
    }
}

/// Graph-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node index outside `0..node_count`.
    #[error("Node {node} out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { node: usize, node_count: usize },
    /// No edge between the two nodes.
    #[error("Edge not found: {0} -> {1}")]
    EdgeNotFound(usize, usize),
    /// The edge has no segment chain.
    #[error("No segments for edge {0}")]
    NoSegments(Edge),
    /// Segment index past the end of the chain.
    #[error("Segment {index} out of range on edge {edge}")]
    SegmentOutOfRange { edge: Edge, index: usize },
    /// Two segment references that must share an edge do not.
    #[error("Segments on different edges: {expected} vs {found}")]
    SegmentMismatch { expected: Edge, found: Edge },
    /// A segment chain has a gap, overlap or wrong extent.
    #[error("Broken segment chain on edge {0}")]
    BrokenChain(Edge),
    /// Graph is empty.
    #[error("Graph is empty")]
    EmptyGraph,
}

/// Segment occupancy invariant violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OccupancyError {
    /// Increment past the segment's maximum.
    #[error("segment [{start}, {end}) on {edge} already holds {max} agents")]
    Overflow { edge: Edge, start: f64, end: f64, max: u32 },
    /// Decrement of an empty segment.
    #[error("segment [{start}, {end}) on {edge} is already empty")]
    Underflow { edge: Edge, start: f64, end: f64 },
}

/// Agent-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// Agent not found.
    #[error("Agent not found: {0}")]
    NotFound(String),
    /// A waypoint cannot be reached from the current node.
    #[error("Invalid route: no way from {from} to {to}")]
    InvalidRoute { from: usize, to: usize },
    /// Movement would take the agent backwards along its edge.
    #[error("Agent on {edge} at {distance} would move backwards by {by}")]
    WalkingBackwards { edge: Edge, distance: f64, by: f64 },
    /// The transition does not apply to this kind of agent.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid config value for '{field}': {value} ({reason})")]
    InvalidValue { field: String, value: String, reason: String },
    /// Value out of range.
    #[error("Config value '{field}' = {value} out of range [{min}, {max}]")]
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
}

// Convenience constructors
impl FlockError {
    pub fn edge_not_found(from: usize, to: usize) -> Self {
        FlockError::Graph(GraphError::EdgeNotFound(from, to))
    }

    pub fn node_out_of_range(node: usize, node_count: usize) -> Self {
        FlockError::Graph(GraphError::NodeOutOfRange { node, node_count })
    }

    pub fn invalid_route(from: usize, to: usize) -> Self {
        FlockError::Agent(AgentError::InvalidRoute { from, to })
    }

    pub fn invalid_config(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        FlockError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        FlockError::Config(ConfigError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }

    /// True for segment overflow/underflow.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, FlockError::Occupancy(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlockError::edge_not_found(2, 4);
        assert_eq!(err.to_string(), "Graph error: Edge not found: 2 -> 4");

        let err = FlockError::invalid_config("segment_length", 0.0, "must be positive");
        assert!(err.to_string().contains("segment_length"));
    }

    #[test]
    fn test_occupancy_is_invariant_violation() {
        let edge = Edge::new(0, 1, 10);
        let err: FlockError = OccupancyError::Overflow { edge, start: 0.0, end: 1.0, max: 2 }.into();
        assert!(err.is_invariant_violation());
        assert!(!FlockError::invalid_route(1, 1).is_invariant_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FlockError = io_err.into();
        assert!(matches!(err, FlockError::Io(_)));
    }
}
