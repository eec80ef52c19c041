//! Goal evaluators - when is a walk a solution?

use crate::graph::DistanceGraph;
use crate::tour::Tour;
use serde::{Deserialize, Serialize};

/// Decides whether a path satisfies the problem being solved.
pub trait GoalEvaluator {
    fn is_goal(&self, graph: &DistanceGraph, path: &Tour) -> bool;

    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;
}

/// Shortest path: the walk ends at a fixed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndNodeGoal {
    end_node: usize,
}

impl EndNodeGoal {
    pub fn new(end_node: usize) -> Self {
        Self { end_node }
    }

    pub fn end_node(&self) -> usize {
        self.end_node
    }
}

impl GoalEvaluator for EndNodeGoal {
    fn is_goal(&self, _graph: &DistanceGraph, path: &Tour) -> bool {
        path.last() == Some(self.end_node)
    }

    fn describe(&self) -> String {
        format!("end node {}", self.end_node)
    }
}

/// Travelling salesman: a closed walk that visits every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TspGoal;

impl GoalEvaluator for TspGoal {
    fn is_goal(&self, graph: &DistanceGraph, path: &Tour) -> bool {
        match (path.first(), path.last()) {
            (Some(first), Some(last)) => path.len() > 1 && first == last && path.visits_all(graph.node_count()),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        "closed tour over all nodes".to_string()
    }
}

/// Serializable goal selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalKind {
    EndNode { node: usize },
    #[default]
    Tsp,
}

impl GoalKind {
    pub fn build(&self) -> Box<dyn GoalEvaluator> {
        match *self {
            GoalKind::EndNode { node } => Box::new(EndNodeGoal::new(node)),
            GoalKind::Tsp => Box::new(TspGoal),
        }
    }
}
