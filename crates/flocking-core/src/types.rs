//! Core types shared across the flocking framework.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Simulation tick counter.
pub type Tick = u64;

/// A directed traversal of a graph edge.
///
/// The underlying distance graph is symmetric, so `a -> b` and `b -> a`
/// describe the same physical edge. Agents always travel along a direction,
/// and vision and traversal care about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    from: usize,
    to: usize,
    length: u32,
}

impl Edge {
    pub fn new(from: usize, to: usize, length: u32) -> Self {
        Self { from, to, length }
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// The same edge travelled the other way.
    pub fn reversed(&self) -> Self {
        Self::new(self.to, self.from, self.length)
    }

    /// Directed key used to look up segment chains.
    pub fn key(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    /// Same endpoints in either order.
    pub fn is_same(&self, other: &Edge) -> bool {
        self.is_strictly_same(other) || (self.from == other.to && self.to == other.from)
    }

    /// Same endpoints in the same order.
    pub fn is_strictly_same(&self, other: &Edge) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}[{}]", self.from, self.to, self.length)
    }
}

/// A point on a directed edge, measured from the edge's `from` node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub edge: Edge,
    pub distance: f64,
}

impl Position {
    pub fn new(edge: Edge, distance: f64) -> Self {
        Self { edge, distance }
    }

    /// Offset zero of `edge`.
    pub fn start_of(edge: Edge) -> Self {
        Self::new(edge, 0.0)
    }

    pub fn from(&self) -> usize {
        self.edge.from
    }

    pub fn to(&self) -> usize {
        self.edge.to
    }

    pub fn distance_to_end(&self) -> f64 {
        self.edge.length as f64 - self.distance
    }

    /// True if moving `distance` keeps the position on this edge.
    pub fn can_advance(&self, distance: f64) -> bool {
        self.distance_to_end() >= distance
    }

    /// The position `distance` further along the same edge.
    pub fn advanced(&self, distance: f64) -> Self {
        Self::new(self.edge, self.distance + distance)
    }

    pub fn is_strictly_same_edge(&self, other: &Position) -> bool {
        self.edge.is_strictly_same(&other.edge)
    }
}

/// Positions are only ordered along a shared directed edge.
impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_strictly_same_edge(other) {
            self.distance.partial_cmp(&other.distance)
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:.2}", self.edge, self.distance)
    }
}

/// Display color of an agent, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Explorer color.
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::GREEN
    }
}
