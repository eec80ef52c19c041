//! Segmented graph - occupancy bookkeeping over every directed edge.
//!
//! Each direction of an undirected edge gets its own chain of segments
//! covering `[0, length)`. Agents occupy exactly one segment at a time, and
//! the chain counters are the only shared mutable state the agents touch.

use crate::error::{FlockError, GraphError, Result};
use crate::graph::DistanceGraph;
use crate::segment::Segment;
use crate::types::{Edge, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capacity override for one directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityOverride {
    pub from: usize,
    pub to: usize,
    pub capacity: u32,
}

/// How edges are cut into segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSettings {
    /// Length of one segment (default: 1.0).
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,
    /// Agents allowed per segment unless overridden (default: 3).
    #[serde(default = "default_segment_capacity")]
    pub segment_capacity: u32,
    /// Per-edge capacities, keyed by direction.
    #[serde(default)]
    pub capacity_overrides: Vec<CapacityOverride>,
}

fn default_segment_length() -> f64 {
    1.0
}

fn default_segment_capacity() -> u32 {
    3
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            segment_length: default_segment_length(),
            segment_capacity: default_segment_capacity(),
            capacity_overrides: Vec::new(),
        }
    }
}

impl GraphSettings {
    pub fn new(segment_length: f64, segment_capacity: u32) -> Self {
        Self {
            segment_length,
            segment_capacity,
            capacity_overrides: Vec::new(),
        }
    }

    /// Set the capacity of the directed edge `from -> to`.
    pub fn with_capacity_override(mut self, from: usize, to: usize, capacity: u32) -> Self {
        self.capacity_overrides.retain(|o| !(o.from == from && o.to == to));
        self.capacity_overrides.push(CapacityOverride { from, to, capacity });
        self
    }

    pub fn capacity_for(&self, edge: &Edge) -> u32 {
        self.capacity_overrides
            .iter()
            .find(|o| o.from == edge.from() && o.to == edge.to())
            .map(|o| o.capacity)
            .unwrap_or(self.segment_capacity)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.segment_length.is_finite() && self.segment_length > 0.0) {
            return Err(FlockError::invalid_config(
                "segment_length",
                self.segment_length,
                "must be a positive number",
            ));
        }
        if self.segment_capacity == 0 {
            return Err(FlockError::invalid_config("segment_capacity", 0, "must be at least 1"));
        }
        if let Some(o) = self.capacity_overrides.iter().find(|o| o.capacity == 0) {
            return Err(FlockError::invalid_config(
                format!("capacity_overrides[{}->{}]", o.from, o.to),
                0,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Handle to one segment: its directed edge plus the index in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentRef {
    pub edge: Edge,
    pub index: usize,
}

/// Occupancy totals for one directed edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeOccupancy {
    pub edge: Edge,
    pub occupancy: u32,
    pub capacity: u32,
    pub segments: usize,
}

/// Distance graph plus the segment chains of every directed edge.
#[derive(Debug, Clone)]
pub struct SegmentedGraph {
    graph: DistanceGraph,
    settings: GraphSettings,
    chains: HashMap<(usize, usize), Vec<Segment>>,
}

impl SegmentedGraph {
    /// Validate the settings and build every chain with zero occupancy.
    pub fn new(graph: DistanceGraph, settings: GraphSettings) -> Result<Self> {
        settings.validate()?;
        let mut segmented = Self {
            graph,
            settings,
            chains: HashMap::new(),
        };
        segmented.build_segments();
        Ok(segmented)
    }

    pub fn graph(&self) -> &DistanceGraph {
        &self.graph
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Directed edge `a -> b`, if connected.
    pub fn edge(&self, a: usize, b: usize) -> Option<Edge> {
        self.graph.edge(a, b)
    }

    /// Cut every directed edge into `max(1, floor(length / segment_length))`
    /// segments. The last one absorbs the remainder.
    pub fn build_segments(&mut self) {
        let segment_length = self.settings.segment_length;
        self.chains.clear();
        for edge in self.graph.directed_edges() {
            let length = edge.length() as f64;
            let count = ((length / segment_length).floor() as usize).max(1);
            let capacity = self.settings.capacity_for(&edge);
            let chain = (0..count)
                .map(|i| {
                    let start = i as f64 * segment_length;
                    let end = if i + 1 == count { length } else { (i + 1) as f64 * segment_length };
                    Segment::new(edge, start, end, capacity)
                })
                .collect();
            self.chains.insert(edge.key(), chain);
        }
    }

    /// Drop all occupancy and rebuild the chains.
    pub fn reset(&mut self) {
        self.build_segments();
    }

    pub fn segments(&self, edge: &Edge) -> Option<&[Segment]> {
        self.chains.get(&edge.key()).map(|c| c.as_slice())
    }

    fn chain(&self, edge: &Edge) -> Result<&Vec<Segment>> {
        self.chains
            .get(&edge.key())
            .ok_or_else(|| GraphError::NoSegments(*edge).into())
    }

    fn segment_mut(&mut self, seg: SegmentRef) -> Result<&mut Segment> {
        let chain = self
            .chains
            .get_mut(&seg.edge.key())
            .ok_or(GraphError::NoSegments(seg.edge))?;
        chain
            .get_mut(seg.index)
            .ok_or_else(|| GraphError::SegmentOutOfRange { edge: seg.edge, index: seg.index }.into())
    }

    pub fn segment(&self, seg: SegmentRef) -> Result<&Segment> {
        self.chain(&seg.edge)?
            .get(seg.index)
            .ok_or_else(|| GraphError::SegmentOutOfRange { edge: seg.edge, index: seg.index }.into())
    }

    /// The segment containing `position`. The node-arrival point at
    /// `length` belongs to the last segment.
    pub fn segment_at(&self, position: &Position) -> Result<SegmentRef> {
        let chain = self.chain(&position.edge)?;
        let index = chain
            .iter()
            .position(|s| s.contains(position.distance))
            .unwrap_or_else(|| if position.distance < 0.0 { 0 } else { chain.len() - 1 });
        Ok(SegmentRef { edge: position.edge, index })
    }

    /// Scan backwards from `through` toward `from` and return the first
    /// segment with room. If every segment in range is full, `from` itself.
    pub fn farthest_available(&self, from: SegmentRef, through: SegmentRef) -> Result<SegmentRef> {
        if !from.edge.is_strictly_same(&through.edge) {
            return Err(GraphError::SegmentMismatch { expected: from.edge, found: through.edge }.into());
        }
        let chain = self.chain(&from.edge)?;
        let last = through.index.min(chain.len().saturating_sub(1));
        if last < from.index {
            return Ok(from);
        }
        let index = (from.index..=last)
            .rev()
            .find(|&i| !chain[i].is_full())
            .unwrap_or(from.index);
        Ok(SegmentRef { edge: from.edge, index })
    }

    pub fn is_full(&self, seg: SegmentRef) -> Result<bool> {
        Ok(self.segment(seg)?.is_full())
    }

    /// True when every segment but the last is full. The last segment is
    /// the arrival region and never counts, so one-segment edges are
    /// always full.
    pub fn is_edge_full(&self, edge: &Edge) -> bool {
        match self.chains.get(&edge.key()) {
            Some(chain) => chain[..chain.len().saturating_sub(1)].iter().all(Segment::is_full),
            None => false,
        }
    }

    pub fn increment(&mut self, seg: SegmentRef) -> Result<()> {
        self.segment_mut(seg)?.increment().map_err(FlockError::from)
    }

    pub fn decrement(&mut self, seg: SegmentRef) -> Result<()> {
        self.segment_mut(seg)?.decrement().map_err(FlockError::from)
    }

    /// Count an agent into the segment at `position`.
    pub fn occupy(&mut self, position: &Position) -> Result<()> {
        let seg = self.segment_at(position)?;
        self.increment(seg)
    }

    /// Count an agent out of the segment at `position`.
    pub fn vacate(&mut self, position: &Position) -> Result<()> {
        let seg = self.segment_at(position)?;
        self.decrement(seg)
    }

    /// Move one agent's occupancy from `from` to `to`.
    ///
    /// On failure the agent is still counted at `from`.
    pub fn relocate(&mut self, from: &Position, to: &Position) -> Result<()> {
        self.vacate(from)?;
        if let Err(err) = self.occupy(to) {
            self.occupy(from)?;
            return Err(err);
        }
        Ok(())
    }

    /// Sum of every segment's occupancy.
    pub fn total_occupancy(&self) -> u64 {
        self.chains
            .values()
            .flat_map(|c| c.iter())
            .map(|s| s.occupancy() as u64)
            .sum()
    }

    /// Per-edge occupancy totals, sorted by edge.
    pub fn occupancy_snapshot(&self) -> Vec<EdgeOccupancy> {
        let mut snapshot: Vec<EdgeOccupancy> = self
            .chains
            .values()
            .filter_map(|chain| {
                let first = chain.first()?;
                Some(EdgeOccupancy {
                    edge: first.edge(),
                    occupancy: chain.iter().map(Segment::occupancy).sum(),
                    capacity: chain.iter().map(Segment::max_occupancy).sum(),
                    segments: chain.len(),
                })
            })
            .collect();
        snapshot.sort_by_key(|o| o.edge);
        snapshot
    }

    /// Verify every chain is gapless over `[0, length]` and no counter
    /// exceeds its maximum.
    pub fn check_invariants(&self) -> Result<()> {
        for chain in self.chains.values() {
            let Some(first) = chain.first() else {
                continue;
            };
            let edge = first.edge();
            let mut cursor = 0.0;
            for seg in chain {
                if seg.start() != cursor || seg.end() < seg.start() {
                    return Err(GraphError::BrokenChain(edge).into());
                }
                if seg.occupancy() > seg.max_occupancy() {
                    return Err(crate::error::OccupancyError::Overflow {
                        edge,
                        start: seg.start(),
                        end: seg.end(),
                        max: seg.max_occupancy(),
                    }
                    .into());
                }
                cursor = seg.end();
            }
            if cursor != edge.length() as f64 {
                return Err(GraphError::BrokenChain(edge).into());
            }
        }
        Ok(())
    }
}
