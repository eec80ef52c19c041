//! Capacity-respecting movement shared by every agent kind.
//!
//! A [`Walker`] owns an agent's position and is the only thing that moves
//! it, so each move is exactly one decrement of the old segment followed by
//! one increment of the new.

use flocking_core::error::{AgentError, Result};
use flocking_core::graph::DistanceGraph;
use flocking_core::segmented::{SegmentRef, SegmentedGraph};
use flocking_core::tour::Tour;
use flocking_core::types::{Edge, Position};

/// Largest backwards step tolerated from floating point error.
const BACKWARD_TOLERANCE: f64 = 0.1;

/// Result of trying to step onto the next edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The walker is now on the new edge.
    Entered,
    /// The new edge had no room at its start. The walker crept forward on
    /// its current edge instead.
    Blocked,
}

/// Position, speed and trail of one agent.
#[derive(Debug, Clone)]
pub struct Walker {
    position: Position,
    speed: f64,
    path_taken: Tour,
    traveled: f64,
}

impl Walker {
    /// Walker at `position`. The trail starts with the edge's `from` node.
    ///
    /// The caller is responsible for counting the walker into the segment
    /// at `position`.
    pub fn new(position: Position, speed: f64) -> Self {
        Self {
            position,
            speed,
            path_taken: Tour::from_locations(vec![position.from()]),
            traveled: 0.0,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn path_taken(&self) -> &Tour {
        &self.path_taken
    }

    pub fn path_taken_mut(&mut self) -> &mut Tour {
        &mut self.path_taken
    }

    /// Move the trail out, leaving an empty one behind.
    pub fn take_path(&mut self) -> Tour {
        std::mem::take(&mut self.path_taken)
    }

    /// Total distance covered so far.
    pub fn traveled(&self) -> f64 {
        self.traveled
    }

    /// Append the node being crossed unless it already ends the trail.
    /// Returns whether it was appended.
    pub fn offer_crossing(&mut self) -> bool {
        let crossing = self.position.to();
        if self.path_taken.last() == Some(crossing) {
            false
        } else {
            self.path_taken.offer(crossing);
            true
        }
    }

    /// Undo [`Walker::offer_crossing`].
    pub fn revert_crossing(&mut self, added: bool) {
        if added {
            self.path_taken.pop_last();
        }
    }

    /// Jump to `position`, moving the occupancy count with it.
    pub fn set_position(&mut self, graph: &mut SegmentedGraph, position: Position) -> Result<()> {
        graph.relocate(&self.position, &position)?;
        self.position = position;
        Ok(())
    }

    /// Move `distance` along the current edge if that does not leave it.
    ///
    /// Returns `Ok(false)` when the move would cross the edge end; the
    /// caller then has to decide where to go next. If the landing segment is
    /// full the walker only moves up to the farthest segment with room.
    pub fn advance_within_edge(&mut self, graph: &mut SegmentedGraph, distance: f64, margin: f64) -> Result<bool> {
        if !self.position.can_advance(distance) {
            return Ok(false);
        }
        let target = graph.segment_at(&self.position.advanced(distance))?;
        if graph.is_full(target)? {
            let current = graph.segment_at(&self.position)?;
            self.move_to_farthest_available(graph, current, target, distance, margin)?;
        } else {
            self.move_distance(graph, distance)?;
        }
        Ok(true)
    }

    fn move_distance(&mut self, graph: &mut SegmentedGraph, distance: f64) -> Result<()> {
        let distance = distance.min(self.position.distance_to_end());
        let target = self.position.advanced(distance);
        self.set_position(graph, target)?;
        self.traveled += distance;
        Ok(())
    }

    /// Creep up to just short of the end of the farthest segment with room
    /// between `from` and `through`, covering at most `cap`.
    pub fn move_to_farthest_available(
        &mut self,
        graph: &mut SegmentedGraph,
        from: SegmentRef,
        through: SegmentRef,
        cap: f64,
        margin: f64,
    ) -> Result<()> {
        let farthest = graph.farthest_available(from, through)?;
        let end = graph.segment(farthest)?.end();
        let diff = end - margin - self.position.distance;
        if diff < -BACKWARD_TOLERANCE {
            return Err(AgentError::WalkingBackwards {
                edge: self.position.edge,
                distance: self.position.distance,
                by: diff,
            }
            .into());
        }
        let distance = diff.min(cap);
        if distance > 0.0 {
            self.move_distance(graph, distance)?;
        }
        Ok(())
    }

    /// Cross the current edge's end onto `edge`.
    ///
    /// The leftover of this tick's speed is spent on the new edge, landing
    /// in the farthest segment with room. When even the first segment of
    /// `edge` is full the walker stays on its edge and creeps toward the end.
    pub fn advance_to_edge(&mut self, graph: &mut SegmentedGraph, edge: Edge, margin: f64) -> Result<Transition> {
        let remaining = self.position.distance_to_end();
        let on_next = (self.speed - remaining).clamp(0.0, edge.length() as f64);

        let first = graph.segment_at(&Position::start_of(edge))?;
        let reach = graph.segment_at(&Position::new(edge, on_next))?;
        let farthest = graph.farthest_available(first, reach)?;

        if graph.is_full(farthest)? {
            let here = graph.segment_at(&self.position)?;
            let limit = (self.position.distance + remaining - margin).max(self.position.distance);
            let there = graph.segment_at(&Position::new(self.position.edge, limit))?;
            self.move_to_farthest_available(graph, here, there, self.speed, margin)?;
            return Ok(Transition::Blocked);
        }

        let segment = graph.segment(farthest)?;
        let landing = if on_next >= segment.end() {
            (segment.end() - margin).max(segment.start())
        } else {
            on_next
        };
        self.set_position(graph, Position::new(edge, landing))?;
        self.traveled += remaining + landing;
        Ok(Transition::Entered)
    }
}

/// True if the tour's entry segment (offset zero of its first edge) has
/// room for one more agent.
pub fn entry_has_room(graph: &SegmentedGraph, tour: &Tour) -> Result<bool> {
    let (Some(a), Some(b)) = (tour.get(0), tour.get(1)) else {
        return Ok(false);
    };
    let Some(edge) = graph.edge(a, b) else {
        return Ok(false);
    };
    let entry = graph.segment_at(&Position::start_of(edge))?;
    Ok(!graph.is_full(entry)?)
}

/// Edges an explorer may take after crossing `position.to()`.
///
/// Unvisited neighbours win, closest first. Once every neighbour has been
/// visited the start node is allowed only if the whole graph has been
/// covered; otherwise any neighbour but the start.
pub fn candidate_edges(graph: &DistanceGraph, position: &Position, path: &Tour) -> Vec<Edge> {
    let here = position.to();
    let closest = graph.closest_neighbors(here);
    let unvisited: Vec<usize> = closest.iter().copied().filter(|&n| !path.contains(n)).collect();

    let nodes = if !unvisited.is_empty() {
        unvisited
    } else {
        let start = path.first();
        match start {
            Some(s) if path.visits_all(graph.node_count()) && closest.contains(&s) => vec![s],
            _ => closest.into_iter().filter(|&n| Some(n) != start).collect(),
        }
    };

    nodes.into_iter().filter_map(|n| graph.edge(here, n)).collect()
}
