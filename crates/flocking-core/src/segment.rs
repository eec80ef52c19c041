//! Capacity-limited sub-ranges of an edge.

use crate::error::OccupancyError;
use crate::types::{Edge, Position};
use serde::{Deserialize, Serialize};

/// A half-open range `[start, end)` of a directed edge holding at most
/// `max_occupancy` agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    edge: Edge,
    start: f64,
    end: f64,
    max_occupancy: u32,
    occupancy: u32,
}

impl Segment {
    pub fn new(edge: Edge, start: f64, end: f64, max_occupancy: u32) -> Self {
        Self {
            edge,
            start,
            end,
            max_occupancy,
            occupancy: 0,
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.edge, self.start)
    }

    pub fn end_position(&self) -> Position {
        Position::new(self.edge, self.end)
    }

    pub fn max_occupancy(&self) -> u32 {
        self.max_occupancy
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// Remaining room.
    pub fn free_capacity(&self) -> u32 {
        self.max_occupancy.saturating_sub(self.occupancy)
    }

    pub fn is_full(&self) -> bool {
        self.occupancy >= self.max_occupancy
    }

    /// True if `distance` falls in `[start, end)`.
    pub fn contains(&self, distance: f64) -> bool {
        self.start <= distance && distance < self.end
    }

    pub fn increment(&mut self) -> Result<(), OccupancyError> {
        if self.is_full() {
            return Err(OccupancyError::Overflow {
                edge: self.edge,
                start: self.start,
                end: self.end,
                max: self.max_occupancy,
            });
        }
        self.occupancy += 1;
        Ok(())
    }

    pub fn decrement(&mut self) -> Result<(), OccupancyError> {
        if self.occupancy == 0 {
            return Err(OccupancyError::Underflow {
                edge: self.edge,
                start: self.start,
                end: self.end,
            });
        }
        self.occupancy -= 1;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.occupancy = 0;
    }
}
