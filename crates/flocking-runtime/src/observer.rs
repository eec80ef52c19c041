//! Simulation observers - hooks for logging, rendering and tests.
//!
//! The simulation calls these at fixed points of each tick. Every hook has
//! a no-op default so an observer implements only what it cares about.

use crate::population::AgentId;
use crate::stats::AgentFrame;
use flocking_core::error::FlockError;
use flocking_core::tour::Tour;
use flocking_core::types::{Position, Tick};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

pub trait SimulationObserver {
    fn on_spawn(&mut self, _tick: Tick, _id: AgentId, _position: &Position) {}

    /// Every spawn attempt hit a full segment.
    fn on_spawn_skipped(&mut self, _tick: Tick, _start_node: usize) {}

    fn on_promoted(&mut self, _tick: Tick, _id: AgentId, _tour: &Tour) {}

    fn on_died(&mut self, _tick: Tick, _id: AgentId, _position: &Position) {}

    fn on_tour_adopted(&mut self, _tick: Tick, _id: AgentId, _tour: &Tour) {}

    /// Whether [`on_tick`](Self::on_tick) should receive agent frames.
    fn wants_frames(&self) -> bool {
        false
    }

    /// End of a tick. `frames` is empty unless [`wants_frames`](Self::wants_frames).
    fn on_tick(&mut self, _tick: Tick, _population: usize, _frames: &[AgentFrame]) {}

    /// `density` is `None` for tours found by the tracer.
    fn on_converged(&mut self, _tick: Tick, _tour: &Tour, _density: Option<f64>) {}

    fn on_invariant_violation(&mut self, _tick: Tick, _error: &FlockError) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// Emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SimulationObserver for TracingObserver {
    fn on_spawn(&mut self, tick: Tick, id: AgentId, position: &Position) {
        debug!(tick, agent = ?id, position = %position, "explorer spawned");
    }

    fn on_spawn_skipped(&mut self, tick: Tick, start_node: usize) {
        warn!(tick, start_node, "spawn skipped, entry segments full");
    }

    fn on_promoted(&mut self, tick: Tick, id: AgentId, tour: &Tour) {
        debug!(tick, agent = ?id, tour = %tour, "explorer promoted");
    }

    fn on_died(&mut self, tick: Tick, id: AgentId, position: &Position) {
        debug!(tick, agent = ?id, position = %position, "explorer died");
    }

    fn on_tour_adopted(&mut self, tick: Tick, id: AgentId, tour: &Tour) {
        debug!(tick, agent = ?id, tour = %tour, "tour adopted");
    }

    fn on_tick(&mut self, tick: Tick, population: usize, _frames: &[AgentFrame]) {
        if tick % 100 == 0 {
            debug!(tick, population, "tick");
        }
    }

    fn on_converged(&mut self, tick: Tick, tour: &Tour, density: Option<f64>) {
        match density {
            Some(density) => info!(tick, tour = %tour, density = format!("{:.2}", density), "flock converged"),
            None => info!(tick, tour = %tour, "chain traced"),
        }
    }

    fn on_invariant_violation(&mut self, tick: Tick, err: &FlockError) {
        error!(tick, error = %err, "invariant violated, aborting run");
    }
}

/// A recorded observer call.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Spawned { tick: Tick, id: AgentId, position: Position },
    SpawnSkipped { tick: Tick, start_node: usize },
    Promoted { tick: Tick, id: AgentId, tour: Tour },
    Died { tick: Tick, id: AgentId, position: Position },
    TourAdopted { tick: Tick, id: AgentId, tour: Tour },
    Tick { tick: Tick, population: usize, frames: usize },
    Converged { tick: Tick, tour: Tour, density: Option<f64> },
    InvariantViolation { tick: Tick, error: String },
}

/// Records every call into a shared log.
///
/// Clones share the log, so a test can keep one clone and hand the other
/// to the simulation.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<ObserverEvent>>>,
    frames: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also request agent frames each tick.
    pub fn with_frames() -> Self {
        Self { frames: true, ..Self::default() }
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.borrow().clone()
    }

    fn push(&self, event: ObserverEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl SimulationObserver for RecordingObserver {
    fn on_spawn(&mut self, tick: Tick, id: AgentId, position: &Position) {
        self.push(ObserverEvent::Spawned { tick, id, position: *position });
    }

    fn on_spawn_skipped(&mut self, tick: Tick, start_node: usize) {
        self.push(ObserverEvent::SpawnSkipped { tick, start_node });
    }

    fn on_promoted(&mut self, tick: Tick, id: AgentId, tour: &Tour) {
        self.push(ObserverEvent::Promoted { tick, id, tour: tour.clone() });
    }

    fn on_died(&mut self, tick: Tick, id: AgentId, position: &Position) {
        self.push(ObserverEvent::Died { tick, id, position: *position });
    }

    fn on_tour_adopted(&mut self, tick: Tick, id: AgentId, tour: &Tour) {
        self.push(ObserverEvent::TourAdopted { tick, id, tour: tour.clone() });
    }

    fn wants_frames(&self) -> bool {
        self.frames
    }

    fn on_tick(&mut self, tick: Tick, population: usize, frames: &[AgentFrame]) {
        self.push(ObserverEvent::Tick { tick, population, frames: frames.len() });
    }

    fn on_converged(&mut self, tick: Tick, tour: &Tour, density: Option<f64>) {
        self.push(ObserverEvent::Converged { tick, tour: tour.clone(), density });
    }

    fn on_invariant_violation(&mut self, tick: Tick, err: &FlockError) {
        self.push(ObserverEvent::InvariantViolation { tick, error: err.to_string() });
    }
}
