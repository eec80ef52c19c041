//! Simulation variants - which agents spawn and when a run is done.

use crate::config::{SimulationConfig, SolveParams};
use crate::population::Population;
use flocking_agents::agent::Agent;
use flocking_agents::explorer::ExplorerAgent;
use flocking_agents::traits::AgentTraits;
use flocking_core::error::Result;
use flocking_core::goal::GoalEvaluator;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::tour::Tour;
use flocking_core::types::Position;

/// A tour the run settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct Convergence {
    pub tour: Tour,
    /// Share of the population following the tour, when that is what ended
    /// the run.
    pub density: Option<f64>,
}

/// Strategy plugged into [`Simulation`](crate::simulation::Simulation).
pub trait Variant {
    fn name(&self) -> &'static str;

    /// A freshly spawned agent.
    fn create_agent(&self, position: Position, traits: AgentTraits) -> Agent;

    /// Called at the end of each tick.
    fn check_termination(
        &mut self,
        graph: &SegmentedGraph,
        population: &Population,
        goal: &dyn GoalEvaluator,
        params: &SolveParams,
        config: &SimulationConfig,
    ) -> Result<Option<Convergence>>;
}

/// Explorers search, achievers imitate, and the run ends once one tour is
/// followed by `density_threshold` of the population.
#[derive(Debug, Clone, Copy, Default)]
pub struct Consensus;

impl Variant for Consensus {
    fn name(&self) -> &'static str {
        "consensus"
    }

    fn create_agent(&self, position: Position, traits: AgentTraits) -> Agent {
        ExplorerAgent::new(position, traits).into()
    }

    fn check_termination(
        &mut self,
        _graph: &SegmentedGraph,
        population: &Population,
        _goal: &dyn GoalEvaluator,
        params: &SolveParams,
        _config: &SimulationConfig,
    ) -> Result<Option<Convergence>> {
        Ok(population
            .converged(params.density_threshold)
            .map(|(tour, density)| Convergence { tour, density: Some(density) }))
    }
}
