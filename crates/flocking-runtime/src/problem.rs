//! Problem entry points.

use crate::chain_tracing::ChainTracing;
use crate::config::{SimulationConfig, SolveParams};
use crate::observer::{SimulationObserver, TracingObserver};
use crate::simulation::Simulation;
use crate::stats::RunStats;
use crate::variant::{Consensus, Variant};
use flocking_core::error::Result;
use flocking_core::goal::GoalEvaluator;
use flocking_core::graph::DistanceGraph;
use flocking_core::segmented::{GraphSettings, SegmentedGraph};
use flocking_core::tour::Tour;
use serde::Serialize;
use tracing::info;

/// Result of one solve attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    /// The converged tour with its cost, if the run converged.
    pub tour: Option<Tour>,
    pub stats: RunStats,
}

/// A distance graph plus the way it is cut into segments.
///
/// Every solve starts from empty occupancy, so one problem can be solved
/// many times with different parameters.
#[derive(Debug, Clone)]
pub struct Problem {
    graph: DistanceGraph,
    settings: GraphSettings,
    config: SimulationConfig,
}

impl Problem {
    pub fn new(graph: DistanceGraph, settings: GraphSettings) -> Self {
        Self { graph, settings, config: SimulationConfig::default() }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn graph(&self) -> &DistanceGraph {
        &self.graph
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// A fresh segmented copy of the graph with zero occupancy.
    pub fn segmented(&self) -> Result<SegmentedGraph> {
        SegmentedGraph::new(self.graph.clone(), self.settings.clone())
    }

    /// A consensus simulation ready to tick.
    pub fn simulation<'a>(&self, params: SolveParams, goal: &'a dyn GoalEvaluator) -> Result<Simulation<'a, Consensus>> {
        Simulation::new(self.segmented()?, params, self.config.clone(), goal, Consensus)
    }

    /// Run the consensus flock. Returns the converged tour, or `None` if
    /// the tick budget ran out.
    pub fn solve(&self, params: SolveParams, goal: &dyn GoalEvaluator) -> Result<Option<Tour>> {
        Ok(self.solve_with_stats(params, goal, Box::new(TracingObserver))?.tour)
    }

    pub fn solve_with_stats<'a>(
        &self,
        params: SolveParams,
        goal: &'a dyn GoalEvaluator,
        observer: Box<dyn SimulationObserver + 'a>,
    ) -> Result<SolveOutcome> {
        self.run_variant(params, goal, observer, Consensus)
    }

    /// Run the chain-tracing flock.
    pub fn solve_chain_tracing(&self, params: SolveParams, goal: &dyn GoalEvaluator) -> Result<Option<Tour>> {
        Ok(self.solve_chain_tracing_with_stats(params, goal, Box::new(TracingObserver))?.tour)
    }

    pub fn solve_chain_tracing_with_stats<'a>(
        &self,
        params: SolveParams,
        goal: &'a dyn GoalEvaluator,
        observer: Box<dyn SimulationObserver + 'a>,
    ) -> Result<SolveOutcome> {
        self.run_variant(params, goal, observer, ChainTracing)
    }

    fn run_variant<'a, V: Variant>(
        &self,
        params: SolveParams,
        goal: &'a dyn GoalEvaluator,
        observer: Box<dyn SimulationObserver + 'a>,
        variant: V,
    ) -> Result<SolveOutcome> {
        let mut simulation =
            Simulation::new(self.segmented()?, params, self.config.clone(), goal, variant)?.with_observer(observer);
        info!(
            variant = simulation.variant_name(),
            goal = goal.describe(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "solving"
        );
        let tour = simulation.run()?;
        let stats = simulation.into_stats();
        info!(ticks = stats.ticks, converged = stats.converged, spawned = stats.spawned, "solve finished");
        Ok(SolveOutcome { tour, stats })
    }
}
