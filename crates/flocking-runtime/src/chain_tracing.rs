//! Chain tracing - the flock jams a route, the backtracker reads it back.

use crate::backtracker::SolutionBacktracker;
use crate::config::{SimulationConfig, SolveParams};
use crate::population::Population;
use crate::simulation::Simulation;
use crate::variant::{Convergence, Variant};
use flocking_agents::agent::Agent;
use flocking_agents::chain::ChainAgent;
use flocking_agents::traits::AgentTraits;
use flocking_core::error::Result;
use flocking_core::goal::GoalEvaluator;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::types::Position;

/// Chain agents only. Once any edge leaving the start node is saturated
/// the tracer runs; its result, if any, ends the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainTracing;

pub type ChainTracingSimulation<'a> = Simulation<'a, ChainTracing>;

impl ChainTracing {
    /// Whether some edge out of `start_node` is saturated.
    ///
    /// One such edge is enough. The tracer then roots its search at every
    /// saturated edge out of the start.
    pub fn start_is_jammed(graph: &SegmentedGraph, start_node: usize) -> bool {
        graph
            .graph()
            .neighbors(start_node)
            .into_iter()
            .filter_map(|n| graph.edge(start_node, n))
            .any(|edge| graph.is_edge_full(&edge))
    }
}

impl Variant for ChainTracing {
    fn name(&self) -> &'static str {
        "chain-tracing"
    }

    fn create_agent(&self, position: Position, traits: AgentTraits) -> Agent {
        ChainAgent::new(position, traits).into()
    }

    fn check_termination(
        &mut self,
        graph: &SegmentedGraph,
        _population: &Population,
        goal: &dyn GoalEvaluator,
        _params: &SolveParams,
        config: &SimulationConfig,
    ) -> Result<Option<Convergence>> {
        if !Self::start_is_jammed(graph, config.start_node) {
            return Ok(None);
        }
        let mut tracer =
            SolutionBacktracker::new(graph, goal, config.start_node).with_max_expansions(config.max_expansions);
        let traced = tracer.trace();
        tracing::debug!(expansions = tracer.expansions(), found = traced.is_some(), "chain traced");
        Ok(traced.map(|tour| Convergence { tour, density: None }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flocking_core::goal::EndNodeGoal;
    use flocking_core::graph::DistanceGraph;
    use flocking_core::segmented::GraphSettings;

    fn line() -> SegmentedGraph {
        let graph = DistanceGraph::from_edges(3, &[(0, 1, 2), (1, 2, 2)]).unwrap();
        SegmentedGraph::new(graph, GraphSettings::new(1.0, 1)).unwrap()
    }

    #[test]
    fn waits_until_start_is_jammed() {
        let graph = line();
        let goal = EndNodeGoal::new(2);
        let mut variant = ChainTracing;
        let result = variant
            .check_termination(&graph, &Population::new(), &goal, &SolveParams::default(), &SimulationConfig::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn jammed_chain_is_traced() {
        let mut graph = line();
        for (a, b) in [(0, 1), (1, 2)] {
            let edge = graph.edge(a, b).unwrap();
            graph.occupy(&Position::start_of(edge)).unwrap();
        }
        assert!(ChainTracing::start_is_jammed(&graph, 0));

        let goal = EndNodeGoal::new(2);
        let mut variant = ChainTracing;
        let result = variant
            .check_termination(&graph, &Population::new(), &goal, &SolveParams::default(), &SimulationConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(result.tour.locations(), &[0, 1, 2]);
        assert_eq!(result.density, None);
    }

    #[test]
    fn one_full_start_edge_is_enough_to_trace() {
        let star = DistanceGraph::from_edges(4, &[(0, 1, 2), (0, 2, 2), (0, 3, 2)]).unwrap();
        let mut graph = SegmentedGraph::new(star, GraphSettings::new(1.0, 1)).unwrap();
        assert!(!ChainTracing::start_is_jammed(&graph, 0));

        let edge = graph.edge(0, 2).unwrap();
        graph.occupy(&Position::start_of(edge)).unwrap();
        assert!(graph.is_edge_full(&edge));
        assert!(!graph.is_edge_full(&graph.edge(0, 1).unwrap()));
        assert!(ChainTracing::start_is_jammed(&graph, 0));
    }

    #[test]
    fn spawns_chain_agents() {
        let graph = line();
        let edge = graph.edge(0, 1).unwrap();
        let agent = ChainTracing.create_agent(Position::start_of(edge), AgentTraits::default());
        assert!(agent.as_chain().is_some());
    }
}
