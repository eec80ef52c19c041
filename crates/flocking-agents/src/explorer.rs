//! Explorer - searches for a path that satisfies the goal.
//!
//! An explorer cruises along its edge until it would cross the end node,
//! then decides. If its trail now satisfies the goal it asks to be promoted
//! (once the tour's entry segment has room); otherwise it picks the next
//! edge by roulette over free capacity and proximity. With nowhere to go it
//! dies.

use crate::agent::StepOutcome;
use crate::context::TickContext;
use crate::motion::{candidate_edges, entry_has_room, Transition, Walker};
use crate::selection;
use crate::traits::AgentTraits;
use flocking_core::error::Result;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::tour::Tour;
use flocking_core::types::{Edge, Position};

#[derive(Debug, Clone)]
pub struct ExplorerAgent {
    walker: Walker,
    traits: AgentTraits,
}

impl ExplorerAgent {
    pub fn new(position: Position, traits: AgentTraits) -> Self {
        Self {
            walker: Walker::new(position, traits.speed),
            traits,
        }
    }

    pub fn position(&self) -> &Position {
        self.walker.position()
    }

    pub fn speed(&self) -> f64 {
        self.walker.speed()
    }

    pub fn traits(&self) -> &AgentTraits {
        &self.traits
    }

    pub fn path_taken(&self) -> &Tour {
        self.walker.path_taken()
    }

    pub(crate) fn walker_mut(&mut self) -> &mut Walker {
        &mut self.walker
    }

    /// `(free capacity)^occupancy_weight * (1/length)^distance_weight`,
    /// measured on the first segment of `edge`. Zero-length edges score as
    /// length one.
    pub fn edge_score(&self, graph: &SegmentedGraph, edge: &Edge) -> f64 {
        let Ok(first) = graph.segment_at(&Position::start_of(*edge)) else {
            return 0.0;
        };
        let Ok(segment) = graph.segment(first) else {
            return 0.0;
        };
        let free = segment.free_capacity() as f64;
        let length = edge.length().max(1) as f64;
        free.powf(self.traits.occupancy_weight) * (1.0 / length).powf(self.traits.distance_weight)
    }

    /// Move up to `distance`; decide at the edge end.
    pub fn try_to_move(&mut self, distance: f64, ctx: &mut TickContext<'_>) -> Result<StepOutcome> {
        if self.walker.advance_within_edge(ctx.graph, distance, ctx.margin)? {
            return Ok(StepOutcome::Moved);
        }
        self.decide(ctx)
    }

    fn decide(&mut self, ctx: &mut TickContext<'_>) -> Result<StepOutcome> {
        let added = self.walker.offer_crossing();

        if ctx.goal.is_goal(ctx.graph.graph(), self.walker.path_taken()) {
            if entry_has_room(ctx.graph, self.walker.path_taken())? {
                return Ok(StepOutcome::Promote);
            }
            self.walker.revert_crossing(added);
            return Ok(StepOutcome::Waiting);
        }

        let candidates = candidate_edges(ctx.graph.graph(), self.walker.position(), self.walker.path_taken());
        let graph: &SegmentedGraph = &*ctx.graph;
        let Some(next) = selection::select(&candidates, |e| self.edge_score(graph, e), ctx.rng) else {
            return Ok(StepOutcome::Died);
        };

        match self.walker.advance_to_edge(ctx.graph, next, ctx.margin)? {
            Transition::Entered => Ok(StepOutcome::Moved),
            Transition::Blocked => {
                self.walker.revert_crossing(added);
                Ok(StepOutcome::Waiting)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentKind};
    use flocking_core::goal::{EndNodeGoal, GoalEvaluator};
    use flocking_core::graph::DistanceGraph;
    use flocking_core::ledger::TourLedger;
    use flocking_core::segmented::GraphSettings;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct NoLedger;

    impl TourLedger for NoLedger {
        fn register_tour(&mut self, _tour: &Tour) {}
        fn unregister_tour(&mut self, _tour: &Tour) {}
    }

    fn step(
        explorer: &mut ExplorerAgent,
        graph: &mut SegmentedGraph,
        goal: &dyn GoalEvaluator,
        rng: &mut SmallRng,
    ) -> StepOutcome {
        let mut ledger = NoLedger;
        let mut ctx = TickContext { graph, ledger: &mut ledger, goal, rng, margin: 0.01 };
        let speed = explorer.speed();
        explorer.try_to_move(speed, &mut ctx).unwrap()
    }

    fn spawn(graph: &mut SegmentedGraph, edge: Edge, distance: f64, speed: f64) -> ExplorerAgent {
        let pos = Position::new(edge, distance);
        graph.occupy(&pos).unwrap();
        ExplorerAgent::new(pos, AgentTraits { speed, ..AgentTraits::default() })
    }

    #[test]
    fn score_prefers_free_and_short_edges() {
        let g = DistanceGraph::from_edges(3, &[(0, 1, 2), (0, 2, 8)]).unwrap();
        let mut g = SegmentedGraph::new(g, GraphSettings::new(1.0, 3)).unwrap();
        let short = g.edge(0, 1).unwrap();
        let long = g.edge(0, 2).unwrap();
        let explorer = ExplorerAgent::new(Position::start_of(short), AgentTraits::default());
        assert!((explorer.edge_score(&g, &short) - 1.5).abs() < 1e-12);
        assert!((explorer.edge_score(&g, &long) - 3.0 / 8.0).abs() < 1e-12);

        for _ in 0..3 {
            g.occupy(&Position::start_of(short)).unwrap();
        }
        assert_eq!(explorer.edge_score(&g, &short), 0.0, "full first segment scores zero");
    }

    #[test]
    fn dead_end_kills_explorer() {
        let g = DistanceGraph::from_edges(3, &[(0, 1, 2), (0, 2, 5)]).unwrap();
        let mut g = SegmentedGraph::new(g, GraphSettings::default()).unwrap();
        let edge = g.edge(0, 1).unwrap();
        let mut explorer = spawn(&mut g, edge, 1.5, 2.0);
        let mut rng = SmallRng::seed_from_u64(5);
        // Node 1 only leads back to the start, and node 2 is still unvisited.
        let outcome = step(&mut explorer, &mut g, &EndNodeGoal::new(2), &mut rng);
        assert_eq!(outcome, StepOutcome::Died);
        assert_eq!(g.total_occupancy(), 1, "the population releases occupancy, not the agent");
    }

    #[test]
    fn reaching_goal_with_free_entry_requests_promotion() {
        let mut g = SegmentedGraph::new(flocking_core::instances::basic(), GraphSettings::default()).unwrap();
        let edge = g.edge(0, 1).unwrap();
        let mut explorer = spawn(&mut g, edge, 9.0, 2.0);
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = step(&mut explorer, &mut g, &EndNodeGoal::new(1), &mut rng);
        assert_eq!(outcome, StepOutcome::Promote);
        assert_eq!(explorer.path_taken().locations(), &[0, 1]);
    }

    #[test]
    fn reaching_goal_with_full_entry_waits() {
        let mut g = SegmentedGraph::new(
            flocking_core::instances::basic(),
            GraphSettings::new(1.0, 1),
        )
        .unwrap();
        let edge = g.edge(0, 1).unwrap();
        g.occupy(&Position::start_of(edge)).unwrap();
        let mut explorer = spawn(&mut g, edge, 9.5, 2.0);
        let mut rng = SmallRng::seed_from_u64(5);

        let outcome = step(&mut explorer, &mut g, &EndNodeGoal::new(1), &mut rng);
        assert_eq!(outcome, StepOutcome::Waiting);
        assert_eq!(explorer.path_taken().locations(), &[0], "provisional append rolled back");
        assert_eq!(explorer.position().distance, 9.5);
    }

    /// Explorer one hop short of node 3 on the basic instance, having come
    /// through 0 and 1, with the start of edge 0 -> 1 taken by a blocker.
    fn approaching_node_three() -> (SegmentedGraph, ExplorerAgent, Position) {
        let mut g = SegmentedGraph::new(flocking_core::instances::basic(), GraphSettings::new(1.0, 1)).unwrap();
        let entry = Position::start_of(g.edge(0, 1).unwrap());
        g.occupy(&entry).unwrap();
        let last_hop = g.edge(2, 3).unwrap();
        let mut explorer = spawn(&mut g, last_hop, 14.5, 2.0);
        *explorer.walker_mut().path_taken_mut() = Tour::from_locations(vec![0, 1, 2]);
        (g, explorer, entry)
    }

    #[test]
    fn multi_hop_goal_waits_while_entry_segment_is_full() {
        let (mut g, mut explorer, _) = approaching_node_three();
        let mut rng = SmallRng::seed_from_u64(5);

        let outcome = step(&mut explorer, &mut g, &EndNodeGoal::new(3), &mut rng);
        assert_eq!(outcome, StepOutcome::Waiting);
        assert_eq!(explorer.path_taken().locations(), &[0, 1, 2]);
        assert_eq!(explorer.position().distance, 14.5);
        assert_eq!(Agent::from(explorer).kind(), AgentKind::Explorer);
    }

    #[test]
    fn multi_hop_goal_promotes_once_entry_segment_frees() {
        let (mut g, mut explorer, entry) = approaching_node_three();
        let goal = EndNodeGoal::new(3);
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(step(&mut explorer, &mut g, &goal, &mut rng), StepOutcome::Waiting);

        g.vacate(&entry).unwrap();
        assert_eq!(step(&mut explorer, &mut g, &goal, &mut rng), StepOutcome::Promote);
        assert_eq!(explorer.path_taken().locations(), &[0, 1, 2, 3]);

        let mut agent = Agent::from(explorer);
        let mut ledger = NoLedger;
        let mut ctx = TickContext { graph: &mut g, ledger: &mut ledger, goal: &goal, rng: &mut rng, margin: 0.01 };
        agent.promote(&mut ctx).unwrap();

        let achiever = agent.as_achiever().expect("promoted agent is an achiever");
        assert_eq!(achiever.tour().locations(), &[0, 1, 2, 3]);
        assert_eq!(*achiever.position(), entry, "achiever re-enters at node 0");
        assert_eq!(g.segment(g.segment_at(&entry).unwrap()).unwrap().occupancy(), 1);
        assert_eq!(g.total_occupancy(), 1);
    }

    #[test]
    fn crossing_moves_onto_a_candidate_edge() {
        let mut g = SegmentedGraph::new(flocking_core::instances::basic(), GraphSettings::default()).unwrap();
        let edge = g.edge(0, 1).unwrap();
        let mut explorer = spawn(&mut g, edge, 9.0, 2.0);
        let mut rng = SmallRng::seed_from_u64(9);

        let outcome = step(&mut explorer, &mut g, &EndNodeGoal::new(3), &mut rng);
        assert_eq!(outcome, StepOutcome::Moved);
        let pos = *explorer.position();
        assert_eq!(pos.from(), 1);
        assert!(pos.to() == 2 || pos.to() == 4);
        assert_eq!(pos.distance, 1.0);
        assert_eq!(explorer.path_taken().locations(), &[0, 1]);
        assert_eq!(g.total_occupancy(), 1);
    }
}
