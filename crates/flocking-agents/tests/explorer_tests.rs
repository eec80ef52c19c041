//! Explorers walking the basic instance through the public agent API.

use flocking_agents::prelude::*;
use flocking_core::instances;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Default)]
struct NoLedger;

impl TourLedger for NoLedger {
    fn register_tour(&mut self, _tour: &Tour) {}
    fn unregister_tour(&mut self, _tour: &Tour) {}
}

/// Step every explorer until it asks for promotion, checking occupancy
/// after each step. Returns the finished trails in spawn order.
fn walk_to_goal(seed: u64) -> Vec<Vec<usize>> {
    let mut graph = SegmentedGraph::new(instances::basic(), GraphSettings::new(1.0, 4)).unwrap();
    let goal = EndNodeGoal::new(3);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut ledger = NoLedger;

    let edge = graph.edge(0, 1).unwrap();
    let mut explorers: Vec<ExplorerAgent> = (0..3)
        .map(|i| {
            let position = Position::new(edge, f64::from(i));
            graph.occupy(&position).unwrap();
            ExplorerAgent::new(position, AgentTraits::default())
        })
        .collect();
    let mut done = vec![false; explorers.len()];

    for _ in 0..500 {
        for (explorer, done) in explorers.iter_mut().zip(done.iter_mut()) {
            if *done {
                continue;
            }
            let mut ctx = TickContext {
                graph: &mut graph,
                ledger: &mut ledger,
                goal: &goal,
                rng: &mut rng,
                margin: DEFAULT_MARGIN,
            };
            let speed = explorer.speed();
            let outcome = explorer.try_to_move(speed, &mut ctx).unwrap();
            assert_ne!(outcome, StepOutcome::Died, "basic instance has no dead ends from node 0");
            *done = outcome == StepOutcome::Promote;

            graph.check_invariants().expect("segment occupancy out of bounds");
            assert_eq!(graph.total_occupancy(), 3, "explorers must never leave or duplicate occupancy");
        }
        if done.iter().all(|d| *d) {
            break;
        }
    }

    assert!(done.iter().all(|d| *d), "every explorer should reach node 3");
    explorers.iter().map(|e| e.path_taken().locations().to_vec()).collect()
}

#[test]
fn explorers_reach_the_end_node_on_a_simple_path() {
    for trail in walk_to_goal(7) {
        assert!(
            trail == [0, 1, 2, 3] || trail == [0, 1, 4, 3],
            "unexpected trail {:?}",
            trail
        );
    }
}

#[test]
fn same_seed_walks_the_same_trails() {
    assert_eq!(walk_to_goal(11), walk_to_goal(11));
}
