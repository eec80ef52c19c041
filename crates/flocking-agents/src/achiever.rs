//! Achiever - loops a goal tour and converges on the shortest one in sight.
//!
//! Achievers are born from explorers that reached the goal. They follow
//! their tour as a queue of waypoints, respawn at its start when the queue
//! runs dry, and copy any visible peer whose tour is shorter (or equally
//! short and faster). That imitation is what drives the flock to consensus.

use crate::agent::StepOutcome;
use crate::context::TickContext;
use crate::explorer::ExplorerAgent;
use crate::motion::{entry_has_room, Transition, Walker};
use flocking_core::error::{FlockError, Result};
use flocking_core::graph::DistanceGraph;
use flocking_core::ledger::TourLedger;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::tour::Tour;
use flocking_core::types::{Color, Position};
use rand::{Rng, RngCore};
use std::collections::VecDeque;

/// Speed multiplier granted on promotion: `1 + (p / 10) / cost`, where `p`
/// is the largest power of ten not above `cost`.
pub fn speed_modifier(cost: u64) -> f64 {
    if cost == 0 {
        return 1.0;
    }
    let mut p: u64 = 1;
    while let Some(next) = p.checked_mul(10) {
        if next > cost {
            break;
        }
        p = next;
    }
    1.0 + (p as f64 / 10.0) / cost as f64
}

/// A random achiever color: red and blue channels only.
pub fn random_color(rng: &mut dyn RngCore) -> Color {
    Color::new(rng.random::<f32>(), 0.0, rng.random::<f32>())
}

/// What one achiever needs to know about a visible peer to imitate it.
#[derive(Debug, Clone)]
pub struct PeerTour {
    pub position: Position,
    pub tour: Tour,
    pub speed: f64,
    pub queue: Vec<usize>,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct AchieverAgent {
    walker: Walker,
    vision_range: f64,
    tour: Tour,
    queue: VecDeque<usize>,
    color: Color,
}

impl AchieverAgent {
    /// Achiever at `position` following `tour`, with an empty queue.
    ///
    /// Registering the tour and counting the position are up to the caller.
    pub fn new(position: Position, speed: f64, vision_range: f64, tour: Tour, color: Color) -> Self {
        Self {
            walker: Walker::new(position, speed),
            vision_range,
            tour,
            queue: VecDeque::new(),
            color,
        }
    }

    /// Promote an explorer whose trail satisfies the goal.
    ///
    /// The trail becomes the tour (cost computed, registered), speed gets
    /// the tour-length boost, and the new achiever respawns at the tour's
    /// entry edge. The explorer is left with an empty trail.
    pub fn from_explorer(explorer: &mut ExplorerAgent, ctx: &mut TickContext<'_>) -> Result<Self> {
        let vision_range = explorer.traits().vision_range;
        let walker = explorer.walker_mut();
        let mut tour = walker.take_path();
        let cost = tour.calculate_cost(ctx.graph.graph())?;
        ctx.ledger.register_tour(&tour);

        let speed = walker.speed() * speed_modifier(cost);
        let color = random_color(ctx.rng);
        let mut achiever = Self::new(*walker.position(), speed, vision_range, tour, color);
        achiever.respawn(ctx.graph)?;
        Ok(achiever)
    }

    pub fn position(&self) -> &Position {
        self.walker.position()
    }

    pub fn speed(&self) -> f64 {
        self.walker.speed()
    }

    pub fn vision_range(&self) -> f64 {
        self.vision_range
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Cached cost of the followed tour; unknown costs sort last.
    pub fn cost(&self) -> u64 {
        self.tour.last_calculated_cost().unwrap_or(u64::MAX)
    }

    pub fn queue(&self) -> &VecDeque<usize> {
        &self.queue
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn path_taken(&self) -> &Tour {
        self.walker.path_taken()
    }

    pub fn as_peer(&self) -> PeerTour {
        PeerTour {
            position: *self.walker.position(),
            tour: self.tour.clone(),
            speed: self.walker.speed(),
            queue: self.queue.iter().copied().collect(),
            color: self.color,
        }
    }

    /// Restart the tour from its entry edge.
    pub fn respawn(&mut self, graph: &mut SegmentedGraph) -> Result<()> {
        self.walker.path_taken_mut().clear();
        self.queue = self.tour.locations().iter().copied().collect();
        let first = self.queue.pop_front();
        let second = self.queue.pop_front();
        let (Some(first), Some(second)) = (first, second) else {
            return Err(FlockError::invalid_route(first.unwrap_or_default(), second.unwrap_or_default()));
        };
        let edge = graph
            .edge(first, second)
            .ok_or_else(|| FlockError::invalid_route(first, second))?;
        self.walker.set_position(graph, Position::start_of(edge))?;
        self.walker.path_taken_mut().offer(first);
        Ok(())
    }

    /// Whether an agent at `other` is in sight.
    ///
    /// Far from the edge end only the stretch ahead on the same directed
    /// edge is visible. Near the end the whole stretch ahead is, plus the
    /// first `vision_range - distance_to_end` of every edge leaving `to`.
    pub fn can_see(&self, graph: &DistanceGraph, other: &Position) -> bool {
        let me = self.walker.position();
        let to_end = me.distance_to_end();
        let ahead = other.distance - me.distance;

        if other.is_strictly_same_edge(me) {
            return ahead >= 0.0 && (to_end < self.vision_range || ahead <= self.vision_range);
        }
        if to_end >= self.vision_range {
            return false;
        }
        other.from() == me.to()
            && graph.has_edge(other.from(), other.to())
            && other.distance <= self.vision_range - to_end
    }

    /// Imitate every peer with a strictly shorter tour, or an equally short
    /// one and a higher speed. Returns how many adoptions happened.
    pub fn absorb_peers(&mut self, peers: &[PeerTour], ledger: &mut dyn TourLedger) -> usize {
        let mut adopted = 0;
        for peer in peers {
            let theirs = peer.tour.last_calculated_cost().unwrap_or(u64::MAX);
            let own = self.cost();
            if theirs < own || (theirs == own && peer.speed > self.speed()) {
                self.adopt(peer, ledger);
                adopted += 1;
            }
        }
        adopted
    }

    fn adopt(&mut self, peer: &PeerTour, ledger: &mut dyn TourLedger) {
        ledger.unregister_tour(&self.tour);
        self.tour = peer.tour.clone();
        ledger.register_tour(&self.tour);

        self.walker.set_speed(self.speed().max(peer.speed));
        self.color = peer.color;

        let mut queue = VecDeque::with_capacity(peer.queue.len() + 1);
        if self.walker.position().to() == peer.position.from() {
            queue.push_back(peer.position.to());
        }
        queue.extend(peer.queue.iter().copied());
        self.queue = queue;
    }

    /// Move up to `distance`; pick the next waypoint at the edge end.
    pub fn try_to_move(&mut self, distance: f64, ctx: &mut TickContext<'_>) -> Result<StepOutcome> {
        if self.walker.advance_within_edge(ctx.graph, distance, ctx.margin)? {
            return Ok(StepOutcome::Moved);
        }
        self.decide(ctx)
    }

    fn decide(&mut self, ctx: &mut TickContext<'_>) -> Result<StepOutcome> {
        let added = self.walker.offer_crossing();

        let Some(&next) = self.queue.front() else {
            if entry_has_room(ctx.graph, &self.tour)? {
                self.respawn(ctx.graph)?;
                return Ok(StepOutcome::Respawned);
            }
            self.walker.revert_crossing(added);
            return Ok(StepOutcome::Waiting);
        };

        let here = self.walker.position().to();
        if next == here {
            return Err(FlockError::invalid_route(here, next));
        }
        let edge = ctx
            .graph
            .edge(here, next)
            .ok_or_else(|| FlockError::invalid_route(here, next))?;

        match self.walker.advance_to_edge(ctx.graph, edge, ctx.margin)? {
            Transition::Entered => {
                self.queue.pop_front();
                Ok(StepOutcome::Moved)
            }
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
    use crate::traits::AgentTraits;
    use flocking_core::error::AgentError;
    use flocking_core::goal::{EndNodeGoal, GoalEvaluator};
    use flocking_core::segmented::GraphSettings;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[derive(Default)]
    struct CountingLedger {
        counts: HashMap<Tour, usize>,
    }

    impl TourLedger for CountingLedger {
        fn register_tour(&mut self, tour: &Tour) {
            *self.counts.entry(tour.clone()).or_insert(0) += 1;
        }

        fn unregister_tour(&mut self, tour: &Tour) {
            if let Some(count) = self.counts.get_mut(tour) {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(tour);
                }
            }
        }
    }

    /// 0-1 (5), 1-2 (10), 0-3 (5), 3-2 (5)
    fn diamond() -> SegmentedGraph {
        let g = DistanceGraph::from_edges(4, &[(0, 1, 5), (1, 2, 10), (0, 3, 5), (3, 2, 5)]).unwrap();
        SegmentedGraph::new(g, GraphSettings::default()).unwrap()
    }

    fn promoted(
        graph: &mut SegmentedGraph,
        ledger: &mut CountingLedger,
        path: &[usize],
        speed: f64,
        seed: u64,
    ) -> AchieverAgent {
        let n = path.len();
        let edge = graph.edge(path[n - 2], path[n - 1]).unwrap();
        let at = Position::new(edge, edge.length() as f64 - 0.5);
        graph.occupy(&at).unwrap();
        let mut explorer = ExplorerAgent::new(at, AgentTraits { speed, ..AgentTraits::default() });
        let trail = explorer.walker_mut().path_taken_mut();
        trail.clear();
        for &node in path {
            trail.offer(node);
        }
        let goal = EndNodeGoal::new(path[n - 1]);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ctx = TickContext { graph, ledger, goal: &goal, rng: &mut rng, margin: 0.01 };
        AchieverAgent::from_explorer(&mut explorer, &mut ctx).unwrap()
    }

    #[test]
    fn speed_modifier_uses_largest_power_of_ten_below_cost() {
        assert_eq!(speed_modifier(0), 1.0);
        assert!((speed_modifier(37) - (1.0 + 1.0 / 37.0)).abs() < 1e-12);
        assert!((speed_modifier(5) - 1.02).abs() < 1e-12);
        assert!((speed_modifier(100) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn promotion_registers_tour_and_respawns_at_entry() {
        let mut g = diamond();
        let mut ledger = CountingLedger::default();
        let a = promoted(&mut g, &mut ledger, &[0, 1, 2], 2.0, 1);

        assert_eq!(a.tour().locations(), &[0, 1, 2]);
        assert_eq!(a.cost(), 15);
        assert_eq!(ledger.counts.get(a.tour()), Some(&1));
        assert_eq!(*a.position(), Position::start_of(g.edge(0, 1).unwrap()));
        assert_eq!(a.queue().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(a.path_taken().locations(), &[0]);
        assert_eq!(g.total_occupancy(), 1, "occupancy moved with the agent");
        assert!((a.speed() - 2.0 * (1.0 + 1.0 / 15.0)).abs() < 1e-12);
        assert_eq!(a.color().g, 0.0);
    }

    #[test]
    fn shorter_peer_tour_is_adopted_without_slowing_down() {
        let mut g = diamond();
        let mut ledger = CountingLedger::default();
        let mut slow_long = promoted(&mut g, &mut ledger, &[0, 1, 2], 5.0, 1);
        let fast_short = promoted(&mut g, &mut ledger, &[0, 3, 2], 3.0, 2);
        let before = slow_long.speed();

        let adopted = slow_long.absorb_peers(&[fast_short.as_peer()], &mut ledger);
        assert_eq!(adopted, 1);
        assert_eq!(slow_long.tour(), fast_short.tour());
        assert_eq!(slow_long.cost(), 10);
        assert_eq!(slow_long.speed(), before, "speed never drops on adoption");
        assert_eq!(slow_long.color(), fast_short.color());
        assert_eq!(ledger.counts.get(fast_short.tour()), Some(&2));
        assert!(!ledger.counts.contains_key(&Tour::from_locations(vec![0, 1, 2])));
    }

    #[test]
    fn equal_cost_adopts_only_faster_peers() {
        let mut g = diamond();
        let mut ledger = CountingLedger::default();
        let mut a = promoted(&mut g, &mut ledger, &[0, 3, 2], 2.0, 1);
        let slower = promoted(&mut g, &mut ledger, &[0, 3, 2], 1.0, 2);
        let faster = promoted(&mut g, &mut ledger, &[0, 3, 2], 4.0, 3);

        assert_eq!(a.absorb_peers(&[slower.as_peer()], &mut ledger), 0);
        assert_eq!(a.absorb_peers(&[faster.as_peer()], &mut ledger), 1);
        assert_eq!(a.speed(), faster.speed());
        assert_eq!(ledger.counts.get(a.tour()), Some(&3));
    }

    #[test]
    fn longer_peer_tour_is_ignored() {
        let mut g = diamond();
        let mut ledger = CountingLedger::default();
        let mut short = promoted(&mut g, &mut ledger, &[0, 3, 2], 2.0, 1);
        let long = promoted(&mut g, &mut ledger, &[0, 1, 2], 9.0, 2);
        assert_eq!(short.absorb_peers(&[long.as_peer()], &mut ledger), 0);
        assert_eq!(short.cost(), 10);
    }

    #[test]
    fn adoption_queues_peer_node_when_peer_is_one_edge_ahead() {
        let mut g = diamond();
        let mut ledger = CountingLedger::default();
        let mut a = promoted(&mut g, &mut ledger, &[0, 1, 2], 2.0, 1);
        let peer = PeerTour {
            position: Position::new(g.edge(1, 2).unwrap(), 1.0),
            tour: {
                let mut t = Tour::from_locations(vec![0, 1, 2]);
                t.calculate_cost(g.graph()).unwrap();
                t
            },
            speed: 3.0,
            queue: vec![],
            color: Color::new(1.0, 0.0, 0.0),
        };
        assert_eq!(a.absorb_peers(&[peer], &mut ledger), 1);
        assert_eq!(a.queue().iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn vision_far_from_edge_end_covers_range_ahead() {
        let g = diamond();
        let edge = g.edge(1, 2).unwrap();
        let a = AchieverAgent::new(Position::new(edge, 1.0), 1.0, 4.0, Tour::new(), Color::GREEN);
        assert!(a.can_see(g.graph(), &Position::new(edge, 4.0)));
        assert!(a.can_see(g.graph(), &Position::new(edge, 5.0)));
        assert!(!a.can_see(g.graph(), &Position::new(edge, 5.5)));
        assert!(!a.can_see(g.graph(), &Position::new(edge, 0.5)), "behind");
        assert!(!a.can_see(g.graph(), &Position::new(edge.reversed(), 8.5)), "opposite direction");
    }

    #[test]
    fn vision_near_edge_end_spills_onto_next_edges() {
        let g = diamond();
        let edge = g.edge(0, 1).unwrap();
        let a = AchieverAgent::new(Position::new(edge, 3.0), 1.0, 4.0, Tour::new(), Color::GREEN);
        assert!(a.can_see(g.graph(), &Position::new(edge, 4.9)));
        assert!(a.can_see(g.graph(), &Position::new(g.edge(1, 2).unwrap(), 2.0)));
        assert!(!a.can_see(g.graph(), &Position::new(g.edge(1, 2).unwrap(), 2.5)));
        assert!(!a.can_see(g.graph(), &Position::new(g.edge(3, 2).unwrap(), 0.0)));
    }

    #[test]
    fn repeated_waypoint_is_a_route_error() {
        let mut g = diamond();
        let edge = g.edge(0, 1).unwrap();
        let start = Position::start_of(edge);
        g.occupy(&start).unwrap();
        let mut a = AchieverAgent::new(start, 6.0, 4.0, Tour::from_locations(vec![0, 1, 1, 2]), Color::GREEN);
        a.respawn(&mut g).unwrap();

        let mut ledger = CountingLedger::default();
        let goal = EndNodeGoal::new(2);
        let mut rng = SmallRng::seed_from_u64(0);
        let mut ctx = TickContext { graph: &mut g, ledger: &mut ledger, goal: &goal, rng: &mut rng, margin: 0.01 };
        let err = a.try_to_move(6.0, &mut ctx).unwrap_err();
        assert_eq!(err, FlockError::Agent(AgentError::InvalidRoute { from: 1, to: 1 }));
    }

    #[test]
    fn exhausted_queue_respawns_at_tour_start() {
        let mut g = diamond();
        let edge = g.edge(0, 3).unwrap();
        let start = Position::start_of(edge);
        g.occupy(&start).unwrap();
        let mut a = AchieverAgent::new(start, 6.0, 4.0, Tour::from_locations(vec![0, 3]), Color::GREEN);
        a.respawn(&mut g).unwrap();
        assert!(a.queue().is_empty());

        let mut ledger = CountingLedger::default();
        let goal = EndNodeGoal::new(3);
        let mut rng = SmallRng::seed_from_u64(0);
        let mut ctx = TickContext { graph: &mut g, ledger: &mut ledger, goal: &goal, rng: &mut rng, margin: 0.01 };
        assert!(goal.is_goal(ctx.graph.graph(), a.tour()));
        assert_eq!(a.try_to_move(6.0, &mut ctx).unwrap(), StepOutcome::Respawned);
        assert_eq!(*a.position(), start);
        assert_eq!(g.total_occupancy(), 1);
    }
}
