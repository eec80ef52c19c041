//! Chain agent - the explorer used by the chain-tracing variant.
//!
//! Chain agents never promote. When one reaches the goal it records the
//! node it is about to cross in its `cities_checked` chain and parks at the
//! edge end. Agents behind it pick the chain up, and a newcomer whose trail
//! joined with a parked agent's reversed chain forms a goal tour commits to
//! that agent's edge. Edges fill up along good tours until a backtracking
//! tracer can read a tour off the saturated edges.

use crate::agent::StepOutcome;
use crate::context::TickContext;
use crate::motion::{candidate_edges, Transition, Walker};
use crate::selection;
use crate::traits::AgentTraits;
use flocking_core::error::Result;
use flocking_core::graph::DistanceGraph;
use flocking_core::tour::Tour;
use flocking_core::types::{Edge, Position};

/// A visible agent, as seen by a chain agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSighting {
    pub position: Position,
    pub cities_checked: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ChainAgent {
    walker: Walker,
    traits: AgentTraits,
    cities_checked: Vec<usize>,
}

impl ChainAgent {
    pub fn new(position: Position, traits: AgentTraits) -> Self {
        Self {
            walker: Walker::new(position, traits.speed),
            traits,
            cities_checked: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        self.walker.position()
    }

    pub fn speed(&self) -> f64 {
        self.walker.speed()
    }

    pub fn path_taken(&self) -> &Tour {
        self.walker.path_taken()
    }

    pub fn cities_checked(&self) -> &[usize] {
        &self.cities_checked
    }

    pub fn as_sighting(&self) -> ChainSighting {
        ChainSighting {
            position: *self.walker.position(),
            cities_checked: self.cities_checked.clone(),
        }
    }

    /// Edges the agent could take at the end of its current edge.
    pub fn neighbor_edges(&self, graph: &DistanceGraph) -> Vec<Edge> {
        candidate_edges(graph, self.walker.position(), self.walker.path_taken())
    }

    /// Like achiever vision, but the spill-over past the edge end only
    /// covers the agent's own candidate edges.
    pub fn can_see(&self, graph: &DistanceGraph, other: &Position) -> bool {
        let me = self.walker.position();
        let vision = self.traits.vision_range;
        let to_end = me.distance_to_end();

        if other.is_strictly_same_edge(me) {
            let ahead = other.distance - me.distance;
            return ahead >= 0.0 && (to_end < vision || ahead <= vision);
        }
        if to_end >= vision || other.distance > vision - to_end {
            return false;
        }
        self.neighbor_edges(graph)
            .iter()
            .any(|e| e.is_strictly_same(&other.edge))
    }

    /// Copy the chain of a visible agent on this directed edge whose chain
    /// already contains the node we are heading to.
    pub fn absorb_chains(&mut self, sightings: &[ChainSighting]) {
        let me = *self.walker.position();
        for sighting in sightings {
            if sighting.position.is_strictly_same_edge(&me) && sighting.cities_checked.contains(&me.to()) {
                self.cities_checked = sighting.cities_checked.clone();
            }
        }
    }

    /// Move up to `distance`; decide at the edge end. `sightings` are the
    /// agents currently in sight.
    pub fn try_to_move(
        &mut self,
        distance: f64,
        sightings: &[ChainSighting],
        ctx: &mut TickContext<'_>,
    ) -> Result<StepOutcome> {
        self.absorb_chains(sightings);
        if self.walker.advance_within_edge(ctx.graph, distance, ctx.margin)? {
            return Ok(StepOutcome::Moved);
        }
        self.decide(sightings, ctx)
    }

    fn decide(&mut self, sightings: &[ChainSighting], ctx: &mut TickContext<'_>) -> Result<StepOutcome> {
        let added = self.walker.offer_crossing();

        if ctx.goal.is_goal(ctx.graph.graph(), self.walker.path_taken()) {
            let crossing = self.walker.position().to();
            if !self.cities_checked.contains(&crossing) {
                self.cities_checked.push(crossing);
            }
            self.walker.revert_crossing(added);
            let park = self.walker.position().distance_to_end() - ctx.margin;
            if park > 0.0 {
                self.walker.advance_within_edge(ctx.graph, park, ctx.margin)?;
            }
            return Ok(StepOutcome::Waiting);
        }

        let mut candidates = self.neighbor_edges(ctx.graph.graph());
        self.follow_chains(&mut candidates, sightings, ctx);
        if candidates.is_empty() {
            return Ok(StepOutcome::Died);
        }

        let choices = candidates.len() as f64;
        let occupancy_weight = self.traits.occupancy_weight;
        let distance_weight = self.traits.distance_weight;
        let score = |e: &Edge| {
            let visible = sightings.iter().filter(|s| s.position.edge.is_strictly_same(e)).count() as f64;
            visible.powf(occupancy_weight) + (1.0 / choices).powf(distance_weight)
        };
        let Some(next) = selection::select(&candidates, score, ctx.rng) else {
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

    /// If a saturated candidate edge holds an agent whose reversed chain
    /// completes our trail into a goal tour, take its chain and commit to
    /// that edge.
    fn follow_chains(&mut self, candidates: &mut Vec<Edge>, sightings: &[ChainSighting], ctx: &TickContext<'_>) {
        let graph = &*ctx.graph;
        for edge in candidates.clone() {
            if !graph.is_edge_full(&edge) {
                continue;
            }
            for sighting in sightings.iter().filter(|s| s.position.edge.is_strictly_same(&edge)) {
                let mut joined = self.walker.path_taken().clone();
                for &city in sighting.cities_checked.iter().rev() {
                    joined.offer(city);
                }
                if ctx.goal.is_goal(graph.graph(), &joined) {
                    self.cities_checked = sighting.cities_checked.clone();
                    self.cities_checked.push(edge.from());
                    *candidates = vec![edge];
                    return;
                }
            }
        }
    }
}
