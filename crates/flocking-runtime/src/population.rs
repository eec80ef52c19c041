//! The population - every live agent plus the tour registry.
//!
//! Agents are addressed by generational [`AgentId`] handles, so a handle
//! held across a removal never aliases a newer agent. Stepping an agent
//! first snapshots what it can see (peer tours or chain sightings), then
//! lends it the graph and the registry for its move.

use crate::registry::TourRegistry;
use crate::stats::AgentFrame;
use flocking_agents::achiever::{AchieverAgent, PeerTour};
use flocking_agents::agent::{Agent, AgentKind, StepOutcome};
use flocking_agents::chain::ChainSighting;
use flocking_agents::context::TickContext;
use flocking_agents::explorer::ExplorerAgent;
use flocking_agents::traits::AgentTraits;
use flocking_core::error::Result;
use flocking_core::goal::GoalEvaluator;
use flocking_core::graph::DistanceGraph;
use flocking_core::ledger::TourLedger;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::tour::Tour;
use flocking_core::types::Position;
use rand::RngCore;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle of a live agent.
    pub struct AgentId;
}

/// Result of stepping one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    /// Peer tours adopted before moving.
    pub adoptions: usize,
    /// Where the agent ended the step. For dead agents, where they died.
    pub position: Position,
    /// The followed tour, reported after a promotion or an adoption.
    pub tour: Option<Tour>,
}

#[derive(Debug, Default)]
pub struct Population {
    agents: SlotMap<AgentId, Agent>,
    registry: TourRegistry,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an agent and count it on its segment.
    pub fn spawn(&mut self, agent: impl Into<Agent>, graph: &mut SegmentedGraph) -> Result<AgentId> {
        let agent = agent.into();
        graph.occupy(agent.position())?;
        if let Agent::Achiever(achiever) = &agent {
            self.registry.register_tour(achiever.tour());
        }
        Ok(self.agents.insert(agent))
    }

    pub fn spawn_explorer(
        &mut self,
        position: Position,
        traits: AgentTraits,
        graph: &mut SegmentedGraph,
    ) -> Result<AgentId> {
        self.spawn(ExplorerAgent::new(position, traits), graph)
    }

    /// Remove an agent and release its segment.
    pub fn remove(&mut self, id: AgentId, graph: &mut SegmentedGraph) -> Result<Option<Agent>> {
        let Some(agent) = self.agents.remove(id) else {
            return Ok(None);
        };
        graph.vacate(agent.position())?;
        if let Agent::Achiever(achiever) = &agent {
            self.registry.unregister_tour(achiever.tour());
        }
        Ok(Some(agent))
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Handles of every live agent, in iteration order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.agents.values().filter(|a| a.kind() == kind).count()
    }

    pub fn explorer_count(&self) -> usize {
        self.count(AgentKind::Explorer)
    }

    pub fn achiever_count(&self) -> usize {
        self.count(AgentKind::Achiever)
    }

    pub fn registry(&self) -> &TourRegistry {
        &self.registry
    }

    /// Share of the live population following `tour`.
    pub fn density(&self, tour: &Tour) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.registry.count(tour) as f64 / self.agents.len() as f64
    }

    /// Every followed tour with its density, least followed first.
    pub fn tours_by_population(&self) -> Vec<(Tour, f64)> {
        let live = self.agents.len().max(1) as f64;
        self.registry
            .tours_by_population()
            .into_iter()
            .map(|(tour, followers)| (tour, followers as f64 / live))
            .collect()
    }

    /// The most followed tour and its density.
    pub fn most_dense_tour(&self) -> Option<(Tour, f64)> {
        if self.agents.is_empty() {
            return None;
        }
        let (tour, followers) = self.registry.most_popular()?;
        Some((tour.clone(), followers as f64 / self.agents.len() as f64))
    }

    /// The most dense tour, if it reaches `threshold`.
    pub fn converged(&self, threshold: f64) -> Option<(Tour, f64)> {
        self.most_dense_tour().filter(|(_, density)| *density >= threshold)
    }

    pub fn frames(&self) -> Vec<AgentFrame> {
        self.agents
            .iter()
            .map(|(id, agent)| AgentFrame {
                id,
                kind: agent.kind(),
                position: *agent.position(),
                color: agent.color(),
            })
            .collect()
    }

    /// Step one agent. Returns `None` if the handle is stale.
    ///
    /// Promoted explorers turn into achievers under the same handle. Dead
    /// agents are removed and their segment released.
    pub fn step(
        &mut self,
        id: AgentId,
        graph: &mut SegmentedGraph,
        goal: &dyn GoalEvaluator,
        rng: &mut dyn RngCore,
        margin: f64,
    ) -> Result<Option<StepReport>> {
        let Some(kind) = self.agents.get(id).map(Agent::kind) else {
            return Ok(None);
        };
        let peers = match kind {
            AgentKind::Achiever => self.visible_achievers(id, graph.graph()),
            _ => Vec::new(),
        };
        let sightings = match kind {
            AgentKind::Chain => self.chain_sightings(id, graph.graph()),
            _ => Vec::new(),
        };

        let Population { agents, registry } = self;
        let Some(agent) = agents.get_mut(id) else {
            return Ok(None);
        };
        let mut ctx = TickContext { graph: &mut *graph, ledger: registry, goal, rng, margin };

        let mut adoptions = 0;
        let outcome = match agent {
            Agent::Explorer(explorer) => {
                let speed = explorer.speed();
                explorer.try_to_move(speed, &mut ctx)?
            }
            Agent::Achiever(achiever) => {
                // Adopting changes speed; this step still uses the old one.
                let speed = achiever.speed();
                adoptions = achiever.absorb_peers(&peers, ctx.ledger);
                achiever.try_to_move(speed, &mut ctx)?
            }
            Agent::Chain(chain) => {
                let speed = chain.speed();
                chain.try_to_move(speed, &sightings, &mut ctx)?
            }
        };

        if outcome == StepOutcome::Promote {
            agent.promote(&mut ctx)?;
        }
        let position = *agent.position();
        let tour = match agent {
            Agent::Achiever(achiever) if outcome == StepOutcome::Promote || adoptions > 0 => {
                Some(achiever.tour().clone())
            }
            _ => None,
        };
        if outcome == StepOutcome::Died {
            ctx.graph.vacate(&position)?;
            if let Some(Agent::Achiever(achiever)) = agents.remove(id) {
                ctx.ledger.unregister_tour(achiever.tour());
            }
        }

        Ok(Some(StepReport { outcome, adoptions, position, tour }))
    }

    fn visible_achievers(&self, id: AgentId, graph: &DistanceGraph) -> Vec<PeerTour> {
        let Some(me) = self.agents.get(id).and_then(Agent::as_achiever) else {
            return Vec::new();
        };
        self.agents
            .iter()
            .filter(|(other, _)| *other != id)
            .filter_map(|(_, agent)| agent.as_achiever())
            .filter(|peer| me.can_see(graph, peer.position()))
            .map(AchieverAgent::as_peer)
            .collect()
    }

    fn chain_sightings(&self, id: AgentId, graph: &DistanceGraph) -> Vec<ChainSighting> {
        let Some(me) = self.agents.get(id).and_then(Agent::as_chain) else {
            return Vec::new();
        };
        self.agents
            .iter()
            .filter(|(other, _)| *other != id)
            .filter(|(_, agent)| me.can_see(graph, agent.position()))
            .map(|(_, agent)| match agent.as_chain() {
                Some(chain) => chain.as_sighting(),
                None => ChainSighting { position: *agent.position(), cities_checked: Vec::new() },
            })
            .collect()
    }
}
