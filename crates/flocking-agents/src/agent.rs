//! The agent variant and the outcome of one step.

use crate::achiever::AchieverAgent;
use crate::chain::ChainAgent;
use crate::context::TickContext;
use crate::explorer::ExplorerAgent;
use flocking_core::error::{AgentError, Result};
use flocking_core::tour::Tour;
use flocking_core::types::{Color, Position};
use serde::{Deserialize, Serialize};

/// What happened to an agent during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Moved along or onto an edge.
    Moved,
    /// Held back by full segments or a full tour entry.
    Waiting,
    /// An achiever restarted its tour.
    Respawned,
    /// An explorer reached the goal and should become an achiever.
    Promote,
    /// No viable next edge. The agent must be removed.
    Died,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Explorer,
    Achiever,
    Chain,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Explorer => write!(f, "explorer"),
            AgentKind::Achiever => write!(f, "achiever"),
            AgentKind::Chain => write!(f, "chain"),
        }
    }
}

/// Any live boid.
#[derive(Debug, Clone)]
pub enum Agent {
    Explorer(ExplorerAgent),
    Achiever(AchieverAgent),
    Chain(ChainAgent),
}

impl Agent {
    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Explorer(_) => AgentKind::Explorer,
            Agent::Achiever(_) => AgentKind::Achiever,
            Agent::Chain(_) => AgentKind::Chain,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            Agent::Explorer(a) => a.position(),
            Agent::Achiever(a) => a.position(),
            Agent::Chain(a) => a.position(),
        }
    }

    pub fn speed(&self) -> f64 {
        match self {
            Agent::Explorer(a) => a.speed(),
            Agent::Achiever(a) => a.speed(),
            Agent::Chain(a) => a.speed(),
        }
    }

    pub fn path_taken(&self) -> &Tour {
        match self {
            Agent::Explorer(a) => a.path_taken(),
            Agent::Achiever(a) => a.path_taken(),
            Agent::Chain(a) => a.path_taken(),
        }
    }

    /// Display color. Searching agents are green.
    pub fn color(&self) -> Color {
        match self {
            Agent::Achiever(a) => a.color(),
            Agent::Explorer(_) | Agent::Chain(_) => Color::GREEN,
        }
    }

    pub fn as_achiever(&self) -> Option<&AchieverAgent> {
        match self {
            Agent::Achiever(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&ChainAgent> {
        match self {
            Agent::Chain(a) => Some(a),
            _ => None,
        }
    }

    /// Turn an explorer into an achiever in place.
    ///
    /// The explorer's trail becomes the achiever's tour. Any other kind of
    /// agent is left untouched and an error returned.
    pub fn promote(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let Agent::Explorer(explorer) = self else {
            return Err(AgentError::InvalidTransition(format!("cannot promote a {}", self.kind())).into());
        };
        let achiever = AchieverAgent::from_explorer(explorer, ctx)?;
        *self = Agent::Achiever(achiever);
        Ok(())
    }
}

impl From<ExplorerAgent> for Agent {
    fn from(agent: ExplorerAgent) -> Self {
        Agent::Explorer(agent)
    }
}

impl From<AchieverAgent> for Agent {
    fn from(agent: AchieverAgent) -> Self {
        Agent::Achiever(agent)
    }
}

impl From<ChainAgent> for Agent {
    fn from(agent: ChainAgent) -> Self {
        Agent::Chain(agent)
    }
}
