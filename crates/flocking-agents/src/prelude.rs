//! Flocking Agents Prelude - convenient imports for common usage.
//!
//! ```rust
//! use flocking_agents::prelude::*;
//! ```

// Re-export agent types
pub use crate::agent::{Agent, AgentKind, StepOutcome};
pub use crate::explorer::ExplorerAgent;
pub use crate::achiever::{speed_modifier, AchieverAgent, PeerTour};
pub use crate::chain::{ChainAgent, ChainSighting};
pub use crate::context::{TickContext, DEFAULT_MARGIN};
pub use crate::motion::{Transition, Walker};
pub use crate::selection::RouletteWheel;
pub use crate::traits::AgentTraits;

// Re-export from core
pub use flocking_core::prelude::*;
