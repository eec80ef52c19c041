//! Flocking Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use flocking_runtime::prelude::*;
//! ```

pub use crate::backtracker::SolutionBacktracker;
pub use crate::chain_tracing::{ChainTracing, ChainTracingSimulation};
pub use crate::config::{SimulationConfig, SolveParams};
pub use crate::observer::{NullObserver, ObserverEvent, RecordingObserver, SimulationObserver, TracingObserver};
pub use crate::population::{AgentId, Population, StepReport};
pub use crate::problem::{Problem, SolveOutcome};
pub use crate::registry::TourRegistry;
pub use crate::simulation::Simulation;
pub use crate::spawn::{SpawnPolicy, StartNodeSpawn};
pub use crate::stats::{AgentFrame, RunStats};
pub use crate::variant::{Consensus, Convergence, Variant};

// Re-export agents and core
pub use flocking_agents::prelude::*;
