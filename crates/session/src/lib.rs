//! Simulation sessions and the registry that owns them
//!
//! A [`SimulationSession`] couples one vehicle's state with its PID
//! controller and a bounded step history. [`SessionRegistry`] hands out ids,
//! enforces the session limit and runs parameter sweeps.

pub mod config;
pub mod diagnostics;
pub mod history;
pub mod registry;
pub mod session;
pub mod statistics;
pub mod sweep;

pub use config::{GainsUpdate, ParamUpdate, SimulationConfig, SlipResponse};
pub use diagnostics::Diagnostics;
pub use history::{HISTORY_CAPACITY, History, HistoryEntry};
pub use registry::{RegistryStatus, SessionHandle, SessionId, SessionRegistry, SessionSummary};
pub use session::{SimulationSession, StepOutcome};
pub use statistics::SummaryStatistics;
pub use sweep::{SweepOutcome, SweepParameter, SweepReport, SweepRequest, SweepResult, run_sweep};
