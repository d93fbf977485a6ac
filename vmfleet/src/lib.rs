//! vmfleet: decides which actions a VM selection permits and runs them.
//!
//! The crate sits between a UI layer and a remote virtualization engine.
//! It never executes machines itself; it gates actions, locks machines
//! through engine sessions and reports per-machine outcomes.
//!
//! Entry point is [`Orchestrator`], built from [`OrchestratorOptions`] and
//! a set of [`Collaborators`].

pub mod action;
pub mod enablement;
pub mod engine;
pub mod executor;
pub mod frontend;
pub mod logging;
pub mod machine;
pub mod metrics;
pub mod options;
pub mod orchestrator;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{ActionKind, ActionParams, ActionRequest};
pub use enablement::{EnablementSnapshot, EvalContext, MachineTool, StartOrShowHint};
pub use executor::{BatchReport, BatchStatus, ExecutionMode, ItemOutcome, PerItemResult};
pub use logging::init_logging;
pub use machine::{MachineId, MachineRecord, MachineState};
pub use metrics::OrchestratorMetrics;
pub use options::{LoggingOptions, OrchestratorOptions, ShortcutStyle};
pub use orchestrator::{Collaborators, Orchestrator};
pub use session::{Session, SessionManager};

pub use vmfleet_shared::{ActionError, FleetError, FleetResult, RemoteError};
