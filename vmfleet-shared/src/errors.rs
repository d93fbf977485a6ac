//! Error taxonomy.
//!
//! Two layers:
//! - [`FleetError`]: failures of the orchestrator itself (configuration,
//!   collaborator wiring, internal invariants).
//! - [`ActionError`]: the outcome of one machine inside a batch. These are
//!   captured per item and never abort the batch on their own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for orchestrator-level operations.
pub type FleetResult<T> = Result<T, FleetError>;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("engine error: {0}")]
    Engine(#[from] RemoteError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by the remote virtualization engine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("remote call failed with code {code:#x}: {message}")]
pub struct RemoteError {
    pub code: i32,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Per-machine failure inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionError {
    /// Another holder already owns an exclusive session on the machine.
    #[error("machine is locked by another session")]
    SessionBusy,

    /// The machine record could not be loaded.
    #[error("machine is inaccessible")]
    MachineInaccessible,

    /// The engine could not be reached to open a session at all.
    #[error("engine unreachable: {0}")]
    EngineUnreachable(String),

    #[error("remote operation failed with code {code:#x}: {message}")]
    RemoteOperationFailed { code: i32, message: String },

    #[error("cancelled by user")]
    UserCancelled,

    /// The action was not permitted for this machine when re-checked.
    #[error("action is not permitted in the current machine state")]
    PreconditionNotMet,
}

impl ActionError {
    /// Whether this failure means the rest of the batch cannot proceed.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, ActionError::EngineUnreachable(_))
    }
}

impl From<RemoteError> for ActionError {
    fn from(err: RemoteError) -> Self {
        ActionError::RemoteOperationFailed {
            code: err.code,
            message: err.message,
        }
    }
}
