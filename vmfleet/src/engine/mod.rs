//! Remote virtualization engine interface.
//!
//! The engine executes everything; this crate only drives it:
//! - **VirtualizationEngine**: opens sessions and unregisters machines
//! - **MachineSession**: console and machine calls made under a session
//! - **ProgressHandle**: terminal result of a long-running call

mod progress;
mod session;

pub use progress::{ProgressHandle, await_progress};
pub use session::MachineSession;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vmfleet_shared::{ActionError, RemoteError};

use crate::machine::MachineId;

/// Lock requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// Configuration lock; the machine must not be locked by anyone else.
    Write,
    /// Control of an already running machine's console.
    Control,
    /// Read/spectate access that never excludes other holders.
    Shared,
}

impl SessionMode {
    /// Modes that count against the one-exclusive-session-per-machine rule.
    pub fn is_exclusive(self) -> bool {
        matches!(self, SessionMode::Write | SessionMode::Control)
    }
}

/// Front-end flavour used when launching a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchMode {
    Default,
    Headless,
    Detachable,
}

/// Why a session could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("machine {0} already has an exclusive session")]
    Busy(MachineId),

    #[error("machine {0} is inaccessible")]
    MachineInaccessible(MachineId),

    /// The engine itself could not be reached.
    #[error("engine unreachable: {0}")]
    Unreachable(String),
}

impl From<SessionError> for ActionError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy(_) => ActionError::SessionBusy,
            SessionError::MachineInaccessible(_) => ActionError::MachineInaccessible,
            SessionError::Unreachable(msg) => ActionError::EngineUnreachable(msg),
        }
    }
}

/// Remote engine exposing machines and sessions.
#[async_trait]
pub trait VirtualizationEngine: Send + Sync {
    /// Open a session of `mode` on machine `id`.
    ///
    /// May block or time out on the remote side; the caller adds no
    /// waiting of its own.
    async fn open_session(
        &self,
        id: &MachineId,
        mode: SessionMode,
    ) -> Result<Box<dyn MachineSession>, SessionError>;

    /// Unregister a machine, optionally deleting its files.
    async fn unregister(&self, id: &MachineId, delete_files: bool) -> Result<(), RemoteError>;
}
