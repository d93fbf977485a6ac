//! Presentation-side collaborators.
//!
//! The orchestrator never renders anything. It asks these traits to
//! confirm batches, report per-machine failures, and host the sub-flows
//! and desktop integrations that belong to the UI layer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vmfleet_shared::{ActionError, FleetResult};

use crate::action::ActionKind;
use crate::machine::{MachineId, MachineRecord};

/// Question asked before a batch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmKind {
    StartMultiple,
    Reset,
    DiscardSavedState,
    AcpiShutdown,
    PowerOff,
    Remove,
}

/// Asks the user to confirm a batch. Synchronous from the executor's view.
pub trait Confirmer: Send + Sync {
    /// `names` is the comma-joined display names of the eligible machines
    /// in selection order.
    fn confirm(&self, kind: ConfirmKind, names: &str) -> bool;
}

/// Where a failure happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    pub action: ActionKind,
    pub machine_id: MachineId,
    pub machine_name: String,
}

/// Surfaces per-machine failures to the user.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &ActionError, context: &ReportContext);
}

/// UI-owned flows the orchestrator triggers but does not implement.
#[async_trait]
pub trait ShellHost: Send + Sync {
    /// Run a modal sub-flow (settings, wizards, preferences) to completion.
    async fn open_subflow(
        &self,
        action: ActionKind,
        selection: &[MachineRecord],
    ) -> FleetResult<()>;

    /// Apply a group edit (add/rename/remove group, sort).
    async fn apply_group_edit(
        &self,
        action: ActionKind,
        selection: &[MachineRecord],
    ) -> FleetResult<()>;

    /// Ask for a move destination; `None` when the user backs out.
    async fn choose_move_destination(&self, machine: &MachineRecord) -> Option<PathBuf>;

    async fn show_log(&self, machine: &MachineRecord) -> FleetResult<()>;

    async fn show_in_file_browser(&self, settings_path: &Path) -> FleetResult<()>;

    async fn create_shortcut(&self, machine: &MachineRecord) -> FleetResult<()>;
}

/// Reporter that only logs. Useful when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &ActionError, context: &ReportContext) {
        tracing::error!(
            action = ?context.action,
            machine_id = %context.machine_id,
            machine_name = %context.machine_name,
            error = %error,
            "Action failed"
        );
    }
}
