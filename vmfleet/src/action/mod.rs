//! Action kinds and requests.

use serde::{Deserialize, Serialize};

use crate::engine::LaunchMode;
use crate::frontend::ConfirmKind;
use crate::machine::MachineRecord;

/// Every action the orchestrator knows how to gate and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    // Global, not tied to a selection
    Preferences,
    ImportAppliance,
    ExportAppliance,
    AddMachine,

    // Configuration of a single machine
    Settings,
    Clone,
    Move,
    ExportToCloud,
    Remove,

    // Group edits
    AddGroup,
    Rename,
    RemoveGroup,
    Sort,
    SortParent,

    // Launching
    StartOrShow,
    Start,
    StartHeadless,
    StartDetachable,

    // Runtime control
    Pause,
    Resume,
    Reset,
    Discard,
    Refresh,

    // Desktop integration
    ShowLog,
    ShowInFileBrowser,
    CreateShortcut,

    // Close submenu
    CloseMenu,
    Detach,
    SaveState,
    Shutdown,
    PowerOff,
}

/// How the executor carries an action out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Modal sub-flow on the shell host, guarded against re-entry.
    SubFlow,
    /// Group edit delegated to the shell host.
    GroupEdit,
    /// Per-machine batch against the engine or desktop services.
    PerMachine,
    /// Only gates a submenu; nothing to run.
    MenuOnly,
}

impl ActionKind {
    pub const ALL: [ActionKind; 31] = [
        ActionKind::Preferences,
        ActionKind::ImportAppliance,
        ActionKind::ExportAppliance,
        ActionKind::AddMachine,
        ActionKind::Settings,
        ActionKind::Clone,
        ActionKind::Move,
        ActionKind::ExportToCloud,
        ActionKind::Remove,
        ActionKind::AddGroup,
        ActionKind::Rename,
        ActionKind::RemoveGroup,
        ActionKind::Sort,
        ActionKind::SortParent,
        ActionKind::StartOrShow,
        ActionKind::Start,
        ActionKind::StartHeadless,
        ActionKind::StartDetachable,
        ActionKind::Pause,
        ActionKind::Resume,
        ActionKind::Reset,
        ActionKind::Discard,
        ActionKind::Refresh,
        ActionKind::ShowLog,
        ActionKind::ShowInFileBrowser,
        ActionKind::CreateShortcut,
        ActionKind::CloseMenu,
        ActionKind::Detach,
        ActionKind::SaveState,
        ActionKind::Shutdown,
        ActionKind::PowerOff,
    ];

    /// Actions whose enablement does not depend on the selection.
    pub fn is_global(self) -> bool {
        matches!(
            self,
            ActionKind::Preferences
                | ActionKind::ImportAppliance
                | ActionKind::ExportAppliance
                | ActionKind::AddMachine
        )
    }

    pub fn execution(self) -> Execution {
        match self {
            ActionKind::Preferences
            | ActionKind::ImportAppliance
            | ActionKind::ExportAppliance
            | ActionKind::AddMachine
            | ActionKind::Settings
            | ActionKind::Clone
            | ActionKind::ExportToCloud => Execution::SubFlow,
            ActionKind::AddGroup
            | ActionKind::Rename
            | ActionKind::RemoveGroup
            | ActionKind::Sort
            | ActionKind::SortParent => Execution::GroupEdit,
            ActionKind::CloseMenu => Execution::MenuOnly,
            _ => Execution::PerMachine,
        }
    }

    /// Actions sharing an "opened" flag with this one. Opening export
    /// locks both export entry points.
    pub fn opened_group(self) -> &'static [ActionKind] {
        match self {
            ActionKind::ExportAppliance | ActionKind::ExportToCloud => {
                &[ActionKind::ExportAppliance, ActionKind::ExportToCloud]
            }
            ActionKind::Preferences => &[ActionKind::Preferences],
            ActionKind::ImportAppliance => &[ActionKind::ImportAppliance],
            ActionKind::AddMachine => &[ActionKind::AddMachine],
            ActionKind::Settings => &[ActionKind::Settings],
            _ => &[],
        }
    }

    /// Batch confirmation, if any. `eligible` is the filtered batch size.
    pub fn confirmation(self, eligible: usize) -> Option<ConfirmKind> {
        match self {
            ActionKind::Start
            | ActionKind::StartHeadless
            | ActionKind::StartDetachable
            | ActionKind::StartOrShow
                if eligible > 1 =>
            {
                Some(ConfirmKind::StartMultiple)
            }
            ActionKind::Reset => Some(ConfirmKind::Reset),
            ActionKind::Discard => Some(ConfirmKind::DiscardSavedState),
            ActionKind::Shutdown => Some(ConfirmKind::AcpiShutdown),
            ActionKind::PowerOff => Some(ConfirmKind::PowerOff),
            ActionKind::Remove => Some(ConfirmKind::Remove),
            _ => None,
        }
    }

    /// Launch mode for start variants; `None` means "pick per machine".
    pub fn launch_mode(self) -> Option<LaunchMode> {
        match self {
            ActionKind::Start => Some(LaunchMode::Default),
            ActionKind::StartHeadless => Some(LaunchMode::Headless),
            ActionKind::StartDetachable => Some(LaunchMode::Detachable),
            _ => None,
        }
    }

    pub fn is_start_variant(self) -> bool {
        matches!(
            self,
            ActionKind::StartOrShow
                | ActionKind::Start
                | ActionKind::StartHeadless
                | ActionKind::StartDetachable
        )
    }
}

/// Extra inputs some actions take.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams {
    /// Remove: delete machine files as well as unregistering.
    pub delete_files: bool,
}

/// A user-triggered action over an ordered selection.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    /// Selection order; only used to order confirmation names.
    pub selection: Vec<MachineRecord>,
    pub params: ActionParams,
}

impl ActionRequest {
    pub fn new(kind: ActionKind, selection: Vec<MachineRecord>) -> Self {
        Self {
            kind,
            selection,
            params: ActionParams::default(),
        }
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }
}
