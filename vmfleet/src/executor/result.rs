//! Per-item and per-batch results.

use serde::{Deserialize, Serialize};
use vmfleet_shared::ActionError;

use crate::action::ActionKind;
use crate::machine::MachineId;

/// What happened to one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    Succeeded,
    /// Nothing to do, e.g. no move destination was chosen.
    Skipped,
    Failed(ActionError),
    /// An earlier item found the engine unreachable.
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerItemResult {
    pub machine_id: MachineId,
    pub machine_name: String,
    pub outcome: ItemOutcome,
    /// Wall-clock time spent on this item, session included.
    pub duration_ms: u64,
}

impl PerItemResult {
    pub fn is_success(&self) -> bool {
        self.outcome == ItemOutcome::Succeeded
    }

    pub fn error(&self) -> Option<&ActionError> {
        match &self.outcome {
            ItemOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Items were dispatched; see the per-item outcomes.
    Completed,
    /// The user declined the confirmation. No item was started.
    Cancelled,
    /// Nothing in the selection was eligible.
    Rejected,
}

/// Outcome of one `run` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub action: ActionKind,
    pub status: BatchStatus,
    pub items: Vec<PerItemResult>,
}

impl BatchReport {
    pub fn completed(action: ActionKind, items: Vec<PerItemResult>) -> Self {
        Self {
            action,
            status: BatchStatus::Completed,
            items,
        }
    }

    pub fn cancelled(action: ActionKind) -> Self {
        Self {
            action,
            status: BatchStatus::Cancelled,
            items: Vec::new(),
        }
    }

    pub fn rejected(action: ActionKind) -> Self {
        Self {
            action,
            status: BatchStatus::Rejected,
            items: Vec::new(),
        }
    }

    /// Batch-level error, if the batch never got to its items.
    pub fn error(&self) -> Option<ActionError> {
        match self.status {
            BatchStatus::Completed => None,
            BatchStatus::Cancelled => Some(ActionError::UserCancelled),
            BatchStatus::Rejected => Some(ActionError::PreconditionNotMet),
        }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &PerItemResult> {
        self.items.iter().filter(|r| r.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PerItemResult> {
        self.items.iter().filter(|r| r.error().is_some())
    }

    pub fn not_attempted(&self) -> impl Iterator<Item = &PerItemResult> {
        self.items
            .iter()
            .filter(|r| r.outcome == ItemOutcome::NotAttempted)
    }

    /// Completed with no failed or unattempted item.
    pub fn is_clean(&self) -> bool {
        self.status == BatchStatus::Completed
            && self
                .items
                .iter()
                .all(|r| matches!(r.outcome, ItemOutcome::Succeeded | ItemOutcome::Skipped))
    }

    pub fn outcome_of(&self, id: &str) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|r| r.machine_id == id)
            .map(|r| &r.outcome)
    }
}
