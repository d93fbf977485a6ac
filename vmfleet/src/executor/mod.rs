//! Batch executor.
//!
//! Runs one per-machine action over a selection:
//! 1. Check the whole selection, then filter to individually eligible items
//! 2. Ask for one confirmation for the whole batch, if the action needs it
//! 3. Per item: re-fetch, re-check, acquire session, operate, release
//!
//! One item's failure never stops its siblings. The exception is an
//! unreachable engine under sequential dispatch: the remaining items are
//! reported as not attempted.

mod dispatch;
mod ops;
mod result;

pub use dispatch::ExecutionMode;
pub use result::{BatchReport, BatchStatus, ItemOutcome, PerItemResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use vmfleet_shared::ActionError;

use crate::action::{ActionKind, ActionParams, ActionRequest, Execution};
use crate::enablement::{EvalContext, enabled, item_eligible, probe_acpi};
use crate::frontend::{Confirmer, ErrorReporter, ReportContext, ShellHost};
use crate::machine::MachineRecord;
use crate::metrics::OrchestratorMetricsStorage;
use crate::registry::MachineRegistry;
use crate::session::SessionManager;

use dispatch::dispatch;
use ops::{OpEnv, Performed, perform};

pub struct BatchExecutor {
    sessions: SessionManager,
    registry: Arc<dyn MachineRegistry>,
    confirmer: Arc<dyn Confirmer>,
    reporter: Arc<dyn ErrorReporter>,
    shell: Arc<dyn ShellHost>,
    metrics: OrchestratorMetricsStorage,
    mode: ExecutionMode,
    discard_removes_state_file: bool,
}

impl BatchExecutor {
    pub fn new(
        sessions: SessionManager,
        registry: Arc<dyn MachineRegistry>,
        confirmer: Arc<dyn Confirmer>,
        reporter: Arc<dyn ErrorReporter>,
        shell: Arc<dyn ShellHost>,
        metrics: OrchestratorMetricsStorage,
    ) -> Self {
        Self {
            sessions,
            registry,
            confirmer,
            reporter,
            shell,
            metrics,
            mode: ExecutionMode::default(),
            discard_removes_state_file: true,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_discard_removes_state_file(mut self, remove: bool) -> Self {
        self.discard_removes_state_file = remove;
        self
    }

    /// Run a per-machine action. `ctx` must carry ACPI probe results for
    /// `request.selection` when the action is a shutdown.
    pub async fn execute(&self, request: &ActionRequest, ctx: &EvalContext) -> BatchReport {
        let kind = request.kind;
        if kind.execution() != Execution::PerMachine {
            tracing::debug!(action = ?kind, "Not a per-machine action");
            return BatchReport::rejected(kind);
        }

        // Selection-shape rules (single item, group saving) only hold
        // for the selection as a whole.
        if !enabled(kind, &request.selection, ctx) {
            tracing::debug!(
                action = ?kind,
                selected = request.selection.len(),
                "Action disabled for selection"
            );
            return BatchReport::rejected(kind);
        }

        let eligible: Vec<MachineRecord> = request
            .selection
            .iter()
            .filter(|r| item_eligible(kind, r, ctx))
            .cloned()
            .collect();

        if eligible.is_empty() {
            tracing::debug!(action = ?kind, "No eligible machine in selection");
            return BatchReport::rejected(kind);
        }

        if !self.confirm(kind, &eligible) {
            tracing::info!(action = ?kind, "Batch declined by user");
            self.metrics.record_cancelled();
            return BatchReport::cancelled(kind);
        }

        self.metrics.record_batch();
        tracing::info!(
            action = ?kind,
            eligible = eligible.len(),
            mode = ?self.mode,
            "Running batch"
        );

        let abort = AtomicBool::new(false);
        let params = &request.params;
        let abort = &abort;
        let items = dispatch(self.mode, eligible, move |record| {
            self.run_item(kind, record, params, ctx, abort)
        })
        .await;

        BatchReport::completed(kind, items)
    }

    /// One confirmation for the whole batch. Start variants only count
    /// machines that would actually be launched.
    fn confirm(&self, kind: ActionKind, eligible: &[MachineRecord]) -> bool {
        let targets: Vec<&MachineRecord> = if kind.is_start_variant() {
            eligible.iter().filter(|r| r.can_be_started()).collect()
        } else {
            eligible.iter().collect()
        };

        let Some(question) = kind.confirmation(targets.len()) else {
            return true;
        };

        let names = targets
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.confirmer.confirm(question, &names)
    }

    async fn run_item(
        &self,
        kind: ActionKind,
        record: MachineRecord,
        params: &ActionParams,
        ctx: &EvalContext,
        abort: &AtomicBool,
    ) -> PerItemResult {
        let start = Instant::now();
        let outcome = if abort.load(Ordering::SeqCst) {
            ItemOutcome::NotAttempted
        } else {
            match self.attempt(kind, &record, params, ctx).await {
                Ok(Performed::Done) => ItemOutcome::Succeeded,
                Ok(Performed::Skipped) => ItemOutcome::Skipped,
                Err(e) => {
                    if e.aborts_batch() {
                        abort.store(true, Ordering::SeqCst);
                    }
                    ItemOutcome::Failed(e)
                }
            }
        };

        match &outcome {
            ItemOutcome::Failed(e) => {
                self.metrics.record_item(false);
                tracing::warn!(machine_id = %record.id, action = ?kind, error = %e, "Item failed");
                self.reporter.report(
                    e,
                    &ReportContext {
                        action: kind,
                        machine_id: record.id.clone(),
                        machine_name: record.name.clone(),
                    },
                );
            }
            ItemOutcome::NotAttempted => {
                self.metrics.record_item(false);
                tracing::debug!(machine_id = %record.id, action = ?kind, "Item not attempted");
            }
            ItemOutcome::Succeeded | ItemOutcome::Skipped => self.metrics.record_item(true),
        }

        PerItemResult {
            machine_id: record.id,
            machine_name: record.name,
            outcome,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Re-fetch the record, re-check eligibility against the fresh state,
    /// then perform the operation.
    async fn attempt(
        &self,
        kind: ActionKind,
        record: &MachineRecord,
        params: &ActionParams,
        ctx: &EvalContext,
    ) -> Result<Performed, ActionError> {
        let fresh = match self.registry.find_machine(&record.id).await {
            Ok(Some(fresh)) => fresh,
            Ok(None) => {
                tracing::debug!(machine_id = %record.id, "Machine vanished before its turn");
                return Err(ActionError::PreconditionNotMet);
            }
            Err(e) => return Err(ActionError::EngineUnreachable(e.to_string())),
        };

        // Shutdown re-probes the guest live rather than trusting the
        // batch-start probe.
        let reprobed;
        let ctx = if kind == ActionKind::Shutdown {
            reprobed = EvalContext {
                acpi_ready: probe_acpi(&self.sessions, std::slice::from_ref(&fresh)).await,
                ..ctx.clone()
            };
            &reprobed
        } else {
            ctx
        };

        if !item_eligible(kind, &fresh, ctx) {
            return Err(ActionError::PreconditionNotMet);
        }

        let env = OpEnv {
            sessions: &self.sessions,
            registry: &self.registry,
            shell: &self.shell,
            discard_removes_state_file: self.discard_removes_state_file,
        };
        perform(kind, &fresh, params, &env).await
    }
}
