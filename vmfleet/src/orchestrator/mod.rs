//! Orchestrator facade.
//!
//! The outward API for the menu/UI layer:
//! - `is_enabled` / `refresh_enablement`: gate actions for a selection
//! - `run`: carry an action out
//! - `watch`: keep the enablement snapshot current from registry events
//!
//! Constructed explicitly with its collaborators; there is no process-wide
//! instance.

mod opened;

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::RwLock;
use vmfleet_shared::FleetResult;

use crate::action::{ActionKind, ActionRequest, Execution};
use crate::enablement::{EnablementSnapshot, EvalContext, MachineTool, enabled, probe_acpi};
use crate::engine::VirtualizationEngine;
use crate::executor::{BatchExecutor, BatchReport};
use crate::frontend::{Confirmer, ErrorReporter, ShellHost};
use crate::machine::{MachineId, MachineRecord};
use crate::metrics::{OrchestratorMetrics, OrchestratorMetricsStorage};
use crate::options::OrchestratorOptions;
use crate::registry::{MachineEvent, MachineRegistry, fetch_records};
use crate::session::SessionManager;

use opened::OpenedActions;

/// External services the orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub engine: Arc<dyn VirtualizationEngine>,
    pub registry: Arc<dyn MachineRegistry>,
    pub confirmer: Arc<dyn Confirmer>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub shell: Arc<dyn ShellHost>,
}

/// Selection and pane state the rules depend on.
#[derive(Debug, Clone, Default)]
struct ViewState {
    selection: Vec<MachineId>,
    group_saving: bool,
    all_items_of_one_group_selected: bool,
    single_group_selected: bool,
    machine_tool: MachineTool,
    current_state_item_selected: bool,
}

pub struct Orchestrator {
    options: OrchestratorOptions,
    registry: Arc<dyn MachineRegistry>,
    shell: Arc<dyn ShellHost>,
    sessions: SessionManager,
    executor: BatchExecutor,
    opened: OpenedActions,
    view: RwLock<ViewState>,
    snapshot: RwLock<EnablementSnapshot>,
    metrics: OrchestratorMetricsStorage,
}

impl Orchestrator {
    pub fn new(options: OrchestratorOptions, collaborators: Collaborators) -> FleetResult<Self> {
        options.validate()?;

        let metrics = OrchestratorMetricsStorage::new();
        let sessions = SessionManager::new(collaborators.engine, metrics.clone());
        let executor = BatchExecutor::new(
            sessions.clone(),
            Arc::clone(&collaborators.registry),
            collaborators.confirmer,
            collaborators.reporter,
            Arc::clone(&collaborators.shell),
            metrics.clone(),
        )
        .with_mode(options.dispatch)
        .with_discard_removes_state_file(options.discard_removes_state_file);

        tracing::debug!(dispatch = ?options.dispatch, "Orchestrator created");

        Ok(Self {
            options,
            registry: collaborators.registry,
            shell: collaborators.shell,
            sessions,
            executor,
            opened: OpenedActions::default(),
            view: RwLock::new(ViewState::default()),
            snapshot: RwLock::new(EnablementSnapshot::default()),
            metrics,
        })
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn metrics(&self) -> OrchestratorMetrics {
        OrchestratorMetrics::new(self.metrics.clone())
    }

    // ========================================================================
    // ENABLEMENT
    // ========================================================================

    /// Whether `action` is enabled for `selection` under the current view
    /// state. Shutdown probes the guests live.
    pub async fn is_enabled(&self, action: ActionKind, selection: &[MachineRecord]) -> bool {
        let ctx = self
            .context_for(selection, action == ActionKind::Shutdown)
            .await;
        enabled(action, selection, &ctx)
    }

    /// Make `selection` current and recompute every action flag.
    pub async fn refresh_enablement(&self, selection: &[MachineRecord]) -> EnablementSnapshot {
        self.view.write().selection = selection.iter().map(|r| r.id.clone()).collect();
        self.compute(selection).await
    }

    /// Last computed snapshot.
    pub fn snapshot(&self) -> EnablementSnapshot {
        self.snapshot.read().clone()
    }

    pub async fn set_group_saving(&self, saving: bool) -> FleetResult<EnablementSnapshot> {
        self.view.write().group_saving = saving;
        self.recompute().await
    }

    pub async fn set_machine_tool(
        &self,
        tool: MachineTool,
        current_state_item_selected: bool,
    ) -> FleetResult<EnablementSnapshot> {
        {
            let mut view = self.view.write();
            view.machine_tool = tool;
            view.current_state_item_selected = current_state_item_selected;
        }
        self.recompute().await
    }

    /// Group-shape flags of the current selection, as the tree sees it.
    pub async fn set_group_selection(
        &self,
        all_items_of_one_group_selected: bool,
        single_group_selected: bool,
    ) -> FleetResult<EnablementSnapshot> {
        {
            let mut view = self.view.write();
            view.all_items_of_one_group_selected = all_items_of_one_group_selected;
            view.single_group_selected = single_group_selected;
        }
        self.recompute().await
    }

    /// Re-read the current selection from the registry and recompute.
    pub async fn recompute(&self) -> FleetResult<EnablementSnapshot> {
        let ids = self.view.read().selection.clone();
        let records = fetch_records(self.registry.as_ref(), &ids).await?;
        Ok(self.compute(&records).await)
    }

    /// Recompute on every registry event until `events` ends.
    pub async fn watch(&self, mut events: BoxStream<'_, MachineEvent>) {
        while let Some(event) = events.next().await {
            tracing::trace!(machine_id = %event.machine_id(), event = ?event, "Registry event");
            if let Err(e) = self.recompute().await {
                tracing::warn!(error = %e, "Failed to recompute enablement");
            }
        }
        tracing::debug!("Registry event stream ended");
    }

    /// Watch the registry's own event stream on a background task.
    pub fn spawn_watch(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let events = this.registry.subscribe();
            this.watch(events).await;
        })
    }

    async fn compute(&self, selection: &[MachineRecord]) -> EnablementSnapshot {
        let ctx = self.context_for(selection, true).await;
        let snapshot = EnablementSnapshot::compute(selection, &ctx);
        *self.snapshot.write() = snapshot.clone();
        snapshot
    }

    async fn context_for(&self, selection: &[MachineRecord], probe: bool) -> EvalContext {
        let view = self.view.read().clone();
        let acpi_ready = if probe {
            probe_acpi(&self.sessions, selection).await
        } else {
            Default::default()
        };

        EvalContext {
            group_saving: view.group_saving,
            all_items_of_one_group_selected: view.all_items_of_one_group_selected,
            single_group_selected: view.single_group_selected,
            machine_tool: view.machine_tool,
            current_state_item_selected: view.current_state_item_selected,
            opened: self.opened.opened(),
            shortcut_style: self.options.shortcut_style,
            settings_extension: self.options.settings_extension.clone(),
            acpi_ready,
        }
    }

    // ========================================================================
    // EXECUTION
    // ========================================================================

    /// Run `request`.
    ///
    /// Per-machine actions never fail as a whole; their failures are in
    /// the report. Sub-flows and group edits return the shell host's error.
    pub async fn run(&self, request: ActionRequest) -> FleetResult<BatchReport> {
        let kind = request.kind;
        tracing::info!(action = ?kind, selected = request.selection.len(), "Running action");

        match kind.execution() {
            Execution::PerMachine => {
                let ctx = self
                    .context_for(&request.selection, kind == ActionKind::Shutdown)
                    .await;
                Ok(self.executor.execute(&request, &ctx).await)
            }
            Execution::SubFlow => self.run_subflow(&request).await,
            Execution::GroupEdit => {
                let ctx = self.context_for(&request.selection, false).await;
                if !enabled(kind, &request.selection, &ctx) {
                    return Ok(BatchReport::rejected(kind));
                }
                self.shell.apply_group_edit(kind, &request.selection).await?;
                Ok(BatchReport::completed(kind, Vec::new()))
            }
            Execution::MenuOnly => Ok(BatchReport::rejected(kind)),
        }
    }

    async fn run_subflow(&self, request: &ActionRequest) -> FleetResult<BatchReport> {
        let kind = request.kind;
        let ctx = self.context_for(&request.selection, false).await;
        if !enabled(kind, &request.selection, &ctx) {
            tracing::debug!(action = ?kind, "Sub-flow not enabled");
            return Ok(BatchReport::rejected(kind));
        }

        let Some(_guard) = self.opened.try_open(kind) else {
            tracing::debug!(action = ?kind, "Sub-flow already open");
            return Ok(BatchReport::rejected(kind));
        };

        if let Err(e) = self.shell.open_subflow(kind, &request.selection).await {
            tracing::warn!(action = ?kind, error = %e, "Sub-flow failed");
            return Err(e);
        }
        Ok(BatchReport::completed(kind, Vec::new()))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .field("sessions", &self.sessions)
            .finish()
    }
}

// Shared across UI callbacks and the event watcher.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Orchestrator>;
};
