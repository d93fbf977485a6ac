//! In-memory collaborators for tests.
//!
//! Every fake records its calls as `"op:machine[:arg]"` strings so tests
//! can assert on exact call sequences.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::Mutex;
use vmfleet_shared::{ActionError, FleetResult, RemoteError};

use crate::action::ActionKind;
use crate::engine::{
    LaunchMode, MachineSession, ProgressHandle, SessionError, SessionMode, VirtualizationEngine,
};
use crate::frontend::{ConfirmKind, Confirmer, ErrorReporter, ReportContext, ShellHost};
use crate::machine::{MachineId, MachineRecord};
use crate::registry::{MachineEvent, MachineRegistry};

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Default)]
struct EngineState {
    calls: Vec<String>,
    failing: HashMap<(MachineId, String), i32>,
    progress_codes: HashMap<(MachineId, String), i32>,
    unreachable: HashSet<MachineId>,
    inaccessible: HashSet<MachineId>,
    acpi_ready: HashSet<MachineId>,
    acpi_probe_fails: HashSet<MachineId>,
    unlock_fails: HashSet<MachineId>,
}

/// Engine whose sessions succeed unless told otherwise.
#[derive(Clone, Default)]
pub(crate) struct FakeEngine {
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Calls starting with `prefix`.
    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Make session call `op` on `id` fail with `code`.
    pub(crate) fn fail_call(&self, id: &str, op: &str, code: i32) {
        self.state
            .lock()
            .failing
            .insert((id.to_string(), op.to_string()), code);
    }

    /// Make the progress of `op` on `id` finish with `code`.
    pub(crate) fn fail_progress(&self, id: &str, op: &str, code: i32) {
        self.state
            .lock()
            .progress_codes
            .insert((id.to_string(), op.to_string()), code);
    }

    pub(crate) fn set_unreachable(&self, id: &str) {
        self.state.lock().unreachable.insert(id.to_string());
    }

    pub(crate) fn set_inaccessible(&self, id: &str) {
        self.state.lock().inaccessible.insert(id.to_string());
    }

    pub(crate) fn set_acpi_ready(&self, id: &str) {
        self.state.lock().acpi_ready.insert(id.to_string());
    }

    pub(crate) fn fail_acpi_probe(&self, id: &str) {
        self.state.lock().acpi_probe_fails.insert(id.to_string());
    }

    pub(crate) fn fail_unlock(&self, id: &str) {
        self.state.lock().unlock_fails.insert(id.to_string());
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    fn check(&self, id: &MachineId, op: &str) -> Result<(), RemoteError> {
        match self.state.lock().failing.get(&(id.clone(), op.to_string())) {
            Some(code) => Err(RemoteError::new(*code, format!("{op} failed"))),
            None => Ok(()),
        }
    }

    fn progress(&self, id: &MachineId, op: &str) -> Box<dyn ProgressHandle> {
        let code = self
            .state
            .lock()
            .progress_codes
            .get(&(id.clone(), op.to_string()))
            .copied()
            .unwrap_or(0);
        Box::new(FakeProgress { code, done: false })
    }
}

#[async_trait]
impl VirtualizationEngine for FakeEngine {
    async fn open_session(
        &self,
        id: &MachineId,
        mode: SessionMode,
    ) -> Result<Box<dyn MachineSession>, SessionError> {
        self.record(format!("open:{id}:{mode:?}"));
        {
            let state = self.state.lock();
            if state.unreachable.contains(id) {
                return Err(SessionError::Unreachable(format!("{id} unreachable")));
            }
            if state.inaccessible.contains(id) {
                return Err(SessionError::MachineInaccessible(id.clone()));
            }
        }
        Ok(Box::new(FakeSession {
            id: id.clone(),
            engine: self.clone(),
        }))
    }

    async fn unregister(&self, id: &MachineId, delete_files: bool) -> Result<(), RemoteError> {
        self.record(format!("unregister:{id}:{delete_files}"));
        self.check(id, "unregister")
    }
}

struct FakeSession {
    id: MachineId,
    engine: FakeEngine,
}

impl FakeSession {
    fn call(&self, op: &str) -> Result<(), RemoteError> {
        self.engine.record(format!("{op}:{}", self.id));
        self.engine.check(&self.id, op)
    }

    fn call_with_progress(&self, op: &str) -> Result<Box<dyn ProgressHandle>, RemoteError> {
        self.call(op)?;
        Ok(self.engine.progress(&self.id, op))
    }
}

#[async_trait]
impl MachineSession for FakeSession {
    fn machine_id(&self) -> &MachineId {
        &self.id
    }

    async fn pause(&mut self) -> Result<(), RemoteError> {
        self.call("pause")
    }

    async fn resume(&mut self) -> Result<(), RemoteError> {
        self.call("resume")
    }

    async fn reset(&mut self) -> Result<(), RemoteError> {
        self.call("reset")
    }

    async fn power_button(&mut self) -> Result<(), RemoteError> {
        self.call("power_button")
    }

    async fn guest_entered_acpi_mode(&mut self) -> Result<bool, RemoteError> {
        self.engine.record(format!("acpi_probe:{}", self.id));
        let state = self.engine.state.lock();
        if state.acpi_probe_fails.contains(&self.id) {
            return Err(RemoteError::new(1, "console unavailable"));
        }
        Ok(state.acpi_ready.contains(&self.id))
    }

    async fn save_state(&mut self) -> Result<Box<dyn ProgressHandle>, RemoteError> {
        self.call_with_progress("save_state")
    }

    async fn power_down(&mut self) -> Result<Box<dyn ProgressHandle>, RemoteError> {
        self.call_with_progress("power_down")
    }

    async fn discard_saved_state(&mut self, remove_file: bool) -> Result<(), RemoteError> {
        self.engine
            .record(format!("discard_saved_state:{}:{remove_file}", self.id));
        self.engine.check(&self.id, "discard_saved_state")
    }

    async fn launch(&mut self, mode: LaunchMode) -> Result<Box<dyn ProgressHandle>, RemoteError> {
        self.engine.record(format!("launch:{}:{mode:?}", self.id));
        self.engine.check(&self.id, "launch")?;
        Ok(self.engine.progress(&self.id, "launch"))
    }

    async fn switch_to_ui(&mut self) -> Result<(), RemoteError> {
        self.call("switch_to_ui")
    }

    async fn detach_ui(&mut self) -> Result<(), RemoteError> {
        self.call("detach_ui")
    }

    async fn move_to(&mut self, destination: &Path) -> Result<Box<dyn ProgressHandle>, RemoteError> {
        self.engine
            .record(format!("move_to:{}:{}", self.id, destination.display()));
        self.engine.check(&self.id, "move_to")?;
        Ok(self.engine.progress(&self.id, "move_to"))
    }

    fn unlock(&mut self) -> Result<(), RemoteError> {
        self.engine.record(format!("unlock:{}", self.id));
        if self.engine.state.lock().unlock_fails.contains(&self.id) {
            return Err(RemoteError::new(2, "unlock failed"));
        }
        Ok(())
    }
}

struct FakeProgress {
    code: i32,
    done: bool,
}

#[async_trait]
impl ProgressHandle for FakeProgress {
    async fn wait_for_completion(&mut self) {
        tokio::task::yield_now().await;
        self.done = true;
    }

    fn is_ok(&self) -> bool {
        self.done
    }

    fn result_code(&self) -> i32 {
        self.code
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Registry over a fixed record set; records can be replaced between
/// calls to simulate external state changes.
#[derive(Clone, Default)]
pub(crate) struct FakeRegistry {
    records: Arc<Mutex<Vec<MachineRecord>>>,
    reloaded: Arc<Mutex<Vec<MachineId>>>,
    events: Arc<Mutex<Vec<MachineEvent>>>,
}

impl FakeRegistry {
    pub(crate) fn new(records: Vec<MachineRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Replace the record with the same id, or add it.
    pub(crate) fn put(&self, record: MachineRecord) {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    pub(crate) fn remove(&self, id: &str) {
        self.records.lock().retain(|r| r.id != id);
    }

    pub(crate) fn reloaded(&self) -> Vec<MachineId> {
        self.reloaded.lock().clone()
    }

    /// Events handed out by the next `subscribe`.
    pub(crate) fn queue_events(&self, events: Vec<MachineEvent>) {
        self.events.lock().extend(events);
    }
}

#[async_trait]
impl MachineRegistry for FakeRegistry {
    async fn list_machines(&self) -> FleetResult<Vec<MachineRecord>> {
        Ok(self.records.lock().clone())
    }

    async fn find_machine(&self, id_or_path: &str) -> FleetResult<Option<MachineRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| r.id == id_or_path || r.settings_path() == Path::new(id_or_path))
            .cloned())
    }

    async fn reload(&self, id: &MachineId) -> FleetResult<Option<MachineRecord>> {
        self.reloaded.lock().push(id.clone());
        self.find_machine(id).await
    }

    fn subscribe(&self) -> BoxStream<'static, MachineEvent> {
        let events = std::mem::take(&mut *self.events.lock());
        futures::stream::iter(events).boxed()
    }
}

// ============================================================================
// FRONTEND
// ============================================================================

/// Answers every question with a fixed reply and remembers what was asked.
pub(crate) struct RecordingConfirmer {
    answer: bool,
    asked: Mutex<Vec<(ConfirmKind, String)>>,
}

impl RecordingConfirmer {
    pub(crate) fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn asked(&self) -> Vec<(ConfirmKind, String)> {
        self.asked.lock().clone()
    }
}

impl Confirmer for RecordingConfirmer {
    fn confirm(&self, kind: ConfirmKind, names: &str) -> bool {
        self.asked.lock().push((kind, names.to_string()));
        self.answer
    }
}

#[derive(Default)]
pub(crate) struct RecordingReporter {
    reports: Mutex<Vec<(ActionError, ReportContext)>>,
}

impl RecordingReporter {
    pub(crate) fn reports(&self) -> Vec<(ActionError, ReportContext)> {
        self.reports.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &ActionError, context: &ReportContext) {
        self.reports.lock().push((error.clone(), context.clone()));
    }
}

/// Shell host that records calls. Sub-flows can be made to fail or to
/// block until released, to exercise the opened guard.
#[derive(Default)]
pub(crate) struct RecordingShell {
    calls: Mutex<Vec<String>>,
    move_destination: Mutex<Option<PathBuf>>,
    fail_subflows: Mutex<bool>,
    gate: Mutex<Option<Arc<tokio::sync::Notify>>>,
}

impl RecordingShell {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn set_move_destination(&self, path: impl Into<PathBuf>) {
        *self.move_destination.lock() = Some(path.into());
    }

    pub(crate) fn fail_subflows(&self) {
        *self.fail_subflows.lock() = true;
    }

    /// Make sub-flows wait on `gate` before returning.
    pub(crate) fn hold_subflows(&self, gate: Arc<tokio::sync::Notify>) {
        *self.gate.lock() = Some(gate);
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn ids(selection: &[MachineRecord]) -> String {
    selection
        .iter()
        .map(|r| r.id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl ShellHost for RecordingShell {
    async fn open_subflow(&self, action: ActionKind, selection: &[MachineRecord]) -> FleetResult<()> {
        self.record(format!("subflow:{action:?}:{}", ids(selection)));
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.fail_subflows.lock() {
            return Err(vmfleet_shared::FleetError::Internal("wizard crashed".into()));
        }
        Ok(())
    }

    async fn apply_group_edit(&self, action: ActionKind, selection: &[MachineRecord]) -> FleetResult<()> {
        self.record(format!("group:{action:?}:{}", ids(selection)));
        Ok(())
    }

    async fn choose_move_destination(&self, machine: &MachineRecord) -> Option<PathBuf> {
        self.record(format!("choose_destination:{}", machine.id));
        self.move_destination.lock().clone()
    }

    async fn show_log(&self, machine: &MachineRecord) -> FleetResult<()> {
        self.record(format!("show_log:{}", machine.id));
        Ok(())
    }

    async fn show_in_file_browser(&self, settings_path: &Path) -> FleetResult<()> {
        self.record(format!("show_in_file_browser:{}", settings_path.display()));
        Ok(())
    }

    async fn create_shortcut(&self, machine: &MachineRecord) -> FleetResult<()> {
        self.record(format!("create_shortcut:{}", machine.id));
        Ok(())
    }
}
