//! The engine work behind each per-machine action.

use std::sync::Arc;

use vmfleet_shared::constants::result_code;
use vmfleet_shared::{ActionError, FleetError};

use crate::action::{ActionKind, ActionParams};
use crate::engine::{LaunchMode, MachineSession, SessionMode, await_progress};
use crate::frontend::ShellHost;
use crate::machine::MachineRecord;
use crate::registry::MachineRegistry;
use crate::session::{Session, SessionManager};

/// Result of a successful per-item operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Performed {
    Done,
    Skipped,
}

/// Collaborators an operation may touch.
pub(super) struct OpEnv<'a> {
    pub sessions: &'a SessionManager,
    pub registry: &'a Arc<dyn MachineRegistry>,
    pub shell: &'a Arc<dyn ShellHost>,
    pub discard_removes_state_file: bool,
}

/// Carry out `kind` on one freshly fetched, already re-checked record.
pub(super) async fn perform(
    kind: ActionKind,
    record: &MachineRecord,
    params: &ActionParams,
    env: &OpEnv<'_>,
) -> Result<Performed, ActionError> {
    match kind {
        ActionKind::StartOrShow
        | ActionKind::Start
        | ActionKind::StartHeadless
        | ActionKind::StartDetachable => start_or_show(kind, record, env).await,

        ActionKind::Pause
        | ActionKind::Resume
        | ActionKind::Reset
        | ActionKind::SaveState
        | ActionKind::Shutdown
        | ActionKind::PowerOff => {
            let mut session = env.sessions.acquire(&record.id, SessionMode::Control).await?;
            let result = control(kind, record, &mut session).await;
            session.release();
            result.map(|()| Performed::Done)
        }

        ActionKind::Detach => {
            let mut session = env.sessions.acquire(&record.id, SessionMode::Shared).await?;
            let result = remote(&mut session)?.detach_ui().await;
            session.release();
            result?;
            Ok(Performed::Done)
        }

        ActionKind::Discard => {
            let mut session = env.sessions.acquire(&record.id, SessionMode::Write).await?;
            let result = remote(&mut session)?
                .discard_saved_state(env.discard_removes_state_file)
                .await;
            session.release();
            result?;
            Ok(Performed::Done)
        }

        ActionKind::Move => {
            let Some(destination) = env.shell.choose_move_destination(record).await else {
                tracing::info!(machine_id = %record.id, "Move cancelled, no destination chosen");
                return Ok(Performed::Skipped);
            };
            let mut session = env.sessions.acquire(&record.id, SessionMode::Write).await?;
            let result = match remote(&mut session)?.move_to(&destination).await {
                Ok(progress) => await_progress(progress).await,
                Err(e) => Err(e),
            };
            session.release();
            result?;
            Ok(Performed::Done)
        }

        ActionKind::Remove => {
            env.sessions
                .engine()
                .unregister(&record.id, params.delete_files)
                .await?;
            Ok(Performed::Done)
        }

        ActionKind::Refresh => match env.registry.reload(&record.id).await {
            Ok(Some(_)) => Ok(Performed::Done),
            Ok(None) => Err(ActionError::MachineInaccessible),
            Err(e) => Err(from_fleet(e)),
        },

        ActionKind::ShowLog => env
            .shell
            .show_log(record)
            .await
            .map(|()| Performed::Done)
            .map_err(from_fleet),
        ActionKind::ShowInFileBrowser => env
            .shell
            .show_in_file_browser(record.settings_path())
            .await
            .map(|()| Performed::Done)
            .map_err(from_fleet),
        ActionKind::CreateShortcut => env
            .shell
            .create_shortcut(record)
            .await
            .map(|()| Performed::Done)
            .map_err(from_fleet),

        // Sub-flows, group edits and menus never reach the per-item path.
        _ => Err(ActionError::PreconditionNotMet),
    }
}

/// Start startable machines, bring showable ones to front.
async fn start_or_show(
    kind: ActionKind,
    record: &MachineRecord,
    env: &OpEnv<'_>,
) -> Result<Performed, ActionError> {
    if record.can_be_started() {
        let mode = kind.launch_mode().unwrap_or(LaunchMode::Default);
        let mut session = env.sessions.acquire(&record.id, SessionMode::Write).await?;
        let result = match remote(&mut session)?.launch(mode).await {
            Ok(progress) => await_progress(progress).await,
            Err(e) => Err(e),
        };
        session.release();
        result?;
        tracing::info!(machine_id = %record.id, mode = ?mode, "Machine launched");
        return Ok(Performed::Done);
    }

    // A headless machine has no UI to switch to; attach a separate one.
    let mut session = env.sessions.acquire(&record.id, SessionMode::Shared).await?;
    let console = remote(&mut session)?;
    let result = if record.can_switch_to_running_ui {
        console.switch_to_ui().await
    } else {
        match console.launch(LaunchMode::Detachable).await {
            Ok(progress) => await_progress(progress).await,
            Err(e) => Err(e),
        }
    };
    session.release();
    result?;
    Ok(Performed::Done)
}

/// Console calls made under a control session.
async fn control(
    kind: ActionKind,
    record: &MachineRecord,
    session: &mut Session,
) -> Result<(), ActionError> {
    let console = remote(session)?;
    match kind {
        ActionKind::Pause => console.pause().await?,
        ActionKind::Resume => console.resume().await?,
        ActionKind::Reset => console.reset().await?,
        ActionKind::Shutdown => console.power_button().await?,
        ActionKind::PowerOff => await_progress(console.power_down().await?).await?,
        ActionKind::SaveState => {
            if !record.is_paused() {
                console.pause().await?;
            }
            await_progress(console.save_state().await?).await?;
        }
        _ => return Err(ActionError::PreconditionNotMet),
    }
    tracing::debug!(machine_id = %record.id, action = ?kind, "Console call completed");
    Ok(())
}

fn remote(session: &mut Session) -> Result<&mut (dyn MachineSession + 'static), ActionError> {
    session.remote().ok_or(ActionError::PreconditionNotMet)
}

fn from_fleet(err: FleetError) -> ActionError {
    match err {
        FleetError::Engine(remote) => remote.into(),
        other => ActionError::RemoteOperationFailed {
            code: result_code::UNKNOWN_FAILURE,
            message: other.to_string(),
        },
    }
}
