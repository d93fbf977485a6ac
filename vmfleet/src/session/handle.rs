//! Session handle with RAII release.

use uuid::Uuid;

use super::{HolderTable, clear_holder};
use crate::engine::{MachineSession, SessionMode};
use crate::machine::MachineId;

/// An open session on one machine.
///
/// Released exactly once: explicitly through [`Session::release`] or
/// implicitly on drop. Releasing again is a no-op.
pub struct Session {
    machine_id: MachineId,
    mode: SessionMode,
    session_id: Uuid,
    remote: Option<Box<dyn MachineSession>>,
    holders: HolderTable,
}

impl Session {
    pub(super) fn new(
        machine_id: MachineId,
        mode: SessionMode,
        session_id: Uuid,
        remote: Box<dyn MachineSession>,
        holders: HolderTable,
    ) -> Self {
        Self {
            machine_id,
            mode,
            session_id,
            remote: Some(remote),
            holders,
        }
    }

    pub fn machine_id(&self) -> &MachineId {
        &self.machine_id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_released(&self) -> bool {
        self.remote.is_none()
    }

    /// Engine session, `None` once released.
    pub fn remote(&mut self) -> Option<&mut (dyn MachineSession + 'static)> {
        self.remote.as_deref_mut()
    }

    /// Unlock the machine. Failures are logged, never returned.
    pub fn release(&mut self) {
        let Some(mut remote) = self.remote.take() else {
            return;
        };

        if let Err(e) = remote.unlock() {
            tracing::warn!(
                machine_id = %self.machine_id,
                session_id = %self.session_id,
                error = %e,
                "Failed to unlock machine session"
            );
        }

        if self.mode.is_exclusive() {
            clear_holder(&self.holders, &self.machine_id, self.session_id);
        }

        tracing::debug!(
            machine_id = %self.machine_id,
            session_id = %self.session_id,
            mode = ?self.mode,
            "Released session"
        );
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("machine_id", &self.machine_id)
            .field("mode", &self.mode)
            .field("session_id", &self.session_id)
            .field("released", &self.is_released())
            .finish()
    }
}

// Sessions move into per-item futures that may run on any worker.
const _: () = {
    const fn assert_send<T: Send>() {}
    let _ = assert_send::<Session>;
};
