//! SessionManager - one exclusive session per machine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Holder, HolderTable, Session, clear_holder};
use crate::engine::{SessionError, SessionMode, VirtualizationEngine};
use crate::machine::MachineId;
use crate::metrics::OrchestratorMetricsStorage;

/// Public view of an exclusive holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderInfo {
    pub session_id: Uuid,
    pub mode: SessionMode,
    pub acquired_at: DateTime<Utc>,
}

/// Opens sessions through the engine and tracks which machines we hold
/// exclusively.
///
/// Cheap to clone; clones share the holder table.
#[derive(Clone)]
pub struct SessionManager {
    engine: Arc<dyn VirtualizationEngine>,
    holders: HolderTable,
    metrics: OrchestratorMetricsStorage,
}

impl SessionManager {
    pub fn new(engine: Arc<dyn VirtualizationEngine>, metrics: OrchestratorMetricsStorage) -> Self {
        Self {
            engine,
            holders: HolderTable::default(),
            metrics,
        }
    }

    pub fn engine(&self) -> &Arc<dyn VirtualizationEngine> {
        &self.engine
    }

    /// Open a session of `mode` on `id`.
    ///
    /// Exclusive modes fail fast with [`SessionError::Busy`] when we
    /// already hold `id`; the slot is reserved before the engine is asked
    /// so two concurrent acquisitions cannot both succeed.
    pub async fn acquire(&self, id: &MachineId, mode: SessionMode) -> Result<Session, SessionError> {
        let session_id = Uuid::new_v4();
        let reservation = match Reservation::claim(&self.holders, id, mode, session_id) {
            Ok(reservation) => reservation,
            Err(e) => {
                self.metrics.record_session_busy();
                tracing::debug!(machine_id = %id, mode = ?mode, "Machine already locked by us");
                return Err(e);
            }
        };

        let remote = match self.engine.open_session(id, mode).await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(machine_id = %id, mode = ?mode, error = %e, "Failed to open session");
                return Err(e);
            }
        };

        reservation.disarm();
        self.metrics.record_session_opened();
        tracing::debug!(
            machine_id = %id,
            session_id = %session_id,
            mode = ?mode,
            "Opened session"
        );

        Ok(Session::new(
            id.clone(),
            mode,
            session_id,
            remote,
            Arc::clone(&self.holders),
        ))
    }

    /// Release `session`. Idempotent.
    pub fn release(&self, session: &mut Session) {
        session.release();
    }

    /// Whether we currently hold an exclusive session on `id`.
    pub fn is_locked(&self, id: &MachineId) -> bool {
        self.holders.lock().contains_key(id)
    }

    pub fn holder(&self, id: &MachineId) -> Option<HolderInfo> {
        self.holders.lock().get(id).map(|h| HolderInfo {
            session_id: h.session_id,
            mode: h.mode,
            acquired_at: h.acquired_at,
        })
    }

    /// Number of machines currently held exclusively.
    pub fn held_count(&self) -> usize {
        self.holders.lock().len()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("held", &self.held_count())
            .finish()
    }
}

// ============================================================================
// RESERVATION
// ============================================================================

/// Exclusive slot claimed ahead of the remote open.
///
/// Dropped while armed (remote open failed, or the acquiring future was
/// dropped mid-await) it frees the slot again.
struct Reservation<'a> {
    holders: &'a HolderTable,
    id: &'a MachineId,
    session_id: Option<Uuid>,
    armed: bool,
}

impl<'a> Reservation<'a> {
    fn claim(
        holders: &'a HolderTable,
        id: &'a MachineId,
        mode: SessionMode,
        session_id: Uuid,
    ) -> Result<Self, SessionError> {
        if !mode.is_exclusive() {
            return Ok(Self {
                holders,
                id,
                session_id: None,
                armed: false,
            });
        }

        let mut table = holders.lock();
        if table.contains_key(id) {
            return Err(SessionError::Busy(id.clone()));
        }
        table.insert(
            id.clone(),
            Holder {
                session_id,
                mode,
                acquired_at: Utc::now(),
            },
        );

        Ok(Self {
            holders,
            id,
            session_id: Some(session_id),
            armed: true,
        })
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(session_id) = self.session_id {
            clear_holder(self.holders, self.id, session_id);
            tracing::debug!(machine_id = %self.id, "Freed reserved session slot");
        }
    }
}
