//! Session management.
//!
//! Single source of truth for "is this machine currently locked by us":
//! - `SessionManager`: acquires sessions, enforcing one exclusive session
//!   per machine per orchestrator
//! - `Session`: RAII handle that unlocks the remote side and frees the
//!   holder slot on release or drop

mod handle;
mod manager;

pub use handle::Session;
pub use manager::{HolderInfo, SessionManager};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::engine::SessionMode;
use crate::machine::MachineId;

/// Exclusive holder of a machine.
#[derive(Debug, Clone)]
pub(crate) struct Holder {
    pub(crate) session_id: Uuid,
    pub(crate) mode: SessionMode,
    pub(crate) acquired_at: DateTime<Utc>,
}

/// Exclusive holders keyed by machine.
pub(crate) type HolderTable = Arc<Mutex<HashMap<MachineId, Holder>>>;

/// Remove `id`'s holder only if it is still `session_id`.
pub(crate) fn clear_holder(holders: &HolderTable, id: &MachineId, session_id: Uuid) -> bool {
    let mut table = holders.lock();
    match table.get(id) {
        Some(holder) if holder.session_id == session_id => {
            table.remove(id);
            true
        }
        _ => false,
    }
}
