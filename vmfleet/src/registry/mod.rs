//! Registry / listing service interface.
//!
//! The registry owns machine records. We only ever read whole snapshots
//! from it and never keep them across an await on a session.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use vmfleet_shared::FleetResult;

use crate::machine::{MachineId, MachineRecord, MachineState};

/// Lock state of a machine's session as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Unlocked,
    Locked,
    Spawning,
    Unlocking,
}

/// Change notification emitted by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MachineEvent {
    StateChanged {
        id: MachineId,
        state: MachineState,
    },
    SessionStateChanged {
        id: MachineId,
        session: SessionState,
    },
    Registered {
        id: MachineId,
    },
    Unregistered {
        id: MachineId,
    },
}

impl MachineEvent {
    pub fn machine_id(&self) -> &MachineId {
        match self {
            MachineEvent::StateChanged { id, .. }
            | MachineEvent::SessionStateChanged { id, .. }
            | MachineEvent::Registered { id }
            | MachineEvent::Unregistered { id } => id,
        }
    }
}

#[async_trait]
pub trait MachineRegistry: Send + Sync {
    async fn list_machines(&self) -> FleetResult<Vec<MachineRecord>>;

    /// Look a machine up by id or settings path.
    async fn find_machine(&self, id_or_path: &str) -> FleetResult<Option<MachineRecord>>;

    /// Re-read a machine's settings, e.g. after an inaccessible machine's
    /// files were fixed. Returns the fresh record.
    async fn reload(&self, id: &MachineId) -> FleetResult<Option<MachineRecord>>;

    /// Stream of change notifications.
    fn subscribe(&self) -> BoxStream<'static, MachineEvent>;
}

/// Fetch fresh records for `ids`, preserving order and dropping machines
/// that are no longer registered.
pub async fn fetch_records(
    registry: &dyn MachineRegistry,
    ids: &[MachineId],
) -> FleetResult<Vec<MachineRecord>> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        match registry.find_machine(id).await? {
            Some(record) => records.push(record),
            None => tracing::debug!(machine_id = %id, "Machine vanished from registry"),
        }
    }
    Ok(records)
}
