//! Live ACPI probing.

use std::collections::HashSet;

use crate::engine::SessionMode;
use crate::machine::{MachineId, MachineRecord};
use crate::session::SessionManager;

/// Ask each running machine's console whether the guest entered ACPI
/// mode. Machines that cannot be probed (no session, console failure)
/// count as not ready.
pub async fn probe_acpi(sessions: &SessionManager, selection: &[MachineRecord]) -> HashSet<MachineId> {
    let mut ready = HashSet::new();

    for record in selection.iter().filter(|r| r.is_running()) {
        let mut session = match sessions.acquire(&record.id, SessionMode::Shared).await {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(machine_id = %record.id, error = %e, "ACPI probe skipped");
                continue;
            }
        };

        let entered = match session.remote() {
            Some(remote) => remote.guest_entered_acpi_mode().await,
            None => continue,
        };
        session.release();

        match entered {
            Ok(true) => {
                ready.insert(record.id.clone());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(machine_id = %record.id, error = %e, "ACPI probe failed");
            }
        }
    }

    ready
}
