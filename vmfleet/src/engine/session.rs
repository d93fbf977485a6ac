//! Calls available on an open engine session.

use std::path::Path;

use async_trait::async_trait;
use vmfleet_shared::RemoteError;

use super::{LaunchMode, ProgressHandle};
use crate::machine::MachineId;

/// Engine-side session bound to one machine.
///
/// Console calls (`pause`, `reset`, ...) need a `Control` session on a
/// started machine; machine calls (`discard_saved_state`, `move_to`,
/// `launch`) need a `Write` session.
#[async_trait]
pub trait MachineSession: Send {
    fn machine_id(&self) -> &MachineId;

    async fn pause(&mut self) -> Result<(), RemoteError>;

    async fn resume(&mut self) -> Result<(), RemoteError>;

    async fn reset(&mut self) -> Result<(), RemoteError>;

    /// Press the ACPI power button.
    async fn power_button(&mut self) -> Result<(), RemoteError>;

    /// Whether the guest has entered ACPI mode and will react to the
    /// power button.
    async fn guest_entered_acpi_mode(&mut self) -> Result<bool, RemoteError>;

    async fn save_state(&mut self) -> Result<Box<dyn ProgressHandle>, RemoteError>;

    async fn power_down(&mut self) -> Result<Box<dyn ProgressHandle>, RemoteError>;

    async fn discard_saved_state(&mut self, remove_file: bool) -> Result<(), RemoteError>;

    async fn launch(&mut self, mode: LaunchMode) -> Result<Box<dyn ProgressHandle>, RemoteError>;

    /// Bring the running machine's UI to front.
    async fn switch_to_ui(&mut self) -> Result<(), RemoteError>;

    /// Detach the UI from the running machine, leaving it running.
    async fn detach_ui(&mut self) -> Result<(), RemoteError>;

    async fn move_to(
        &mut self,
        destination: &Path,
    ) -> Result<Box<dyn ProgressHandle>, RemoteError>;

    /// Release the remote lock. Synchronous so it can run from `Drop`.
    fn unlock(&mut self) -> Result<(), RemoteError>;
}
