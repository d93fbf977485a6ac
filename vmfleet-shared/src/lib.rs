//! Types shared between the vmfleet orchestrator and its collaborators.

pub mod constants;
pub mod errors;

pub use errors::{ActionError, FleetError, FleetResult, RemoteError};
