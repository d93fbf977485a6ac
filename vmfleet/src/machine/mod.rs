//! Machine records and lifecycle state classification.
//!
//! The virtualization engine owns state transitions. This module only
//! snapshots them and folds them into the coarse predicates the
//! enablement rules are written against.

mod record;
mod state;

pub use record::{ConfigurationAccessLevel, MachineId, MachineRecord};
pub use state::{MachineState, StateClass};
