//! Enablement evaluation.
//!
//! `rules` is pure and synchronous: it only reads records and an
//! [`EvalContext`]. The one input that needs the engine, whether a guest
//! accepts ACPI shutdown, is probed up front by `probe` and passed in
//! through the context.

mod context;
mod probe;
mod rules;
mod snapshot;

pub use context::{EvalContext, MachineTool};
pub use probe::probe_acpi;
pub use rules::{enabled, item_eligible};
pub use snapshot::{EnablementSnapshot, StartOrShowHint};
