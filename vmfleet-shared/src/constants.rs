//! Orchestrator-wide constants.

/// Machine settings files.
pub mod settings {
    /// Canonical settings file extension. Alias-style desktop shortcuts
    /// only resolve machines whose settings file carries this extension.
    pub const CANONICAL_EXTENSION: &str = "vbox";
}

/// Remote result codes.
pub mod result_code {
    /// Result code reported by a successful remote operation.
    pub const OK: i32 = 0;

    /// Code used when a progress handle finished without a usable
    /// result code (e.g. it was dropped by the engine).
    pub const UNKNOWN_FAILURE: i32 = -1;
}

/// Logging defaults.
pub mod logging {
    /// Environment variable consulted before the configured level.
    pub const FILTER_ENV: &str = "RUST_LOG";

    /// Rolling log file prefix inside the configured log directory.
    pub const FILE_PREFIX: &str = "vmfleet.log";
}
