//! Orchestrator configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vmfleet_shared::constants::settings::CANONICAL_EXTENSION;
use vmfleet_shared::{FleetError, FleetResult};

use crate::executor::ExecutionMode;

/// How desktop shortcuts are created for machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutStyle {
    /// Plain desktop launcher file.
    Desktop,
    /// Filesystem alias pointing at the settings file. Only works for
    /// settings files with the canonical extension.
    Alias,
}

impl Default for ShortcutStyle {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            ShortcutStyle::Alias
        } else {
            ShortcutStyle::Desktop
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Directory for daily rolling log files. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Options for [`crate::Orchestrator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorOptions {
    /// How batch items are dispatched.
    pub dispatch: ExecutionMode,
    pub shortcut_style: ShortcutStyle,
    /// Canonical settings file extension, without the dot.
    pub settings_extension: String,
    /// Delete the saved state file when discarding.
    pub discard_removes_state_file: bool,
    pub logging: LoggingOptions,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            dispatch: ExecutionMode::Sequential,
            shortcut_style: ShortcutStyle::default(),
            settings_extension: CANONICAL_EXTENSION.to_string(),
            discard_removes_state_file: true,
            logging: LoggingOptions::default(),
        }
    }
}

impl OrchestratorOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> FleetResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&raw)?;
        options.validate()?;
        tracing::debug!(path = %path.display(), "Loaded orchestrator options");
        Ok(options)
    }

    pub fn validate(&self) -> FleetResult<()> {
        let ext = self.settings_extension.as_str();
        if ext.is_empty() || ext.starts_with('.') {
            return Err(FleetError::Config(format!(
                "settings_extension must be a bare extension, got {:?}",
                ext
            )));
        }
        if self.logging.level.trim().is_empty() {
            return Err(FleetError::Config("logging.level must not be empty".into()));
        }
        Ok(())
    }
}
