//! Machine record snapshot.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::state::{MachineState, StateClass};

/// Opaque machine identifier, stable across refreshes.
pub type MachineId = String;

/// How much of a machine's configuration may be changed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationAccessLevel {
    /// Nothing may be configured.
    Null,
    /// Machine is off: everything may be configured.
    Full,
    /// Machine is saved: only state-independent settings.
    StateEditable,
    /// Machine is running or paused: only runtime-changeable settings.
    RuntimeEditable,
}

/// Snapshot of one machine, replaced wholesale on every refresh.
///
/// When `accessible` is false only `id` and `settings_path` carry meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub id: MachineId,
    pub name: String,
    pub state: MachineState,
    pub accessible: bool,
    /// False while the engine forbids configuration changes (e.g. saving,
    /// or the machine is locked by a foreign session).
    pub editable: bool,
    /// Group paths, e.g. `/` or `/lab/linux`.
    #[serde(default)]
    pub groups: Vec<String>,
    /// A running instance exposes a UI we can switch to.
    #[serde(default)]
    pub can_switch_to_running_ui: bool,
    /// Running without any UI attached.
    #[serde(default)]
    pub headless: bool,
    pub settings_path: PathBuf,
}

impl MachineRecord {
    /// Accessible record in `state`, editable unless the state forbids it.
    pub fn new(id: impl Into<MachineId>, name: impl Into<String>, state: MachineState) -> Self {
        let id = id.into();
        let name = name.into();
        let settings_path = PathBuf::from(format!("{name}/{name}.vbox"));
        Self {
            id,
            name,
            state,
            accessible: true,
            editable: !state.forbids_configuration(),
            groups: vec!["/".to_string()],
            can_switch_to_running_ui: false,
            headless: false,
            settings_path,
        }
    }

    /// Record for a machine whose settings could not be loaded.
    pub fn inaccessible(id: impl Into<MachineId>, settings_path: impl Into<PathBuf>) -> Self {
        let settings_path = settings_path.into();
        let name = settings_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: id.into(),
            name,
            state: MachineState::Inaccessible,
            accessible: false,
            editable: false,
            groups: Vec::new(),
            can_switch_to_running_ui: false,
            headless: false,
            settings_path,
        }
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_switchable_ui(mut self, can_switch: bool) -> Self {
        self.can_switch_to_running_ui = can_switch;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }

    /// State classification, empty for inaccessible records.
    pub fn class(&self) -> StateClass {
        if self.accessible {
            self.state.class()
        } else {
            StateClass::default()
        }
    }

    pub fn is_powered_off(&self) -> bool {
        self.class().powered_off
    }

    pub fn is_saved(&self) -> bool {
        self.class().saved
    }

    pub fn is_started(&self) -> bool {
        self.class().started
    }

    pub fn is_running(&self) -> bool {
        self.class().running
    }

    pub fn is_paused(&self) -> bool {
        self.class().paused
    }

    pub fn is_editable(&self) -> bool {
        self.accessible && self.editable
    }

    pub fn is_running_headless(&self) -> bool {
        self.is_started() && self.headless
    }

    /// Powered off and free to be launched.
    pub fn can_be_started(&self) -> bool {
        self.is_powered_off() && self.is_editable()
    }

    /// Started and exposing something we can bring to front.
    pub fn can_be_shown(&self) -> bool {
        self.is_started() && (self.can_switch_to_running_ui || self.is_running_headless())
    }

    pub fn configuration_access_level(&self) -> ConfigurationAccessLevel {
        if !self.accessible {
            return ConfigurationAccessLevel::Null;
        }
        match self.state {
            MachineState::PoweredOff | MachineState::Aborted => ConfigurationAccessLevel::Full,
            MachineState::Saved => ConfigurationAccessLevel::StateEditable,
            MachineState::Running | MachineState::Paused => {
                ConfigurationAccessLevel::RuntimeEditable
            }
            _ => ConfigurationAccessLevel::Null,
        }
    }

    /// First group path; a machine belongs to one group for our purposes.
    pub fn primary_group(&self) -> Option<&str> {
        self.groups.first().map(String::as_str)
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Whether the settings file carries `extension` (case-insensitive).
    pub fn has_settings_extension(&self, extension: &str) -> bool {
        self.settings_path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false)
    }
}
