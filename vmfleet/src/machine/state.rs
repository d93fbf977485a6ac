//! Machine lifecycle state and its table-driven classification.

use serde::{Deserialize, Serialize};

/// Lifecycle state as reported by the virtualization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineState {
    PoweredOff,
    Saved,
    Starting,
    Running,
    Paused,
    Stopping,
    Saving,
    Restoring,
    TeleportingIn,
    TeleportingOut,
    Aborted,
    Inaccessible,
    /// Any state this build does not know about. Never actionable.
    #[serde(other)]
    Unknown,
}

/// Coarse predicates derived from a [`MachineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateClass {
    /// Not running in any form: powered off, saved or aborted.
    pub powered_off: bool,
    pub saved: bool,
    pub started: bool,
    pub running: bool,
    pub paused: bool,
}

impl StateClass {
    const NONE: StateClass = StateClass {
        powered_off: false,
        saved: false,
        started: false,
        running: false,
        paused: false,
    };

    const fn off() -> Self {
        StateClass {
            powered_off: true,
            ..Self::NONE
        }
    }

    const fn started() -> Self {
        StateClass {
            started: true,
            ..Self::NONE
        }
    }
}

impl MachineState {
    /// Classify this state. Total over the enum; unknown states classify
    /// as nothing so no rule can match them.
    pub const fn class(self) -> StateClass {
        match self {
            MachineState::PoweredOff | MachineState::Aborted => StateClass::off(),
            MachineState::Saved => StateClass {
                saved: true,
                ..StateClass::off()
            },
            MachineState::Running | MachineState::TeleportingIn | MachineState::TeleportingOut => {
                StateClass {
                    running: true,
                    ..StateClass::started()
                }
            }
            MachineState::Paused => StateClass {
                paused: true,
                ..StateClass::started()
            },
            MachineState::Starting
            | MachineState::Stopping
            | MachineState::Saving
            | MachineState::Restoring => StateClass::started(),
            MachineState::Inaccessible | MachineState::Unknown => StateClass::NONE,
        }
    }

    pub const fn is_powered_off(self) -> bool {
        self.class().powered_off
    }

    pub const fn is_saved(self) -> bool {
        self.class().saved
    }

    pub const fn is_started(self) -> bool {
        self.class().started
    }

    pub const fn is_running(self) -> bool {
        self.class().running
    }

    pub const fn is_paused(self) -> bool {
        self.class().paused
    }

    /// States in which the engine forbids configuration changes.
    pub const fn forbids_configuration(self) -> bool {
        matches!(
            self,
            MachineState::Saving | MachineState::Inaccessible | MachineState::Unknown
        )
    }
}
