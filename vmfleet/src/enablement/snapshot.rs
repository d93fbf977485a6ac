//! Full enablement snapshot for one selection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::machine::MachineRecord;

use super::{EvalContext, enabled};

/// Which label the start-or-show entry carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOrShowHint {
    #[default]
    Start,
    Show,
}

/// Every action flag plus the presentation hints, always computed
/// together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablementSnapshot {
    pub flags: BTreeMap<ActionKind, bool>,
    pub start_or_show: StartOrShowHint,
    /// Pause toggle state: the first started item is paused.
    pub pause_checked: bool,
}

impl EnablementSnapshot {
    pub fn compute(selection: &[MachineRecord], ctx: &EvalContext) -> Self {
        let flags = ActionKind::ALL
            .iter()
            .map(|&action| (action, enabled(action, selection, ctx)))
            .collect();

        let start_or_show = match selection.first() {
            Some(first) if first.accessible && !first.is_powered_off() => StartOrShowHint::Show,
            _ => StartOrShowHint::Start,
        };

        let pause_checked = selection
            .iter()
            .find(|r| r.is_started())
            .is_some_and(MachineRecord::is_paused);

        Self {
            flags,
            start_or_show,
            pause_checked,
        }
    }

    pub fn is_enabled(&self, action: ActionKind) -> bool {
        self.flags.get(&action).copied().unwrap_or(false)
    }

    /// Enabled actions, in declaration order.
    pub fn enabled_actions(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.flags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(action, _)| *action)
    }
}
