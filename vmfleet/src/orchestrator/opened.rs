//! Re-entrancy flags for modal sub-flows.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::ActionKind;

/// Which sub-flows are currently open.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenedActions {
    flags: Arc<Mutex<HashMap<ActionKind, bool>>>,
}

impl OpenedActions {
    /// Mark `action`'s group opened, unless any of it already is.
    ///
    /// Check and set happen under one lock, so two callers racing for the
    /// same sub-flow cannot both get a guard.
    pub(crate) fn try_open(&self, action: ActionKind) -> Option<OpenedGuard> {
        let group = action.opened_group();
        let mut flags = self.flags.lock();
        if group.iter().any(|a| flags.get(a).copied().unwrap_or(false)) {
            return None;
        }
        for a in group {
            flags.insert(*a, true);
        }
        Some(OpenedGuard {
            flags: Arc::clone(&self.flags),
            group,
        })
    }

    pub(crate) fn is_opened(&self, action: ActionKind) -> bool {
        self.flags.lock().get(&action).copied().unwrap_or(false)
    }

    pub(crate) fn opened(&self) -> HashSet<ActionKind> {
        self.flags
            .lock()
            .iter()
            .filter(|(_, open)| **open)
            .map(|(action, _)| *action)
            .collect()
    }
}

/// Clears the opened flags on drop, whatever way the sub-flow ended.
#[derive(Debug)]
pub(crate) struct OpenedGuard {
    flags: Arc<Mutex<HashMap<ActionKind, bool>>>,
    group: &'static [ActionKind],
}

impl Drop for OpenedGuard {
    fn drop(&mut self) {
        let mut flags = self.flags.lock();
        for a in self.group {
            flags.insert(*a, false);
        }
    }
}
