//! Global flags the rules read besides the selection.

use std::collections::HashSet;

use vmfleet_shared::constants::settings::CANONICAL_EXTENSION;

use crate::action::ActionKind;
use crate::machine::MachineId;
use crate::options::ShortcutStyle;

/// Machine pane currently shown next to the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MachineTool {
    #[default]
    Details,
    Snapshots,
    Logs,
}

#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Group definitions are being written back to the registry.
    pub group_saving: bool,
    /// Every machine of one group is selected (the group itself is).
    pub all_items_of_one_group_selected: bool,
    pub single_group_selected: bool,
    pub machine_tool: MachineTool,
    /// In the snapshots tool, whether the "current state" row is selected.
    pub current_state_item_selected: bool,
    /// Actions whose sub-flow is currently open.
    pub opened: HashSet<ActionKind>,
    pub shortcut_style: ShortcutStyle,
    pub settings_extension: String,
    /// Machines whose guest reported ACPI mode on the last probe.
    pub acpi_ready: HashSet<MachineId>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            group_saving: false,
            all_items_of_one_group_selected: false,
            single_group_selected: false,
            machine_tool: MachineTool::default(),
            current_state_item_selected: false,
            opened: HashSet::new(),
            shortcut_style: ShortcutStyle::default(),
            settings_extension: CANONICAL_EXTENSION.to_string(),
            acpi_ready: HashSet::new(),
        }
    }
}

impl EvalContext {
    pub fn is_opened(&self, action: ActionKind) -> bool {
        self.opened.contains(&action)
    }

    /// Launch and discard are only offered for the current state, not for
    /// a snapshot selected in the snapshots tool.
    pub fn current_state_targeted(&self) -> bool {
        self.machine_tool != MachineTool::Snapshots || self.current_state_item_selected
    }

    pub fn guest_acpi_ready(&self, id: &MachineId) -> bool {
        self.acpi_ready.contains(id)
    }
}
