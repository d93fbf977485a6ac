//! The action × selection rule table.
//!
//! Aggregate rules ("any item ...") decide menu state. Per-item
//! eligibility is the same table applied to a one-item selection, plus
//! the toggle skips (pausing a paused machine, resuming a running one).

use crate::action::ActionKind;
use crate::machine::{ConfigurationAccessLevel, MachineRecord};
use crate::options::ShortcutStyle;

use super::EvalContext;

/// Whether `action` is permitted for `selection` right now.
///
/// Rules that look at "the item" read the first one in selection order.
pub fn enabled(action: ActionKind, selection: &[MachineRecord], ctx: &EvalContext) -> bool {
    if action.is_global() {
        return !ctx.is_opened(action);
    }

    let Some(first) = selection.first() else {
        return false;
    };
    let saving = ctx.group_saving;

    match action {
        ActionKind::Rename | ActionKind::RemoveGroup => !saving && all_powered_off(selection),
        ActionKind::Sort => !saving && ctx.single_group_selected,
        ActionKind::SortParent => !saving,
        ActionKind::Settings => {
            !ctx.is_opened(action)
                && !saving
                && selection.len() == 1
                && first.configuration_access_level() != ConfigurationAccessLevel::Null
                && ctx.current_state_targeted()
        }
        ActionKind::Clone | ActionKind::Move => {
            !saving && selection.len() == 1 && first.is_editable()
        }
        ActionKind::ExportToCloud => !ctx.is_opened(action) && selection.len() == 1,
        ActionKind::Remove => !saving && any(selection, |r| !r.accessible || r.is_editable()),
        ActionKind::AddGroup => {
            !saving && !ctx.all_items_of_one_group_selected && all_powered_off(selection)
        }
        ActionKind::StartOrShow
        | ActionKind::Start
        | ActionKind::StartHeadless
        | ActionKind::StartDetachable => {
            !saving
                && any(selection, |r| r.can_be_started() || r.can_be_shown())
                && ctx.current_state_targeted()
        }
        ActionKind::Discard => {
            !saving
                && any(selection, |r| r.is_saved() && r.is_editable())
                && ctx.current_state_targeted()
        }
        ActionKind::ShowLog | ActionKind::ShowInFileBrowser => any(selection, |r| r.accessible),
        ActionKind::Pause | ActionKind::Resume => any(selection, MachineRecord::is_started),
        ActionKind::Reset => any(selection, MachineRecord::is_running),
        ActionKind::Refresh => any(selection, |r| !r.accessible),
        ActionKind::CreateShortcut => any(selection, |r| supports_shortcut(r, ctx)),
        ActionKind::CloseMenu
        | ActionKind::Detach
        | ActionKind::SaveState
        | ActionKind::PowerOff => any(selection, MachineRecord::is_started),
        ActionKind::Shutdown => {
            any(selection, MachineRecord::is_started)
                && any(selection, |r| r.is_running() && ctx.guest_acpi_ready(&r.id))
        }
        // Global actions returned above.
        ActionKind::Preferences
        | ActionKind::ImportAppliance
        | ActionKind::ExportAppliance
        | ActionKind::AddMachine => false,
    }
}

/// Whether `item` on its own should be acted on in a batch of `action`.
pub fn item_eligible(action: ActionKind, item: &MachineRecord, ctx: &EvalContext) -> bool {
    if !enabled(action, std::slice::from_ref(item), ctx) {
        return false;
    }
    match action {
        ActionKind::Pause => !item.is_paused(),
        ActionKind::Resume => item.is_paused(),
        _ => true,
    }
}

fn any(selection: &[MachineRecord], pred: impl Fn(&MachineRecord) -> bool) -> bool {
    selection.iter().any(pred)
}

fn all_powered_off(selection: &[MachineRecord]) -> bool {
    selection.iter().all(MachineRecord::is_powered_off)
}

fn supports_shortcut(record: &MachineRecord, ctx: &EvalContext) -> bool {
    if !record.accessible {
        return false;
    }
    match ctx.shortcut_style {
        ShortcutStyle::Desktop => true,
        ShortcutStyle::Alias => record.has_settings_extension(&ctx.settings_extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enablement::MachineTool;
    use crate::machine::MachineState;

    fn rec(id: &str, state: MachineState) -> MachineRecord {
        MachineRecord::new(id, id, state)
    }

    fn ctx() -> EvalContext {
        EvalContext::default()
    }

    #[test]
    fn test_empty_selection_disables_machine_actions() {
        let ctx = ctx();
        for action in ActionKind::ALL {
            let expected = action.is_global();
            assert_eq!(enabled(action, &[], &ctx), expected, "{:?}", action);
        }
    }

    #[test]
    fn test_global_actions_disabled_while_opened() {
        let mut ctx = ctx();
        ctx.opened.insert(ActionKind::ImportAppliance);
        assert!(!enabled(ActionKind::ImportAppliance, &[], &ctx));
        assert!(enabled(ActionKind::AddMachine, &[], &ctx));
    }

    #[test]
    fn test_start_requires_editable_powered_off() {
        let ctx = ctx();
        let off = rec("m", MachineState::PoweredOff);
        assert!(enabled(ActionKind::Start, &[off.clone()], &ctx));

        let locked = off.with_editable(false);
        assert!(!enabled(ActionKind::Start, &[locked], &ctx));
    }

    #[test]
    fn test_start_or_show_accepts_showable_machines() {
        let ctx = ctx();
        let running = rec("m", MachineState::Running);
        assert!(!enabled(ActionKind::StartOrShow, &[running.clone()], &ctx));
        assert!(enabled(
            ActionKind::StartOrShow,
            &[running.clone().with_switchable_ui(true)],
            &ctx
        ));
        assert!(enabled(
            ActionKind::StartOrShow,
            &[running.with_headless(true)],
            &ctx
        ));
    }

    #[test]
    fn test_start_hidden_for_snapshot_rows() {
        let mut ctx = ctx();
        ctx.machine_tool = MachineTool::Snapshots;
        let off = rec("m", MachineState::PoweredOff);
        assert!(!enabled(ActionKind::Start, &[off.clone()], &ctx));

        ctx.current_state_item_selected = true;
        assert!(enabled(ActionKind::Start, &[off], &ctx));
    }

    #[test]
    fn test_group_saving_blocks_edits() {
        let mut ctx = ctx();
        ctx.group_saving = true;
        let off = rec("m", MachineState::PoweredOff);
        for action in [
            ActionKind::Rename,
            ActionKind::SortParent,
            ActionKind::Settings,
            ActionKind::Clone,
            ActionKind::Remove,
            ActionKind::AddGroup,
            ActionKind::Start,
        ] {
            assert!(!enabled(action, &[off.clone()], &ctx), "{:?}", action);
        }
        // Runtime control does not care about group saving.
        assert!(enabled(ActionKind::ShowLog, &[off], &ctx));
    }

    #[test]
    fn test_settings_requires_single_configurable_item() {
        let ctx = ctx();
        let off = rec("a", MachineState::PoweredOff);
        assert!(enabled(ActionKind::Settings, &[off.clone()], &ctx));
        assert!(!enabled(
            ActionKind::Settings,
            &[off.clone(), rec("b", MachineState::PoweredOff)],
            &ctx
        ));
        assert!(!enabled(ActionKind::Settings, &[rec("s", MachineState::Saving)], &ctx));

        let mut opened = ctx.clone();
        opened.opened.insert(ActionKind::Settings);
        assert!(!enabled(ActionKind::Settings, &[off], &opened));
    }

    #[test]
    fn test_running_machine_is_configurable_at_runtime() {
        assert!(enabled(
            ActionKind::Settings,
            &[rec("m", MachineState::Running)],
            &ctx()
        ));
    }

    #[test]
    fn test_remove_accepts_inaccessible() {
        let ctx = ctx();
        let broken = MachineRecord::inaccessible("x", "/vms/x/x.vbox");
        assert!(enabled(ActionKind::Remove, &[broken.clone()], &ctx));
        assert!(enabled(ActionKind::Refresh, &[broken.clone()], &ctx));
        assert!(!enabled(ActionKind::ShowLog, &[broken], &ctx));
    }

    #[test]
    fn test_add_group_requires_all_powered_off() {
        let mut ctx = ctx();
        let off = rec("a", MachineState::PoweredOff);
        let saved = rec("b", MachineState::Saved);
        let running = rec("c", MachineState::Running);
        assert!(enabled(ActionKind::AddGroup, &[off.clone(), saved], &ctx));
        assert!(!enabled(ActionKind::AddGroup, &[off.clone(), running], &ctx));

        ctx.all_items_of_one_group_selected = true;
        assert!(!enabled(ActionKind::AddGroup, &[off], &ctx));
    }

    #[test]
    fn test_sort_requires_single_group() {
        let mut ctx = ctx();
        let off = rec("a", MachineState::PoweredOff);
        assert!(!enabled(ActionKind::Sort, &[off.clone()], &ctx));
        ctx.single_group_selected = true;
        assert!(enabled(ActionKind::Sort, &[off], &ctx));
    }

    #[test]
    fn test_discard_only_for_saved_editable() {
        let ctx = ctx();
        let running = rec("a", MachineState::Running);
        let saved = rec("b", MachineState::Saved);
        assert!(!enabled(ActionKind::Discard, &[running.clone()], &ctx));
        assert!(enabled(ActionKind::Discard, &[running.clone(), saved.clone()], &ctx));
        assert!(!item_eligible(ActionKind::Discard, &running, &ctx));
        assert!(item_eligible(ActionKind::Discard, &saved, &ctx));
        assert!(!enabled(ActionKind::Discard, &[saved.with_editable(false)], &ctx));
    }

    #[test]
    fn test_shutdown_needs_acpi_ready_guest() {
        let mut ctx = ctx();
        let running = rec("m", MachineState::Running);
        assert!(enabled(ActionKind::PowerOff, &[running.clone()], &ctx));
        assert!(!enabled(ActionKind::Shutdown, &[running.clone()], &ctx));

        ctx.acpi_ready.insert("m".into());
        assert!(enabled(ActionKind::Shutdown, &[running], &ctx));
    }

    #[test]
    fn test_shutdown_ignores_acpi_of_paused_guest() {
        let mut ctx = ctx();
        ctx.acpi_ready.insert("m".into());
        assert!(!enabled(
            ActionKind::Shutdown,
            &[rec("m", MachineState::Paused)],
            &ctx
        ));
    }

    #[test]
    fn test_pause_resume_item_skips() {
        let ctx = ctx();
        let running = rec("a", MachineState::Running);
        let paused = rec("b", MachineState::Paused);
        assert!(item_eligible(ActionKind::Pause, &running, &ctx));
        assert!(!item_eligible(ActionKind::Pause, &paused, &ctx));
        assert!(item_eligible(ActionKind::Resume, &paused, &ctx));
        assert!(!item_eligible(ActionKind::Resume, &running, &ctx));
    }

    #[test]
    fn test_reset_needs_running() {
        let ctx = ctx();
        assert!(!enabled(ActionKind::Reset, &[rec("p", MachineState::Paused)], &ctx));
        assert!(enabled(
            ActionKind::Reset,
            &[rec("t", MachineState::TeleportingOut)],
            &ctx
        ));
    }

    #[test]
    fn test_alias_shortcuts_need_canonical_extension() {
        let mut ctx = ctx();
        ctx.shortcut_style = ShortcutStyle::Alias;
        let modern = rec("a", MachineState::PoweredOff).with_settings_path("/vms/a/a.VBOX");
        let legacy = rec("b", MachineState::PoweredOff).with_settings_path("/vms/b/b.xml");
        assert!(enabled(ActionKind::CreateShortcut, &[modern], &ctx));
        assert!(!enabled(ActionKind::CreateShortcut, &[legacy.clone()], &ctx));

        ctx.shortcut_style = ShortcutStyle::Desktop;
        assert!(enabled(ActionKind::CreateShortcut, &[legacy], &ctx));
    }

    #[test]
    fn test_unknown_state_is_not_actionable() {
        let ctx = ctx();
        let odd = rec("m", MachineState::Unknown);
        for action in [
            ActionKind::Start,
            ActionKind::Pause,
            ActionKind::Reset,
            ActionKind::Discard,
            ActionKind::PowerOff,
            ActionKind::Settings,
        ] {
            assert!(!enabled(action, &[odd.clone()], &ctx), "{:?}", action);
        }
    }
}
