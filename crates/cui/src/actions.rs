use crate::app::{App, FocusPane};
use crate::input::InputAction;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::NextFocus => app.cycle_focus(true),
        InputAction::PrevFocus => app.cycle_focus(false),
        InputAction::MoveUp => app.move_cursor(false),
        InputAction::MoveDown => app.move_cursor(true),
        InputAction::ToggleSelect => app.toggle_focused_selection(),
        InputAction::SelectAll => app.select_all(),
        InputAction::ClearSelection => {
            if app.show_help {
                app.show_help = false;
            } else {
                app.clear_selection();
            }
        }
        InputAction::Activate => app.activate_primary(),
        InputAction::OpenPack => app.open_packs(1),
        InputAction::OpenMaxPacks => app.open_max_packs(),
        InputAction::SellSelected => app.sell_selected(),
        InputAction::UnlockSkill => {
            if app.focus != FocusPane::Skills {
                app.focus = FocusPane::Skills;
                app.push_status("pick a skill and press u again");
            } else {
                app.unlock_focused_skill();
            }
        }
    }
}
