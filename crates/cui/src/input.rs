use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    NextFocus,
    PrevFocus,
    MoveUp,
    MoveDown,
    ToggleSelect,
    SelectAll,
    ClearSelection,
    Activate,
    OpenPack,
    OpenMaxPacks,
    SellSelected,
    UnlockSkill,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::ClearSelection,
        KeyCode::Tab => InputAction::NextFocus,
        KeyCode::BackTab => InputAction::PrevFocus,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Enter => InputAction::Activate,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char(' ') => InputAction::ToggleSelect,
        KeyCode::Char('a') => InputAction::SelectAll,
        KeyCode::Char('c') => InputAction::ClearSelection,
        KeyCode::Char('o') => InputAction::OpenPack,
        KeyCode::Char('m') => InputAction::OpenMaxPacks,
        KeyCode::Char('s') => InputAction::SellSelected,
        KeyCode::Char('u') => InputAction::UnlockSkill,
        _ => InputAction::None,
    }
}
