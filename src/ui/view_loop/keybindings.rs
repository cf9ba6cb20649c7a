//! Key bindings of the transcript viewer.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Quit,
    SelectNext,
    SelectPrevious,
    ClearSelection,
    /// Toggle `hidden` for the selected message's type.
    ToggleHidden,
    /// Toggle `full_height` for the selected message's type.
    ToggleFullHeight,
    ToggleHeightPolicy,
    CopySelected,
    /// Scroll inside the selected compact message.
    ScrollMessageUp,
    ScrollMessageDown,
    PageUp,
    PageDown,
    JumpToEnd,
}

pub fn action_for_key(key: &KeyEvent) -> Option<ViewAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(ViewAction::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('q') => ViewAction::Quit,
        KeyCode::Char('j') | KeyCode::Down => ViewAction::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => ViewAction::SelectPrevious,
        KeyCode::Esc => ViewAction::ClearSelection,
        KeyCode::Char('h') => ViewAction::ToggleHidden,
        KeyCode::Char('f') => ViewAction::ToggleFullHeight,
        KeyCode::Char('g') => ViewAction::ToggleHeightPolicy,
        KeyCode::Char('c') | KeyCode::Char('y') => ViewAction::CopySelected,
        KeyCode::Char('[') => ViewAction::ScrollMessageUp,
        KeyCode::Char(']') => ViewAction::ScrollMessageDown,
        KeyCode::PageUp => ViewAction::PageUp,
        KeyCode::PageDown | KeyCode::Char(' ') => ViewAction::PageDown,
        KeyCode::End | KeyCode::Char('G') => ViewAction::JumpToEnd,
        _ => return None,
    };
    Some(action)
}
