//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextScreen,
    PrevScreen,
    SwitchScreen(usize),
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    PrevPartition,
    NextPartition,
    OpenSearch,
    NextSortColumn,
    CycleSort,
    ToggleUnassigned,
    CyclePageSize,
    DeleteItem,
    OpenChildren,
    ClearScope,
    OpenHelp,
    Refresh,
    Confirm,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('c') => Some(Action::NextSortColumn),
        KeyCode::Char('s') => Some(Action::CycleSort),
        KeyCode::Char('u') => Some(Action::ToggleUnassigned),
        KeyCode::Char('z') => Some(Action::CyclePageSize),
        KeyCode::Char('d') => Some(Action::DeleteItem),
        KeyCode::Char('o') => Some(Action::OpenChildren),
        KeyCode::Char('x') => Some(Action::ClearScope),
        KeyCode::Char('y') | KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Char('n') | KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextScreen),
        KeyCode::BackTab => Some(Action::PrevScreen),
        KeyCode::Char('[') => Some(Action::PrevPartition),
        KeyCode::Char(']') => Some(Action::NextPartition),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => Some(Action::PrevPage),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => Some(Action::NextPage),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let idx = match c {
                '1' => 0,
                '2' => 1,
                '3' => 2,
                _ => return None,
            };
            Some(Action::SwitchScreen(idx))
        }
        _ => None,
    }
}

/// Lines of the help modal.
pub const HELP_LINES: &[&str] = &[
    "Tab / 1-3     switch screen",
    "j / k         move selection",
    "h / l         previous / next page",
    "[ / ]         previous / next partition",
    "/             search (Enter apply, Esc cancel)",
    "c / s         sort column / cycle sort",
    "u             unassigned only",
    "z             page size",
    "o / x         open children / clear scope",
    "d             delete (y confirm, n cancel)",
    "r             refresh",
    "q             quit",
];
