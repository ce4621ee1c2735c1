//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the keyboard is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Editor blurred; single keys are commands.
    Normal,
    /// Keys go to the text buffer.
    Editing,
    /// Suggestion popup open over the buffer.
    Completing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Save,
    Focus,
    Blur,
    TriggerCompletion,
    NextCompletion,
    PrevCompletion,
    AcceptCompletion,
    DismissCompletion,
    ToggleSidebar,
    Edit(KeyEvent),
}

pub fn map_key(event: KeyEvent, mode: KeyMode) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char(' ') if mode != KeyMode::Normal => Some(Action::TriggerCompletion),
            KeyCode::Char('b') => Some(Action::ToggleSidebar),
            _ if mode == KeyMode::Normal => None,
            _ => Some(Action::Edit(event)),
        };
    }

    match mode {
        KeyMode::Normal => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('i') | KeyCode::Enter => Some(Action::Focus),
            KeyCode::Char('b') => Some(Action::ToggleSidebar),
            _ => None,
        },
        KeyMode::Editing => match code {
            KeyCode::Esc => Some(Action::Blur),
            _ => Some(Action::Edit(event)),
        },
        KeyMode::Completing => match code {
            KeyCode::Esc => Some(Action::DismissCompletion),
            KeyCode::Enter | KeyCode::Tab => Some(Action::AcceptCompletion),
            KeyCode::Down => Some(Action::NextCompletion),
            KeyCode::Up | KeyCode::BackTab => Some(Action::PrevCompletion),
            _ => Some(Action::Edit(event)),
        },
    }
}
