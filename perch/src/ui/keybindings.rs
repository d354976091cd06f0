//! Maps raw crossterm input to [`Action`]s.
//!
//! Pure functions: the update loop owns all state, so mapping a key never
//! mutates anything. While the help overlay is open only the keys that
//! close it or quit are live.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use perch_core::update::Action;

/// Lines moved per wheel notch.
const WHEEL_STEP: usize = 3;

pub fn map_key(key: KeyEvent, show_help: bool) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    if show_help {
        return match key.code {
            KeyCode::Char('?') | KeyCode::Esc => Some(Action::ToggleHelp),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up => Some(Action::SelectPrev),
        KeyCode::Down => Some(Action::SelectNext),
        KeyCode::Char('d') if ctrl => Some(Action::HalfPageDown),
        KeyCode::Char('u') if ctrl => Some(Action::HalfPageUp),
        KeyCode::Char('j') => Some(Action::ScrollDown(1)),
        KeyCode::Char('k') => Some(Action::ScrollUp(1)),
        KeyCode::Char('g') => Some(Action::ScrollTop),
        KeyCode::Char('G') => Some(Action::ScrollBottom),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::GrowList),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::ShrinkList),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

pub fn map_mouse(mouse: MouseEvent, show_help: bool) -> Option<Action> {
    if show_help {
        return None;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Action::ScrollDown(WHEEL_STEP)),
        MouseEventKind::ScrollUp => Some(Action::ScrollUp(WHEEL_STEP)),
        _ => None,
    }
}
