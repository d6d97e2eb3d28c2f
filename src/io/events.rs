use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::state::KeyBindings;

/// What the user asked for, decoupled from the terminal event that carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Pass,
    Like,
    Redraw,
    Quit,
}

pub fn map_event(event: &Event, keys: &KeyBindings) -> Option<InputCommand> {
    match event {
        Event::Key(key) => map_key(key, keys),
        Event::Resize(_, _) => Some(InputCommand::Redraw),
        _ => None,
    }
}

pub fn map_key(key: &KeyEvent, keys: &KeyBindings) -> Option<InputCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputCommand::Quit),
            KeyCode::Char('l') => Some(InputCommand::Redraw),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Left => Some(InputCommand::Pass),
        KeyCode::Right => Some(InputCommand::Like),
        KeyCode::Esc => Some(InputCommand::Quit),
        KeyCode::Char(c) if c == keys.reject => Some(InputCommand::Pass),
        KeyCode::Char(c) if c == keys.accept => Some(InputCommand::Like),
        KeyCode::Char(c) if c == keys.quit => Some(InputCommand::Quit),
        _ => None,
    }
}
