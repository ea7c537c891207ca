use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::ConsoleState;

/// What the event loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    None,
    Quit,
    SubmitInput,
    SubmitOption(usize),
    ToggleRecording,
}

pub fn handle_key(state: &mut ConsoleState, key: KeyEvent) -> ConsoleAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'q') => ConsoleAction::Quit,
            KeyCode::Char('r') => ConsoleAction::ToggleRecording,
            _ => ConsoleAction::None,
        };
    }

    if state.options().is_empty() {
        handle_input_key(state, key.code)
    } else {
        handle_option_key(state, key.code)
    }
}

/// Multiple-choice prompt: the modal owns the keyboard.
fn handle_option_key(state: &mut ConsoleState, key: KeyCode) -> ConsoleAction {
    match key {
        KeyCode::Left | KeyCode::BackTab => state.select_prev_option(),
        KeyCode::Right | KeyCode::Tab => state.select_next_option(),
        KeyCode::Enter => return ConsoleAction::SubmitOption(state.selected_option),
        _ => {}
    }
    ConsoleAction::None
}

fn handle_input_key(state: &mut ConsoleState, key: KeyCode) -> ConsoleAction {
    let input = &mut state.input;
    match key {
        KeyCode::Enter => return ConsoleAction::SubmitInput,
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Esc => input.clear(),
        _ => {}
    }
    ConsoleAction::None
}
