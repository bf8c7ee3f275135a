use crate::app::AppState;
use crate::domain::UiMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.ui_mode.is_input() {
        handle_input_form_mode(app, key);
        false
    } else {
        handle_normal_mode(app, key)
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> bool {
    app.clear_status();

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),

        // Start/stop timer
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_timer(),

        KeyCode::Char('d') | KeyCode::Char('D') => app.finish_selected(),

        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => app.delete_selected(),

        KeyCode::Char('a') => app.start_add_task(),
        KeyCode::Char('A') => app.start_add_subtask(),

        KeyCode::Char('t') | KeyCode::Char('T') => app.start_set_due_date(),

        KeyCode::Char('q') | KeyCode::Char('Q') => return true,

        _ => {}
    }

    false
}

/// Handle keys in input form mode (task, subtask or due date)
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Char(c) => app.input_form_add_char(c),
        _ => {}
    }
}
