use crate::app::AppState;
use crate::ui::styles::{error_style, hint_style, info_style};
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::raw(" ↑/↓ select   "),
        Span::raw("Enter start/stop   "),
        Span::raw("d finish   "),
        Span::raw("x delete   "),
        Span::raw("a add   "),
        Span::raw("A subtask   "),
        Span::raw("t due date   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}

/// Render the status line (last action result or error)
pub fn render_status_line(f: &mut Frame, app: &AppState, area: Rect) {
    let line = match &app.status {
        Some(status) => {
            let style = if status.is_error { error_style() } else { info_style() };
            Line::from(Span::styled(format!(" {}", status.text), style))
        }
        None => Line::raw(""),
    };

    f.render_widget(Paragraph::new(line), area);
}
