use crate::app::{AppState, FormTarget};
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the input form for tasks, subtasks and due dates
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.input_form else {
        return;
    };

    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let (title, label, hint) = match form.target {
        FormTarget::Task => (" Add Task ", "Name:", "Enter to add  ·  Esc to cancel"),
        FormTarget::Subtask { .. } => (" Add Subtask ", "Name:", "Enter to add  ·  Esc to cancel"),
        FormTarget::DueDate { .. } => (
            " Due Date ",
            "Due (e.g. 2025-05-08T15:00):",
            "Enter to save  ·  empty clears  ·  Esc to cancel",
        ),
    };

    let lines = vec![
        Line::raw(""),
        Line::raw(label),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(form.text.clone(), modal_title_style()),
            Span::styled("█", modal_title_style()),
        ]),
        Line::raw(""),
        Line::raw(hint),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
