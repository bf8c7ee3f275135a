use crate::app::AppState;
use crate::domain::format_elapsed;
use crate::ui::styles::{border_style, default_style, running_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the details pane for the selected task
pub fn render_details_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Details ", title_style()));

    let Some(row) = app.get_selected_row() else {
        f.render_widget(Paragraph::new("No task selected").block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:    ", title_style()),
            Span::raw(row.name.clone()),
        ]),
        Line::raw(""),
    ];

    let elapsed_style = if row.running { running_style() } else { default_style() };
    lines.push(Line::from(vec![
        Span::styled("Elapsed: ", title_style()),
        Span::styled(row.elapsed.clone(), elapsed_style),
    ]));

    lines.push(Line::from(vec![
        Span::styled("Status:  ", title_style()),
        Span::raw(if row.running { "RUNNING" } else { "STOPPED" }),
    ]));

    let average = app
        .store
        .average_finished_time(&row.name)
        .map(format_elapsed)
        .unwrap_or_else(|| "no data".to_string());
    lines.push(Line::from(vec![
        Span::styled("Average: ", title_style()),
        Span::raw(average),
    ]));

    if let Some(due) = &row.due {
        lines.push(Line::from(vec![
            Span::styled("Due:     ", title_style()),
            Span::raw(format!("{} ({})", due.label, due.status.badge())),
        ]));
    }

    if let Some((done, total)) = row.progress {
        lines.push(Line::from(vec![
            Span::styled("Subtasks: ", title_style()),
            Span::raw(format!("{} of {} finished", done, total)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
