use crate::app::AppState;
use crate::domain::{progress_bar, tree_connector, DueStatus, TaskRow};
use crate::ui::styles::{
    average_style, border_style, default_style, due_soon_style, idle_style, overdue_style,
    progress_style, running_style, selected_style, title_style, tree_style,
};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

const PROGRESS_WIDTH: usize = 10;

/// Render the active task list
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let rows = app.rows();

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let style = if idx == app.selected_index {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(create_task_line(row)).style(style)
        })
        .collect();

    let running = rows.iter().filter(|r| r.running).count();
    let title = format!(" Tasks ({} active, {} running) ", rows.len(), running);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}

fn due_style(status: DueStatus) -> Style {
    match status {
        DueStatus::Overdue => overdue_style(),
        DueStatus::DueSoon => due_soon_style(),
        DueStatus::Normal => idle_style(),
    }
}

/// Create a single line for a task/subtask
/// Format: ▶ Write proposal  01:12:05  avg 00:45:00  [DUE SOON 2025-05-08 15:00]  [###-------] 1/3
fn create_task_line(row: &TaskRow) -> Line<'static> {
    let mut spans = Vec::new();

    if row.depth > 0 {
        spans.push(Span::styled("   ".to_string(), tree_style()));
        spans.push(Span::styled(
            tree_connector(row.is_last).to_string(),
            tree_style(),
        ));
        spans.push(Span::raw(" ".to_string()));
    }

    let (marker, marker_style) = if row.running {
        ("▶ ", running_style())
    } else {
        ("⏸ ", idle_style())
    };
    spans.push(Span::styled(marker.to_string(), marker_style));
    spans.push(Span::raw(row.name.clone()));
    spans.push(Span::raw("  ".to_string()));

    let elapsed_style = if row.running { running_style() } else { idle_style() };
    spans.push(Span::styled(row.elapsed.clone(), elapsed_style));

    if let Some(average) = &row.average {
        spans.push(Span::styled(format!("  avg {}", average), average_style()));
    }

    if let Some(due) = &row.due {
        spans.push(Span::styled(
            format!("  [{} {}]", due.status.badge(), due.label),
            due_style(due.status),
        ));
    }

    if let Some((done, total)) = row.progress {
        spans.push(Span::styled(
            format!("  {} {}/{}", progress_bar(done, total, PROGRESS_WIDTH), done, total),
            progress_style(),
        ));
    }

    Line::from(spans)
}
