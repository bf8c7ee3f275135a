use super::due::{classify, format_due_local, DueStatus};
use super::format::format_elapsed;
use super::stats::average_finished_time;
use super::task::{Task, TaskId};
use chrono::{DateTime, Duration, Utc};

/// Rendering options for the task list
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub due_soon_window: Duration,
    pub show_averages: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            due_soon_window: Duration::hours(super::due::DEFAULT_DUE_SOON_HOURS),
            show_averages: true,
        }
    }
}

/// Due date annotation of a top-level row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueInfo {
    pub status: DueStatus,
    pub label: String,
}

/// A flattened row for rendering the active task list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    /// Owning task for subtask rows
    pub parent: Option<TaskId>,
    /// 0 = top-level task, 1 = subtask
    pub depth: usize,
    /// Whether this is the last visible subtask of its parent
    pub is_last: bool,
    pub name: String,
    pub elapsed: String,
    pub running: bool,
    /// Average finished time for this name, when there is data
    pub average: Option<String>,
    pub due: Option<DueInfo>,
    /// Finished / total subtasks
    pub progress: Option<(usize, usize)>,
}

/// Flatten the active tasks into rows.
///
/// Finished tasks are hidden, and a finished parent hides its subtasks too.
/// Averages are recomputed over the whole collection on every call.
pub fn build_rows(tasks: &[Task], now: DateTime<Utc>, options: &ViewOptions) -> Vec<TaskRow> {
    let average_for = |name: &str| {
        if options.show_averages {
            average_finished_time(tasks, name).map(format_elapsed)
        } else {
            None
        }
    };

    let mut rows = Vec::new();

    for task in tasks.iter().filter(|t| !t.finished) {
        rows.push(TaskRow {
            id: task.id,
            parent: None,
            depth: 0,
            is_last: false,
            name: task.name.clone(),
            elapsed: format_elapsed(task.time),
            running: task.running,
            average: average_for(&task.name),
            due: task.due_date.map(|due| DueInfo {
                status: classify(due, now, options.due_soon_window),
                label: format_due_local(due),
            }),
            progress: task.subtask_progress(),
        });

        let visible: Vec<&Task> = task.subtasks.iter().filter(|st| !st.finished).collect();
        let count = visible.len();
        for (idx, subtask) in visible.into_iter().enumerate() {
            rows.push(TaskRow {
                id: subtask.id,
                parent: Some(task.id),
                depth: 1,
                is_last: idx + 1 == count,
                name: subtask.name.clone(),
                elapsed: format_elapsed(subtask.time),
                running: subtask.running,
                average: average_for(&subtask.name),
                due: None,
                progress: None,
            });
        }
    }

    rows
}

/// Text progress bar, e.g. "[####------]"
pub fn progress_bar(done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 { 0 } else { (done * width) / total };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled.min(width)))
}

/// Get tree connector for subtasks
pub fn tree_connector(is_last: bool) -> &'static str {
    if is_last {
        "└─"
    } else {
        "├─"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 8, 12, 0, 0).unwrap()
    }

    fn finished(name: &str, time: u64) -> Task {
        let mut task = Task::new(name);
        task.time = time;
        task.finished = true;
        task
    }

    #[test]
    fn test_build_rows_hides_finished() {
        let mut parent = Task::new("Parent");
        parent.subtasks.push(Task::new("Sub 1"));
        parent.subtasks.push(finished("Sub 2", 5));
        parent.subtasks.push(Task::new("Sub 3"));

        let mut done_parent = finished("Done parent", 10);
        done_parent.subtasks.push(Task::new("Orphaned"));

        let tasks = vec![parent, done_parent, Task::new("Other")];
        let rows = build_rows(&tasks, now(), &ViewOptions::default());

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Parent", "Sub 1", "Sub 3", "Other"]);

        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].parent, Some(tasks[0].id));
        assert!(!rows[1].is_last);
        assert!(rows[2].is_last);
        assert_eq!(rows[0].progress, Some((1, 3)));
        assert_eq!(rows[3].progress, None);
    }

    #[test]
    fn test_build_rows_average_and_elapsed() {
        let mut active = Task::new("Email");
        active.time = 61;
        let tasks = vec![active, finished("Email", 100), finished("Email", 200)];

        let rows = build_rows(&tasks, now(), &ViewOptions::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].elapsed, "00:01:01");
        assert_eq!(rows[0].average.as_deref(), Some("00:02:30"));

        let hidden = ViewOptions {
            show_averages: false,
            ..ViewOptions::default()
        };
        let rows = build_rows(&tasks, now(), &hidden);
        assert_eq!(rows[0].average, None);
    }

    #[test]
    fn test_build_rows_due_status() {
        let mut overdue = Task::new("Late");
        overdue.due_date = Some(now() - Duration::minutes(1));
        let mut soon = Task::new("Soon");
        soon.due_date = Some(now() + Duration::hours(2));
        let mut later = Task::new("Later");
        later.due_date = Some(now() + Duration::days(7));

        let rows = build_rows(&[overdue, soon, later, Task::new("None")], now(), &ViewOptions::default());
        let statuses: Vec<Option<DueStatus>> =
            rows.iter().map(|r| r.due.as_ref().map(|d| d.status)).collect();
        assert_eq!(
            statuses,
            vec![
                Some(DueStatus::Overdue),
                Some(DueStatus::DueSoon),
                Some(DueStatus::Normal),
                None
            ]
        );
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 4, 8), "[--------]");
        assert_eq!(progress_bar(2, 4, 8), "[####----]");
        assert_eq!(progress_bar(4, 4, 8), "[########]");
        assert_eq!(progress_bar(0, 0, 4), "[----]");
    }

    #[test]
    fn test_tree_connector() {
        assert_eq!(tree_connector(false), "├─");
        assert_eq!(tree_connector(true), "└─");
    }
}
