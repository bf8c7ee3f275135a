pub mod due;
pub mod enums;
pub mod error;
pub mod format;
pub mod stats;
pub mod task;
pub mod views;

pub use due::{format_due_date, parse_due_date, DueStatus};
pub use enums::UiMode;
pub use error::TaskError;
pub use format::format_elapsed;
pub use stats::{average_finished_time, finished_summaries, NameSummary};
pub use task::{Task, TaskId};
pub use views::{build_rows, progress_bar, tree_connector, DueInfo, TaskRow, ViewOptions};
