use thiserror::Error;
use uuid::Uuid;

/// Errors raised by task operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("no task with id {0}")]
    NotFound(Uuid),

    /// Subtasks cannot own subtasks or due dates
    #[error("task {0} is a subtask; only top-level tasks allow this")]
    NotTopLevel(Uuid),

    #[error("invalid due date: {0:?}")]
    InvalidDueDate(String),
}
