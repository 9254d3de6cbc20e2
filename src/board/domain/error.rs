//! Error types for board domain validation.

use super::{StatusId, TaskId};
use thiserror::Error;

/// Errors returned while constructing or transforming board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The status name is empty after trimming.
    #[error("status name must not be empty")]
    EmptyStatusName,

    /// The status is not a column of the board.
    #[error("unknown status: {0}")]
    UnknownStatus(StatusId),

    /// The task is not present on the board.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task carries a provisional identifier and has no backend record.
    #[error("task {0} has no backend record")]
    UnsavedTask(TaskId),

    /// A column position is outside the board.
    #[error("column position {index} is out of range for {len} columns")]
    ColumnOutOfRange {
        /// Requested column position.
        index: usize,
        /// Number of columns on the board.
        len: usize,
    },
}
