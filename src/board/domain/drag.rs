//! Drag gesture planning.
//!
//! Planning is pure: it validates a finished drag against the board the
//! user was looking at and computes the board the drop should produce. The
//! caller decides when to apply, confirm or revert the plan.

use super::{Board, BoardDomainError, BoardPosition, MovedTask, StatusId, Task, TaskId};
use thiserror::Error;

/// A finished drag reported by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    /// The dragged task.
    pub task_id: TaskId,
    /// Where the drag started.
    pub source: BoardPosition,
    /// Where the task was dropped; `None` when dropped outside any column.
    pub destination: Option<BoardPosition>,
}

impl DragGesture {
    /// Starts describing a drag of `task_id` from `source`.
    #[must_use]
    pub const fn new(task_id: TaskId, source: BoardPosition) -> Self {
        Self {
            task_id,
            source,
            destination: None,
        }
    }

    /// Records the drop position.
    #[must_use]
    pub fn dropped_at(mut self, destination: BoardPosition) -> Self {
        self.destination = Some(destination);
        self
    }
}

/// Why a drag needs no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredDrag {
    /// The task was dropped outside every column.
    NoDestination,
    /// The task was dropped where it started.
    SamePosition,
}

/// Why a drag does not match the board it is applied to.
///
/// These arise when the board changed (for example through a refetch)
/// between the start of the drag and the drop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StaleDrag {
    /// The source column is no longer on the board.
    #[error("source column {0} is not on the board")]
    UnknownSourceColumn(StatusId),

    /// The destination column is no longer on the board.
    #[error("destination column {0} is not on the board")]
    UnknownDestinationColumn(StatusId),

    /// The task is no longer at the claimed source position.
    #[error("task {task_id} is not at {claimed}")]
    TaskNotAtSource {
        /// The dragged task.
        task_id: TaskId,
        /// The claimed source position.
        claimed: BoardPosition,
    },
}

/// A validated move with the board before and after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// The board before the drag.
    pub snapshot: Board,
    /// The board after the drop.
    pub board: Board,
    /// The moved task as it sits after the drop.
    pub task: Task,
    /// Where the task was.
    pub from: BoardPosition,
    /// Where the task landed.
    pub to: BoardPosition,
}

impl PlannedMove {
    fn from_moved(snapshot: &Board, moved: MovedTask) -> Self {
        Self {
            snapshot: snapshot.clone(),
            board: moved.board,
            task: moved.task,
            from: moved.from,
            to: moved.to,
        }
    }
}

/// Outcome of planning a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPlan {
    /// Nothing to do.
    Ignored(IgnoredDrag),
    /// The board changes as described.
    Move(PlannedMove),
}

/// Validates a drag against `board` and computes the resulting board.
///
/// # Errors
///
/// Returns [`StaleDrag`] when either column is gone or the dragged task is
/// not at the claimed source position. The board is never modified.
pub fn plan_drag(board: &Board, gesture: &DragGesture) -> Result<DragPlan, StaleDrag> {
    let Some(destination) = gesture.destination.as_ref() else {
        return Ok(DragPlan::Ignored(IgnoredDrag::NoDestination));
    };
    if destination == &gesture.source {
        return Ok(DragPlan::Ignored(IgnoredDrag::SamePosition));
    }

    let source_column = board
        .column(&gesture.source.status)
        .ok_or_else(|| StaleDrag::UnknownSourceColumn(gesture.source.status.clone()))?;
    if !board.contains_status(&destination.status) {
        return Err(StaleDrag::UnknownDestinationColumn(
            destination.status.clone(),
        ));
    }
    let at_source = source_column
        .task_at(gesture.source.index)
        .is_some_and(|task| task.id() == &gesture.task_id);
    if !at_source {
        return Err(not_at_source(gesture));
    }

    board
        .move_from(&gesture.source, destination)
        .map(|moved| DragPlan::Move(PlannedMove::from_moved(board, moved)))
        .map_err(|err| match err {
            BoardDomainError::UnknownStatus(status) if status == destination.status => {
                StaleDrag::UnknownDestinationColumn(status)
            }
            _ => not_at_source(gesture),
        })
}

fn not_at_source(gesture: &DragGesture) -> StaleDrag {
    StaleDrag::TaskNotAtSource {
        task_id: gesture.task_id.clone(),
        claimed: gesture.source.clone(),
    }
}
