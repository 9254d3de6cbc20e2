//! Domain model for the kanban board.
//!
//! Statuses, tasks and the board derived from them are plain values; every
//! transition is a pure function returning a new value. Nothing in this
//! module performs I/O.

mod board;
mod drag;
mod error;
mod ids;
mod status;
mod task;

pub use board::{
    Board, BoardPosition, Column, MergeOutcome, MovedTask, Reassignment, StatusResolution,
    resolve_status,
};
pub use drag::{DragGesture, DragPlan, IgnoredDrag, PlannedMove, StaleDrag, plan_drag};
pub use error::BoardDomainError;
pub use ids::{PROVISIONAL_TASK_PREFIX, ProjectId, StatusId, TaskId};
pub use status::{
    DEFAULT_STATUS_COLOR, DEFAULT_STATUS_TEMPLATES, Status, StatusName, StatusTemplate,
    UNNAMED_STATUS,
};
pub use task::{Task, TaskEdit, TaskTitle, UNTITLED_TASK};
