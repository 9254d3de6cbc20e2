//! Application services for board state and backend synchronisation.

mod store;
mod synchronizer;

pub use store::{BoardSnapshot, BoardStore, MoveRejected, MoveStart, TentativeMove};
pub use synchronizer::{
    BoardResult, BoardServiceError, BoardSynchronizer, DragOutcome, LoadReport, TaskSource,
};
