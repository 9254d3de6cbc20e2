//! Board State Store: the single client-side owner of the board.
//!
//! Every mutation swaps in a new [`Board`] value and bumps the revision.
//! Tentative moves are remembered per task until the backend confirms or
//! rejects them.

use crate::board::domain::{
    Board, BoardDomainError, BoardPosition, DragGesture, DragPlan, IgnoredDrag, MergeOutcome,
    StaleDrag, Status, Task, TaskId, plan_drag,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// A board value together with the revision it was published at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// The board.
    pub board: Board,
    /// Monotonic revision; bumped by every mutation.
    pub revision: u64,
}

/// Why a drag was refused without touching the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejected {
    /// The drag no longer matches the board.
    #[error(transparent)]
    Stale(#[from] StaleDrag),

    /// The task carries a provisional identifier and has no backend record.
    #[error("task {0} has no backend record")]
    Unsaved(TaskId),

    /// The task has a move awaiting backend confirmation.
    #[error("task {0} already has a move awaiting confirmation")]
    MoveInFlight(TaskId),
}

/// A move applied optimistically and awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TentativeMove {
    /// The moved task as it now sits on the board.
    pub task: Task,
    /// Where the task was.
    pub from: BoardPosition,
    /// Where the task landed.
    pub to: BoardPosition,
    /// Revision published by the move.
    pub revision: u64,
}

/// Result of [`BoardStore::begin_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStart {
    /// The drag needs no work.
    Ignored(IgnoredDrag),
    /// The board now shows the move.
    Applied(TentativeMove),
}

#[derive(Debug, Clone)]
struct PendingMove {
    snapshot: Board,
    applied_revision: u64,
    from: BoardPosition,
    to: BoardPosition,
}

#[derive(Debug, Default)]
struct StoreState {
    board: Board,
    revision: u64,
    pending: HashMap<TaskId, PendingMove>,
}

impl StoreState {
    fn publish(&mut self, board: Board) -> BoardSnapshot {
        self.board = board;
        self.revision += 1;
        self.snapshot()
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.board.clone(),
            revision: self.revision,
        }
    }
}

/// Thread-safe holder of the current board.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    state: Arc<RwLock<StoreState>>,
}

impl BoardStore {
    /// Creates a store holding an empty board at revision zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current board and revision.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.read().snapshot()
    }

    /// Returns the current board.
    #[must_use]
    pub fn board(&self) -> Board {
        self.read().board.clone()
    }

    /// Replaces the board with one empty column per status and forgets
    /// every pending move.
    pub fn initialize(&self, statuses: impl IntoIterator<Item = Status>) -> BoardSnapshot {
        let mut state = self.write();
        state.pending.clear();
        state.publish(Board::initialize(statuses))
    }

    /// Merges tasks into the current columns.
    ///
    /// Returns the outcome with its board replaced by the published one.
    pub fn merge_tasks(&self, tasks: impl IntoIterator<Item = Task>) -> (BoardSnapshot, MergeOutcome) {
        let mut state = self.write();
        let outcome = state.board.merge_tasks(tasks);
        let snapshot = state.publish(outcome.board.clone());
        (snapshot, outcome)
    }

    /// Publishes a freshly fetched board.
    ///
    /// Pending moves are re-applied on top so the optimistic state survives
    /// the refetch; their rollback target becomes the fetched position.
    /// Pending moves whose task is gone from the fetched board are dropped.
    pub fn replace(&self, fetched: Board) -> BoardSnapshot {
        let mut state = self.write();
        let mut pending: Vec<(TaskId, PendingMove)> = state.pending.drain().collect();
        pending.sort_by_key(|(_, entry)| entry.applied_revision);

        let mut board = fetched;
        let mut kept = HashMap::new();
        for (task_id, mut entry) in pending {
            let Some(current) = board.locate(&task_id) else {
                continue;
            };
            if let Ok(moved) = board.move_task(&task_id, &entry.to) {
                entry.from = current;
                entry.to = moved.to;
                board = moved.board;
                kept.insert(task_id, entry);
            }
        }
        state.pending = kept;
        state.publish(board)
    }

    /// Applies a board transition.
    pub fn update(&self, transition: impl FnOnce(&Board) -> Board) -> BoardSnapshot {
        let mut state = self.write();
        let board = transition(&state.board);
        state.publish(board)
    }

    /// Applies a fallible board transition; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the transition's error.
    pub fn try_update<E>(
        &self,
        transition: impl FnOnce(&Board) -> Result<Board, E>,
    ) -> Result<BoardSnapshot, E> {
        let mut state = self.write();
        let board = transition(&state.board)?;
        Ok(state.publish(board))
    }

    /// Restores `snapshot` when nothing was published after `applied_revision`,
    /// otherwise applies `inverse` to the current board (keeping it when
    /// `inverse` yields nothing).
    pub fn revert(
        &self,
        snapshot: Board,
        applied_revision: u64,
        inverse: impl FnOnce(&Board) -> Option<Board>,
    ) -> BoardSnapshot {
        let mut state = self.write();
        let board = if state.revision == applied_revision {
            snapshot
        } else {
            inverse(&state.board).unwrap_or_else(|| state.board.clone())
        };
        state.publish(board)
    }

    /// Validates a drag against the current board and applies it
    /// optimistically.
    ///
    /// # Errors
    ///
    /// Returns [`MoveRejected::MoveInFlight`] when the task already has a
    /// pending move and [`MoveRejected::Stale`] when the drag does not match
    /// the board. The board is untouched in both cases.
    pub fn begin_move(&self, gesture: &DragGesture) -> Result<MoveStart, MoveRejected> {
        let mut state = self.write();
        if state.pending.contains_key(&gesture.task_id) {
            return Err(MoveRejected::MoveInFlight(gesture.task_id.clone()));
        }
        let planned = match plan_drag(&state.board, gesture)? {
            DragPlan::Ignored(reason) => return Ok(MoveStart::Ignored(reason)),
            DragPlan::Move(planned) => planned,
        };
        let snapshot = state.publish(planned.board);
        state.pending.insert(
            gesture.task_id.clone(),
            PendingMove {
                snapshot: planned.snapshot,
                applied_revision: snapshot.revision,
                from: planned.from.clone(),
                to: planned.to.clone(),
            },
        );
        Ok(MoveStart::Applied(TentativeMove {
            task: planned.task,
            from: planned.from,
            to: planned.to,
            revision: snapshot.revision,
        }))
    }

    /// Marks a pending move as persisted. Returns `false` when the task had
    /// no pending move.
    pub fn confirm_move(&self, task_id: &TaskId) -> bool {
        self.write().pending.remove(task_id).is_some()
    }

    /// Undoes a pending move.
    ///
    /// Restores the pre-drag board when nothing was published since the
    /// move; otherwise moves the task back to where it came from on the
    /// current board. Returns `None` when the task had no pending move.
    pub fn revert_move(&self, task_id: &TaskId) -> Option<BoardSnapshot> {
        let mut state = self.write();
        let pending = state.pending.remove(task_id)?;
        let board = reverted_board(&state.board, state.revision, task_id, pending);
        Some(state.publish(board))
    }

    /// Returns `true` while the task has a move awaiting confirmation.
    #[must_use]
    pub fn is_move_pending(&self, task_id: &TaskId) -> bool {
        self.read().pending.contains_key(task_id)
    }

    /// Moves a column optimistically, returning the board before the move
    /// and the published snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::ColumnOutOfRange`] when either position
    /// is outside the board.
    pub fn move_column(
        &self,
        from: usize,
        to: usize,
    ) -> Result<(Board, BoardSnapshot), BoardDomainError> {
        let mut state = self.write();
        let before = state.board.clone();
        let board = before.with_column_moved(from, to)?;
        let snapshot = state.publish(board);
        Ok((before, snapshot))
    }

    /// Swaps the status of an existing column optimistically, returning the
    /// board before the swap and the published snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnknownStatus`] when the column is not on
    /// the board.
    pub fn replace_status(
        &self,
        status: Status,
    ) -> Result<(Board, BoardSnapshot), BoardDomainError> {
        let mut state = self.write();
        if !state.board.contains_status(status.id()) {
            return Err(BoardDomainError::UnknownStatus(status.id().clone()));
        }
        let before = state.board.clone();
        let snapshot = state.publish(before.with_status(status));
        Ok((before, snapshot))
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn reverted_board(current: &Board, revision: u64, task_id: &TaskId, pending: PendingMove) -> Board {
    if revision == pending.applied_revision {
        return pending.snapshot;
    }
    current
        .move_task(task_id, &pending.from)
        .map_or_else(|_| current.clone(), |moved| moved.board)
}
