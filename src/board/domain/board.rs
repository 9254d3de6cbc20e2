//! The board: every known status mapped to its ordered task list.
//!
//! A [`Board`] is a value. Every transition borrows the current board and
//! returns a new one; untouched columns share their task lists with the
//! previous value, so consumers can detect which columns changed by pointer
//! comparison ([`Column::shares_tasks_with`]) as well as by equality.

use super::{BoardDomainError, Status, StatusId, Task, TaskId};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A slot on the board: a column and an index within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardPosition {
    /// Column the slot belongs to.
    pub status: StatusId,
    /// Zero-based index within the column.
    pub index: usize,
}

impl BoardPosition {
    /// Creates a board position.
    #[must_use]
    pub fn new(status: impl Into<StatusId>, index: usize) -> Self {
        Self {
            status: status.into(),
            index,
        }
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.status, self.index)
    }
}

/// One column of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    status: Status,
    #[serde(serialize_with = "serialize_tasks")]
    tasks: Arc<Vec<Task>>,
}

fn serialize_tasks<S: Serializer>(tasks: &Arc<Vec<Task>>, serializer: S) -> Result<S::Ok, S::Error> {
    tasks.as_slice().serialize(serializer)
}

impl Column {
    fn new(status: Status, tasks: Vec<Task>) -> Self {
        Self {
            status,
            tasks: Arc::new(tasks),
        }
    }

    /// Returns the status owning this column.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Returns the status identifier.
    #[must_use]
    pub const fn id(&self) -> &StatusId {
        self.status.id()
    }

    /// Returns the ordered tasks.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the task at `index`, if any.
    #[must_use]
    pub fn task_at(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Returns the number of tasks in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the column holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns `true` when both columns share the same task list allocation.
    #[must_use]
    pub fn shares_tasks_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tasks, &other.tasks)
    }

    fn with_tasks(&self, tasks: Vec<Task>) -> Self {
        Self::new(self.status.clone(), tasks)
    }
}

/// A task moved from one status to another because its own status is not
/// on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The reassigned task.
    pub task_id: TaskId,
    /// Status the task referenced.
    pub from: StatusId,
    /// Status the task was placed in.
    pub to: StatusId,
}

/// Result of [`Board::merge_tasks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged board.
    pub board: Board,
    /// Tasks placed in the fallback column.
    pub reassigned: Vec<Reassignment>,
    /// Tasks that could not be placed because the board has no columns.
    pub dropped: Vec<TaskId>,
}

/// Result of a task relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedTask {
    /// Board after the move.
    pub board: Board,
    /// The moved task with its new status and index.
    pub task: Task,
    /// Where the task was.
    pub from: BoardPosition,
    /// Where the task ended up (destination index clamped to the column).
    pub to: BoardPosition,
}

/// How a task's status reference maps onto the known columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusResolution {
    /// The status is a known column at this position.
    Known(usize),
    /// The status is unknown; the task falls back to the column at this
    /// position (always the first).
    Fallback(usize),
    /// There are no known columns at all.
    Unplaceable,
}

/// Resolves a status reference against the known statuses, in column order.
///
/// Unknown statuses fall back to the first known status so that no task is
/// lost; callers report the reassignment.
#[must_use]
pub fn resolve_status(status: &StatusId, known: &[StatusId]) -> StatusResolution {
    match known.iter().position(|candidate| candidate == status) {
        Some(position) => StatusResolution::Known(position),
        None if known.is_empty() => StatusResolution::Unplaceable,
        None => StatusResolution::Fallback(0),
    }
}

/// Columns in status order, each holding its ordered tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Builds a board with one empty column per status.
    ///
    /// Columns are ordered by status order, ties keeping input order. A
    /// repeated status identifier keeps its first occurrence.
    #[must_use]
    pub fn initialize(statuses: impl IntoIterator<Item = Status>) -> Self {
        let mut seen = HashSet::new();
        let mut ordered: Vec<Status> = statuses
            .into_iter()
            .filter(|status| seen.insert(status.id().clone()))
            .collect();
        ordered.sort_by_key(Status::order);
        Self {
            columns: ordered
                .into_iter()
                .map(|status| Column::new(status, Vec::new()))
                .collect(),
        }
    }

    /// Buckets tasks into their columns and sorts every touched column by
    /// index (stable, so equal indices keep their relative order).
    ///
    /// A task already on the board is replaced by the incoming record; when
    /// the same identifier appears several times in `tasks` the last record
    /// wins. Tasks referencing an unknown status are placed in the first
    /// column and reported in [`MergeOutcome::reassigned`].
    #[must_use]
    pub fn merge_tasks(&self, tasks: impl IntoIterator<Item = Task>) -> MergeOutcome {
        let known: Vec<StatusId> = self.status_ids().cloned().collect();
        let mut reassigned = Vec::new();
        let mut dropped = Vec::new();
        let mut placed: Vec<(usize, Task)> = Vec::new();

        for task in last_record_wins(tasks) {
            match resolve_status(task.status(), &known) {
                StatusResolution::Known(position) => placed.push((position, task)),
                StatusResolution::Fallback(position) => {
                    let Some(target) = known.get(position) else {
                        dropped.push(task.id().clone());
                        continue;
                    };
                    reassigned.push(Reassignment {
                        task_id: task.id().clone(),
                        from: task.status().clone(),
                        to: target.clone(),
                    });
                    placed.push((position, task.with_status(target.clone())));
                }
                StatusResolution::Unplaceable => dropped.push(task.id().clone()),
            }
        }

        let incoming: HashSet<TaskId> = placed.iter().map(|(_, task)| task.id().clone()).collect();
        let mut buckets: Vec<Option<Vec<Task>>> = self
            .columns
            .iter()
            .map(|column| {
                column
                    .tasks
                    .iter()
                    .any(|task| incoming.contains(task.id()))
                    .then(|| {
                        column
                            .tasks
                            .iter()
                            .filter(|task| !incoming.contains(task.id()))
                            .cloned()
                            .collect()
                    })
            })
            .collect();

        for (position, task) in placed {
            if let (Some(bucket), Some(column)) =
                (buckets.get_mut(position), self.columns.get(position))
            {
                bucket
                    .get_or_insert_with(|| column.tasks.to_vec())
                    .push(task);
            }
        }

        let columns = self
            .columns
            .iter()
            .zip(buckets)
            .map(|(column, bucket)| match bucket {
                Some(mut tasks) => {
                    tasks.sort_by_key(Task::index);
                    column.with_tasks(tasks)
                }
                None => column.clone(),
            })
            .collect();

        MergeOutcome {
            board: Self { columns },
            reassigned,
            dropped,
        }
    }

    /// Returns the columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column for a status, if it is on the board.
    #[must_use]
    pub fn column(&self, status: &StatusId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id() == status)
    }

    /// Returns the status identifiers in column order.
    pub fn status_ids(&self) -> impl Iterator<Item = &StatusId> {
        self.columns.iter().map(Column::id)
    }

    /// Returns `true` when the status is a column of the board.
    #[must_use]
    pub fn contains_status(&self, status: &StatusId) -> bool {
        self.column(status).is_some()
    }

    /// Returns the total number of tasks on the board.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Finds where a task currently sits.
    #[must_use]
    pub fn locate(&self, task_id: &TaskId) -> Option<BoardPosition> {
        self.columns.iter().find_map(|column| {
            column
                .tasks
                .iter()
                .position(|task| task.id() == task_id)
                .map(|index| BoardPosition::new(column.id().clone(), index))
        })
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .find(|task| task.id() == task_id)
    }

    /// Returns the task at a board position, if any.
    #[must_use]
    pub fn task_at(&self, position: &BoardPosition) -> Option<&Task> {
        self.column(&position.status)
            .and_then(|column| column.task_at(position.index))
    }

    /// Moves a task to `to`, wherever it currently is.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::TaskNotFound`] when the task is not on the
    /// board or [`BoardDomainError::UnknownStatus`] when the destination
    /// column does not exist.
    pub fn move_task(&self, task_id: &TaskId, to: &BoardPosition) -> Result<MovedTask, BoardDomainError> {
        let from = self
            .locate(task_id)
            .ok_or_else(|| BoardDomainError::TaskNotFound(task_id.clone()))?;
        self.move_from(&from, to)
    }

    /// Moves whatever task is at `from` to `to`.
    ///
    /// Both affected columns are renumbered densely. A destination index past
    /// the end of the column is clamped to the end.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnknownStatus`] when either column does
    /// not exist or [`BoardDomainError::ColumnOutOfRange`] when `from`
    /// points past the end of its column.
    pub fn move_from(&self, from: &BoardPosition, to: &BoardPosition) -> Result<MovedTask, BoardDomainError> {
        let source = self.column_index(&from.status)?;
        let destination = self.column_index(&to.status)?;
        let mut source_tasks = self.column_tasks(source);
        if from.index >= source_tasks.len() {
            return Err(BoardDomainError::ColumnOutOfRange {
                index: from.index,
                len: source_tasks.len(),
            });
        }
        let moved = source_tasks.remove(from.index);
        let mut columns = self.columns.clone();

        let final_index = if source == destination {
            let index = to.index.min(source_tasks.len());
            source_tasks.insert(index, moved);
            replace_tasks(&mut columns, source, renumber(source_tasks));
            index
        } else {
            let mut destination_tasks = self.column_tasks(destination);
            let index = to.index.min(destination_tasks.len());
            destination_tasks.insert(index, moved.with_status(to.status.clone()));
            replace_tasks(&mut columns, source, renumber(source_tasks));
            replace_tasks(&mut columns, destination, renumber(destination_tasks));
            index
        };

        let board = Self { columns };
        let landed = BoardPosition::new(to.status.clone(), final_index);
        let task = board
            .task_at(&landed)
            .cloned()
            .ok_or_else(|| BoardDomainError::UnknownStatus(to.status.clone()))?;
        Ok(MovedTask {
            board,
            task,
            from: from.clone(),
            to: landed,
        })
    }

    /// Appends a task to the end of its column, setting its index.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnknownStatus`] when the task's column is
    /// not on the board.
    pub fn with_task_appended(&self, task: Task) -> Result<Self, BoardDomainError> {
        let position = self.column_index(task.status())?;
        let board = self.without_task_if_present(task.id());
        let mut tasks = board.column_tasks(position);
        let index = tasks.len();
        tasks.push(task.with_index(index));
        let mut columns = board.columns;
        replace_tasks(&mut columns, position, tasks);
        Ok(Self { columns })
    }

    /// Replaces a task with an updated record.
    ///
    /// The task keeps its slot when its status is unchanged; otherwise it
    /// leaves its old column and is appended to the new one.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::TaskNotFound`] when the task is not on the
    /// board or [`BoardDomainError::UnknownStatus`] when its new status is not
    /// a column.
    pub fn with_task_replaced(&self, task: Task) -> Result<Self, BoardDomainError> {
        let current = self
            .locate(task.id())
            .ok_or_else(|| BoardDomainError::TaskNotFound(task.id().clone()))?;
        if &current.status != task.status() {
            return self.with_task_appended(task);
        }
        let position = self.column_index(&current.status)?;
        let tasks = self
            .column_tasks(position)
            .into_iter()
            .map(|existing| {
                if existing.id() == task.id() {
                    task.clone().with_index(current.index)
                } else {
                    existing
                }
            })
            .collect();
        let mut columns = self.columns.clone();
        replace_tasks(&mut columns, position, tasks);
        Ok(Self { columns })
    }

    /// Removes a task and renumbers its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::TaskNotFound`] when the task is not on the
    /// board.
    pub fn without_task(&self, task_id: &TaskId) -> Result<Self, BoardDomainError> {
        if self.locate(task_id).is_none() {
            return Err(BoardDomainError::TaskNotFound(task_id.clone()));
        }
        Ok(self.without_task_if_present(task_id))
    }

    /// Adds a column at the end, or refreshes the status of an existing one.
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|column| column.id() == status.id()) {
            Some(column) => column.status = status,
            None => columns.push(Column::new(status, Vec::new())),
        }
        Self { columns }
    }

    /// Removes a column together with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnknownStatus`] when the column is not on
    /// the board.
    pub fn without_status(&self, status: &StatusId) -> Result<Self, BoardDomainError> {
        let position = self.column_index(status)?;
        let mut columns = self.columns.clone();
        columns.remove(position);
        Ok(Self { columns })
    }

    /// Moves the column at `from` to `to` and renumbers status orders
    /// densely in the new column order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::ColumnOutOfRange`] when either position is
    /// outside the board.
    pub fn with_column_moved(&self, from: usize, to: usize) -> Result<Self, BoardDomainError> {
        let len = self.columns.len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardDomainError::ColumnOutOfRange { index, len });
            }
        }
        let mut columns = self.columns.clone();
        let column = columns.remove(from);
        columns.insert(to, column);
        for (order, column) in columns.iter_mut().enumerate() {
            if column.status.order() != order {
                column.status = column.status.clone().with_order(order);
            }
        }
        Ok(Self { columns })
    }

    fn column_index(&self, status: &StatusId) -> Result<usize, BoardDomainError> {
        self.columns
            .iter()
            .position(|column| column.id() == status)
            .ok_or_else(|| BoardDomainError::UnknownStatus(status.clone()))
    }

    fn column_tasks(&self, position: usize) -> Vec<Task> {
        self.columns
            .get(position)
            .map(|column| column.tasks.to_vec())
            .unwrap_or_default()
    }

    fn without_task_if_present(&self, task_id: &TaskId) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                if column.tasks.iter().any(|task| task.id() == task_id) {
                    column.with_tasks(renumber(
                        column
                            .tasks
                            .iter()
                            .filter(|task| task.id() != task_id)
                            .cloned()
                            .collect(),
                    ))
                } else {
                    column.clone()
                }
            })
            .collect();
        Self { columns }
    }
}

/// Assigns dense `0..n-1` indices in list order.
fn renumber(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| task.with_index(index))
        .collect()
}

fn replace_tasks(columns: &mut [Column], position: usize, tasks: Vec<Task>) {
    if let Some(column) = columns.get_mut(position) {
        *column = column.with_tasks(tasks);
    }
}

/// Keeps only the last record for each task identifier, preserving the
/// order in which the surviving records appeared.
fn last_record_wins(tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
    let all: Vec<Task> = tasks.into_iter().collect();
    let mut seen = HashSet::new();
    let mut kept: Vec<Task> = all
        .into_iter()
        .rev()
        .filter(|task| seen.insert(task.id().clone()))
        .collect();
    kept.reverse();
    kept
}
