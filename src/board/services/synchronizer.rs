//! Kanban board synchroniser.
//!
//! Orchestrates loads, drag-end reconciliation and task/status mutations
//! between the [`BoardStore`] and a [`BoardApi`]. Failures are reported once
//! through the [`Notifier`] and returned to the caller; nothing is retried.

use super::store::{BoardSnapshot, BoardStore, MoveRejected, MoveStart};
use crate::board::domain::{
    Board, BoardDomainError, DEFAULT_STATUS_COLOR, DEFAULT_STATUS_TEMPLATES, DragGesture,
    IgnoredDrag, ProjectId, Reassignment, Status, StatusId, StatusName, Task, TaskEdit, TaskId,
    TaskTitle,
};
use crate::board::normalize::{normalize_status, normalize_statuses, normalize_task, normalize_tasks};
use crate::board::ports::{
    BoardApi, CreateStatusRequest, CreateTaskRequest, Notification, NotificationLevel, Notifier,
    RawDescription, RawId, RawStatus, RawTask, StatusNameUpdate, StatusOrderUpdate, SyncError,
    UpdateTaskRequest,
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for board operations.
#[derive(Debug, Clone, Error)]
pub enum BoardServiceError {
    /// Local validation failed; no backend call was made.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// The backend call failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type for board service operations.
pub type BoardResult<T> = Result<T, BoardServiceError>;

/// What a load produced.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Revision published by the load.
    pub revision: u64,
    /// Number of columns on the board.
    pub columns: usize,
    /// Number of tasks on the board.
    pub tasks: usize,
    /// Tasks placed in the fallback column because their status is unknown.
    pub reassigned: Vec<Reassignment>,
    /// Tasks that could not be placed because there are no columns.
    pub dropped: Vec<TaskId>,
    /// Status records skipped for lack of an identifier.
    pub skipped_statuses: usize,
    /// Where the task records came from.
    pub task_source: TaskSource,
    /// Set when no task list could be loaded; the columns still loaded.
    pub tasks_error: Option<SyncError>,
}

/// Which task list fed a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    /// The project task list.
    Project,
    /// The cross-project task list, filtered to the board's columns.
    AllTasks,
    /// Neither list loaded; only tasks embedded in status records remain.
    Unavailable,
}

/// What became of a drag gesture.
#[derive(Debug, Clone)]
pub enum DragOutcome {
    /// Nothing to do.
    Ignored(IgnoredDrag),
    /// The drag was refused and the board left untouched.
    Rejected(MoveRejected),
    /// The move is on the board and persisted.
    Persisted {
        /// The moved task.
        task: Task,
        /// Revision published by the move.
        revision: u64,
    },
    /// The backend refused the move and the board was rolled back.
    RolledBack {
        /// The dragged task.
        task_id: TaskId,
        /// Why the backend refused.
        error: SyncError,
    },
}

/// Board synchronisation service for one project.
#[derive(Clone)]
pub struct BoardSynchronizer<A, N, C>
where
    A: BoardApi,
    N: Notifier,
    C: Clock + Send + Sync,
{
    project: ProjectId,
    api: Arc<A>,
    notifier: Arc<N>,
    clock: Arc<C>,
    store: BoardStore,
}

impl<A, N, C> BoardSynchronizer<A, N, C>
where
    A: BoardApi,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a synchroniser with an empty board.
    #[must_use]
    pub fn new(project: ProjectId, api: Arc<A>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            project,
            api,
            notifier,
            clock,
            store: BoardStore::new(),
        }
    }

    /// Returns the project this board belongs to.
    #[must_use]
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Returns the current board.
    #[must_use]
    pub fn board(&self) -> Board {
        self.store.board()
    }

    /// Fetches statuses and tasks and publishes the resulting board.
    ///
    /// Tasks embedded in status records are merged with the project task
    /// list; the project list wins for a task present in both. When the
    /// project list fails, the cross-project list is tried and only tasks
    /// whose status is one of the board's columns are kept. When both
    /// fail, the columns are still published and the error is carried in
    /// [`LoadReport::tasks_error`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Sync`] when the status list cannot be
    /// fetched; the board is left as it was.
    pub async fn load(&self) -> BoardResult<LoadReport> {
        let raw_statuses = match self.api.list_statuses().await {
            Ok(statuses) => statuses,
            Err(err) => {
                warn!(project = %self.project, error = %err, "status list failed to load");
                self.notify(NotificationLevel::Failure, "Could not load board", err.to_string());
                return Err(err.into());
            }
        };
        let statuses = normalize_statuses(raw_statuses);
        if statuses.skipped > 0 {
            warn!(skipped = statuses.skipped, "status records without identifier skipped");
        }
        let board = Board::initialize(statuses.statuses);
        let known: Vec<StatusId> = board.status_ids().cloned().collect();

        let mut records = statuses.embedded_tasks;
        let (task_source, tasks_error) = match self.fetch_tasks(&known).await {
            Ok((source, tasks)) => {
                records.extend(tasks);
                (source, None)
            }
            Err(err) => {
                warn!(project = %self.project, error = %err, "task list failed to load");
                self.notify(
                    NotificationLevel::Warning,
                    "Tasks could not be loaded",
                    err.to_string(),
                );
                (TaskSource::Unavailable, Some(err))
            }
        };

        let normalized = normalize_tasks(records, &known);
        let outcome = board.merge_tasks(normalized.tasks);
        let mut reassigned = normalized.reassigned;
        reassigned.extend(outcome.reassigned);
        for moved in &reassigned {
            warn!(task = %moved.task_id, from = %moved.from, to = %moved.to, "task with unknown status reassigned");
        }
        if !reassigned.is_empty() {
            self.notify(
                NotificationLevel::Warning,
                "Some tasks were moved",
                format!(
                    "{} task(s) referenced an unknown status and were placed in the first column",
                    reassigned.len()
                ),
            );
        }
        if !outcome.dropped.is_empty() {
            warn!(count = outcome.dropped.len(), "tasks dropped: board has no columns");
        }

        let snapshot = self.store.replace(outcome.board);
        info!(
            project = %self.project,
            revision = snapshot.revision,
            columns = snapshot.board.columns().len(),
            tasks = snapshot.board.task_count(),
            "board loaded"
        );
        Ok(LoadReport {
            revision: snapshot.revision,
            columns: snapshot.board.columns().len(),
            tasks: snapshot.board.task_count(),
            reassigned,
            dropped: outcome.dropped,
            skipped_statuses: statuses.skipped,
            task_source,
            tasks_error,
        })
    }

    /// Fetches the project task list, falling back to the cross-project
    /// list filtered to `known` statuses. Returns the fallback's error when
    /// both fail.
    async fn fetch_tasks(
        &self,
        known: &[StatusId],
    ) -> Result<(TaskSource, Vec<RawTask>), SyncError> {
        let project_err = match self.api.list_project_tasks(&self.project).await {
            Ok(tasks) => return Ok((TaskSource::Project, tasks)),
            Err(err) => err,
        };
        warn!(
            project = %self.project,
            error = %project_err,
            "project task list failed; trying the cross-project list"
        );
        let all = self.api.list_all_tasks().await?;
        let total = all.len();
        let kept: Vec<RawTask> = all
            .into_iter()
            .filter(|record| {
                record.status.as_ref().is_some_and(|status| {
                    let referenced = status.to_string();
                    known.iter().any(|id| id.as_str() == referenced)
                })
            })
            .collect();
        if kept.len() < total {
            debug!(skipped = total - kept.len(), "tasks outside the board's columns skipped");
        }
        Ok((TaskSource::AllTasks, kept))
    }

    /// Reconciles a finished drag.
    ///
    /// A valid move is shown immediately, then persisted. If the backend
    /// refuses it the move is undone and a failure notification raised.
    pub async fn drag_end(&self, gesture: &DragGesture) -> DragOutcome {
        if gesture.task_id.is_provisional() {
            return DragOutcome::Rejected(MoveRejected::Unsaved(gesture.task_id.clone()));
        }
        let tentative = match self.store.begin_move(gesture) {
            Ok(MoveStart::Ignored(reason)) => return DragOutcome::Ignored(reason),
            Ok(MoveStart::Applied(tentative)) => tentative,
            Err(rejected) => {
                debug!(task = %gesture.task_id, reason = %rejected, "drag rejected");
                return DragOutcome::Rejected(rejected);
            }
        };

        let request = UpdateTaskRequest::describing(&tentative.task, &self.project);
        debug!(task = %tentative.task.id(), from = %tentative.from, to = %tentative.to, "persisting move");
        match self.api.update_task(tentative.task.id(), &request).await {
            Ok(_) => {
                self.store.confirm_move(tentative.task.id());
                info!(task = %tentative.task.id(), to = %tentative.to, "move persisted");
                DragOutcome::Persisted {
                    task: tentative.task,
                    revision: tentative.revision,
                }
            }
            Err(error) => {
                let task_id = tentative.task.id().clone();
                self.store.revert_move(&task_id);
                warn!(task = %task_id, error = %error, "move rolled back");
                self.notify(NotificationLevel::Failure, "Could not move task", error.to_string());
                DragOutcome::RolledBack { task_id, error }
            }
        }
    }

    /// Creates a task at the end of `status`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] without calling the backend
    /// when the title is blank or the status is not on the board, and
    /// [`BoardServiceError::Sync`] when the backend refuses.
    pub async fn create_task(
        &self,
        status: &StatusId,
        title: &str,
        description: &str,
    ) -> BoardResult<Task> {
        let validated = TaskTitle::new(title)?;
        let board = self.store.board();
        if !board.contains_status(status) {
            return Err(BoardDomainError::UnknownStatus(status.clone()).into());
        }
        let request = CreateTaskRequest {
            name: validated.into_inner(),
            project: self.project.clone(),
            status: status.clone(),
            description: description.to_owned(),
        };
        let raw = self
            .api
            .create_task(&request)
            .await
            .map_err(|err| self.failed("Could not create task", err))?;

        let fallback = Task::new(TaskId::provisional(), request.name, status.clone())
            .with_content(request.description);
        let known: Vec<StatusId> = board.status_ids().cloned().collect();
        let created = normalize_task(backfilled(raw, &fallback), &known).task;
        let snapshot = self
            .store
            .try_update(|current| current.with_task_appended(created.clone()))?;
        info!(task = %created.id(), status = %created.status(), "task created");
        Ok(placed(&snapshot, created))
    }

    /// Edits a task and publishes the record the backend returns.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] when the task is not on the
    /// board or has no backend record, and [`BoardServiceError::Sync`] when
    /// the backend refuses; the board is unchanged in both cases.
    pub async fn edit_task(&self, task_id: &TaskId, edit: TaskEdit) -> BoardResult<Task> {
        let board = self.store.board();
        let current = board
            .task(task_id)
            .cloned()
            .ok_or_else(|| BoardDomainError::TaskNotFound(task_id.clone()))?;
        if task_id.is_provisional() {
            return Err(BoardDomainError::UnsavedTask(task_id.clone()).into());
        }
        if edit.is_empty() {
            return Ok(current);
        }
        let edited = current.edited(edit);
        let request = UpdateTaskRequest::describing(&edited, &self.project);
        let raw = self
            .api
            .update_task(task_id, &request)
            .await
            .map_err(|err| self.failed("Could not update task", err))?;

        let known: Vec<StatusId> = board.status_ids().cloned().collect();
        let stored = if raw.id.is_some() {
            normalize_task(backfilled(raw, &edited), &known).task
        } else {
            edited
        };
        let snapshot = self
            .store
            .try_update(|latest| latest.with_task_replaced(stored.clone()))?;
        info!(task = %task_id, "task updated");
        Ok(placed(&snapshot, stored))
    }

    /// Re-fetches one task and publishes the backend's record in place.
    ///
    /// Fields the record leaves out keep their current values. A status
    /// change moves the task to the end of its new column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] when the task is not on the
    /// board or has no backend record, and [`BoardServiceError::Sync`] when
    /// the fetch fails; the board is unchanged in both cases.
    pub async fn refresh_task(&self, task_id: &TaskId) -> BoardResult<Task> {
        let board = self.store.board();
        let current = board
            .task(task_id)
            .cloned()
            .ok_or_else(|| BoardDomainError::TaskNotFound(task_id.clone()))?;
        if task_id.is_provisional() {
            return Err(BoardDomainError::UnsavedTask(task_id.clone()).into());
        }
        let raw = self
            .api
            .get_task(task_id)
            .await
            .map_err(|err| self.failed("Could not refresh task", err))?;

        let mut record = backfilled(raw, &current);
        record.id = Some(RawId::Text(task_id.as_str().to_owned()));
        let known: Vec<StatusId> = board.status_ids().cloned().collect();
        let fetched = normalize_task(record, &known).task;
        let snapshot = self
            .store
            .try_update(|latest| latest.with_task_replaced(fetched.clone()))?;
        debug!(task = %task_id, status = %fetched.status(), "task refreshed");
        Ok(placed(&snapshot, fetched))
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] when the task is not on the
    /// board or has no backend record, and [`BoardServiceError::Sync`] when
    /// the backend refuses.
    pub async fn delete_task(&self, task_id: &TaskId) -> BoardResult<BoardSnapshot> {
        if self.store.board().task(task_id).is_none() {
            return Err(BoardDomainError::TaskNotFound(task_id.clone()).into());
        }
        if task_id.is_provisional() {
            return Err(BoardDomainError::UnsavedTask(task_id.clone()).into());
        }
        self.api
            .delete_task(task_id)
            .await
            .map_err(|err| self.failed("Could not delete task", err))?;
        info!(task = %task_id, "task deleted");
        Ok(self.store.update(|board| {
            board
                .without_task(task_id)
                .unwrap_or_else(|_| board.clone())
        }))
    }

    /// Creates a status appended as the last column.
    ///
    /// The backend type is derived from the name and the color defaults to
    /// [`DEFAULT_STATUS_COLOR`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] without calling the backend
    /// when the name is blank and [`BoardServiceError::Sync`] when the
    /// backend refuses.
    pub async fn create_status(&self, name: &str, color: Option<&str>) -> BoardResult<Status> {
        let validated = StatusName::new(name)?;
        let request = CreateStatusRequest {
            name: validated.as_str().to_owned(),
            kind: validated.kind_slug(),
            color: color.unwrap_or(DEFAULT_STATUS_COLOR).to_owned(),
            project: self.project.clone(),
            order: self.store.board().columns().len(),
        };
        self.persist_status(&request).await
    }

    /// Creates the default statuses of a new project in column order.
    ///
    /// # Errors
    ///
    /// Returns the first failure; statuses created before it stay on the
    /// board.
    pub async fn seed_default_statuses(&self) -> BoardResult<Vec<Status>> {
        let mut created = Vec::with_capacity(DEFAULT_STATUS_TEMPLATES.len());
        for (order, template) in DEFAULT_STATUS_TEMPLATES.iter().enumerate() {
            let request = CreateStatusRequest {
                name: template.name.to_owned(),
                kind: template.kind.to_owned(),
                color: template.color.to_owned(),
                project: self.project.clone(),
                order,
            };
            created.push(self.persist_status(&request).await?);
        }
        Ok(created)
    }

    /// Moves the column at `from` to `to`, optimistically.
    ///
    /// Status orders are renumbered in the new column order. Only the moved
    /// status is persisted; if the backend refuses, the column move is
    /// undone.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] when a position is outside the
    /// board and [`BoardServiceError::Sync`] after a rollback.
    pub async fn move_status(&self, from: usize, to: usize) -> BoardResult<BoardSnapshot> {
        if from == to {
            return Ok(self.store.snapshot());
        }
        let (before, applied) = self.store.move_column(from, to)?;
        let Some(moved) = applied.board.columns().get(to).map(|column| column.id().clone()) else {
            return Ok(applied);
        };
        let update = StatusOrderUpdate { order: to };
        match self.api.update_status_order(&moved, &update).await {
            Ok(()) => {
                info!(status = %moved, order = to, "column moved");
                Ok(self.store.snapshot())
            }
            Err(err) => {
                self.store.revert(before, applied.revision, |current| {
                    let position = current
                        .columns()
                        .iter()
                        .position(|column| column.id() == &moved)?;
                    current.with_column_moved(position, from).ok()
                });
                warn!(status = %moved, error = %err, "column move rolled back");
                Err(self.failed("Could not move column", err))
            }
        }
    }

    /// Renames a status, optimistically.
    ///
    /// The new name is shown at once and then persisted. If the backend
    /// refuses, the previous name is restored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] without calling the backend
    /// when the name is blank or the status is not on the board, and
    /// [`BoardServiceError::Sync`] after a rollback.
    pub async fn rename_status(&self, status: &StatusId, name: &str) -> BoardResult<Status> {
        let status_name = StatusName::new(name)?;
        let previous = self
            .store
            .board()
            .column(status)
            .map(|column| column.status().clone())
            .ok_or_else(|| BoardDomainError::UnknownStatus(status.clone()))?;
        if previous.name() == status_name.as_str() {
            return Ok(previous);
        }
        let renamed = previous.clone().renamed(&status_name);
        let (before, applied) = self.store.replace_status(renamed.clone())?;
        let update = StatusNameUpdate {
            name: status_name.as_str().to_owned(),
        };
        match self.api.update_status_name(status, &update).await {
            Ok(()) => {
                info!(status = %status, name = renamed.name(), "column renamed");
                Ok(renamed)
            }
            Err(err) => {
                self.store.revert(before, applied.revision, |current| {
                    current
                        .contains_status(status)
                        .then(|| current.with_status(previous.clone()))
                });
                warn!(status = %status, error = %err, "column rename rolled back");
                Err(self.failed("Could not rename column", err))
            }
        }
    }

    /// Deletes a status; its column and tasks leave the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] when the status is not on the
    /// board and [`BoardServiceError::Sync`] when the backend refuses.
    pub async fn delete_status(&self, status: &StatusId) -> BoardResult<BoardSnapshot> {
        if !self.store.board().contains_status(status) {
            return Err(BoardDomainError::UnknownStatus(status.clone()).into());
        }
        self.api
            .delete_status(status)
            .await
            .map_err(|err| self.failed("Could not delete column", err))?;
        info!(status = %status, "column deleted");
        Ok(self.store.update(|board| {
            board
                .without_status(status)
                .unwrap_or_else(|_| board.clone())
        }))
    }

    async fn persist_status(&self, request: &CreateStatusRequest) -> BoardResult<Status> {
        let raw = self
            .api
            .create_status(request)
            .await
            .map_err(|err| self.failed("Could not create column", err))?;
        let status = normalize_status(&backfilled_status(raw, request), request.order)
            .ok_or_else(|| {
                self.failed(
                    "Could not create column",
                    SyncError::invalid_body(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "created status has no identifier",
                    )),
                )
            })?;
        self.store.update(|board| board.with_status(status.clone()));
        info!(status = %status.id(), name = status.name(), "column created");
        Ok(status)
    }

    fn failed(&self, title: &str, err: SyncError) -> BoardServiceError {
        warn!(project = %self.project, error = %err, "{title}");
        self.notify(NotificationLevel::Failure, title, err.to_string());
        err.into()
    }

    fn notify(&self, level: NotificationLevel, title: &str, detail: String) {
        self.notifier.notify(Notification {
            level,
            title: title.to_owned(),
            detail,
            raised_at: self.clock.utc(),
        });
    }
}

/// Fills fields the backend left out of a task record from `fallback`.
fn backfilled(mut raw: RawTask, fallback: &Task) -> RawTask {
    if raw.id.is_none() && !fallback.id().is_provisional() {
        raw.id = Some(RawId::Text(fallback.id().as_str().to_owned()));
    }
    if raw.name.is_none() && raw.title.is_none() {
        raw.name = Some(fallback.title().to_owned());
    }
    if raw.description.is_none() && raw.content.is_none() {
        raw.description = Some(RawDescription::Text(fallback.content().to_owned()));
    }
    if raw.status.is_none() {
        raw.status = Some(RawId::Text(fallback.status().as_str().to_owned()));
    }
    if raw.due_at.is_none() {
        raw.due_at = fallback.due_at().map(|due| due.to_rfc3339());
    }
    if raw.assigned_to.is_none() {
        raw.assigned_to = fallback.assignee().map(RawId::from);
    }
    raw
}

/// Fills fields the backend left out of a status record from the request.
fn backfilled_status(mut raw: RawStatus, request: &CreateStatusRequest) -> RawStatus {
    raw.name.get_or_insert_with(|| request.name.clone());
    raw.kind.get_or_insert_with(|| request.kind.clone());
    raw.color.get_or_insert_with(|| request.color.clone());
    raw
}

/// Returns the task as published, falling back to the given value.
fn placed(snapshot: &BoardSnapshot, task: Task) -> Task {
    snapshot.board.task(task.id()).cloned().unwrap_or(task)
}
