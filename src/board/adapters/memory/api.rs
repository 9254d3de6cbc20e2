//! In-memory backend for board service tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::board::{
    domain::{ProjectId, StatusId, TaskId},
    ports::{
        BoardApi, CreateStatusRequest, CreateTaskRequest, RawDescription, RawId, RawStatus,
        RawTask, StatusNameUpdate, StatusOrderUpdate, SyncError, SyncResult, UpdateTaskRequest,
    },
};

/// A failure the next backend call should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// The request never completes.
    Network,
    /// The request completes with this HTTP status.
    Server(u16),
}

impl InjectedFailure {
    fn into_error(self) -> SyncError {
        match self {
            Self::Network => SyncError::network(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "injected network failure",
            )),
            Self::Server(status) => SyncError::Server {
                status,
                message: "injected server failure".to_owned(),
            },
        }
    }
}

/// Backend operation targeted by an injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET` status list.
    ListStatuses,
    /// `GET` project task list.
    ListProjectTasks,
    /// `GET` task list across projects.
    ListAllTasks,
    /// `GET` one task.
    GetTask,
    /// `POST` task creation.
    CreateTask,
    /// `PUT` task update.
    UpdateTask,
    /// `DELETE` task.
    DeleteTask,
    /// `POST` status creation.
    CreateStatus,
    /// `POST` status order update.
    UpdateStatusOrder,
    /// `POST` status rename.
    UpdateStatusName,
    /// `DELETE` status.
    DeleteStatus,
}

/// A call received by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET` status list.
    ListStatuses,
    /// `GET` project task list.
    ListProjectTasks(ProjectId),
    /// `GET` task list across projects.
    ListAllTasks,
    /// `GET` one task.
    GetTask(TaskId),
    /// `POST` task creation.
    CreateTask(CreateTaskRequest),
    /// `PUT` task update.
    UpdateTask(TaskId, UpdateTaskRequest),
    /// `DELETE` task.
    DeleteTask(TaskId),
    /// `POST` status creation.
    CreateStatus(CreateStatusRequest),
    /// `POST` status order update.
    UpdateStatusOrder(StatusId, StatusOrderUpdate),
    /// `POST` status rename.
    UpdateStatusName(StatusId, StatusNameUpdate),
    /// `DELETE` status.
    DeleteStatus(StatusId),
}

impl ApiCall {
    /// Returns the operation this call targets.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::ListStatuses => Endpoint::ListStatuses,
            Self::ListProjectTasks(_) => Endpoint::ListProjectTasks,
            Self::ListAllTasks => Endpoint::ListAllTasks,
            Self::GetTask(_) => Endpoint::GetTask,
            Self::CreateTask(_) => Endpoint::CreateTask,
            Self::UpdateTask(..) => Endpoint::UpdateTask,
            Self::DeleteTask(_) => Endpoint::DeleteTask,
            Self::CreateStatus(_) => Endpoint::CreateStatus,
            Self::UpdateStatusOrder(..) => Endpoint::UpdateStatusOrder,
            Self::UpdateStatusName(..) => Endpoint::UpdateStatusName,
            Self::DeleteStatus(_) => Endpoint::DeleteStatus,
        }
    }
}

/// Thread-safe in-memory stand-in for the backend REST API.
///
/// Holds the records of a single project, plus tasks of other projects that
/// only the cross-project task list returns. Every call is recorded, and a
/// queued failure is reported by the next call to its endpoint.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardApi {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    statuses: Vec<RawStatus>,
    tasks: Vec<RawTask>,
    foreign_tasks: Vec<RawTask>,
    next_id: u64,
    failures: Vec<(Endpoint, InjectedFailure)>,
    calls: Vec<ApiCall>,
}

impl InMemoryBoardState {
    fn allocate_id(&mut self, prefix: &str) -> RawId {
        self.next_id += 1;
        RawId::Text(format!("{prefix}-{}", self.next_id))
    }

    fn task_mut(&mut self, task: &TaskId) -> Option<&mut RawTask> {
        self.tasks.iter_mut().find(|record| matches_id(record.id.as_ref(), task.as_str()))
    }

    fn status_mut(&mut self, status: &StatusId) -> Option<&mut RawStatus> {
        self.statuses
            .iter_mut()
            .find(|record| matches_id(record.id.as_ref(), status.as_str()))
    }
}

fn matches_id(id: Option<&RawId>, expected: &str) -> bool {
    id.is_some_and(|value| value.to_string() == expected)
}

fn not_found(what: &str) -> SyncError {
    SyncError::Server {
        status: 404,
        message: format!("{what} not found"),
    }
}

fn lock_error(err: impl std::fmt::Display) -> SyncError {
    SyncError::network(std::io::Error::other(err.to_string()))
}

impl InMemoryBoardApi {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding the given records.
    #[must_use]
    pub fn seeded(
        statuses: impl IntoIterator<Item = RawStatus>,
        tasks: impl IntoIterator<Item = RawTask>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryBoardState {
                statuses: statuses.into_iter().collect(),
                tasks: tasks.into_iter().collect(),
                ..InMemoryBoardState::default()
            })),
        }
    }

    /// Stores tasks belonging to other projects. They are returned only by
    /// the cross-project task list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] when the state lock is poisoned.
    pub fn add_foreign_tasks(&self, tasks: impl IntoIterator<Item = RawTask>) -> SyncResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .foreign_tasks
            .extend(tasks);
        Ok(())
    }

    /// Queues a failure for the next call to `endpoint`. Failures queued
    /// for the same endpoint are reported in order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] when the state lock is poisoned.
    pub fn fail_next(&self, endpoint: Endpoint, failure: InjectedFailure) -> SyncResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .failures
            .push((endpoint, failure));
        Ok(())
    }

    /// Returns every call received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] when the state lock is poisoned.
    pub fn calls(&self) -> SyncResult<Vec<ApiCall>> {
        Ok(self.state.read().map_err(lock_error)?.calls.clone())
    }

    /// Returns the stored task records.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] when the state lock is poisoned.
    pub fn tasks(&self) -> SyncResult<Vec<RawTask>> {
        Ok(self.state.read().map_err(lock_error)?.tasks.clone())
    }

    /// Returns the stored status records.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] when the state lock is poisoned.
    pub fn statuses(&self) -> SyncResult<Vec<RawStatus>> {
        Ok(self.state.read().map_err(lock_error)?.statuses.clone())
    }

    /// Records `call`, then runs `operation` unless a failure is queued.
    fn handle<T>(
        &self,
        call: ApiCall,
        operation: impl FnOnce(&mut InMemoryBoardState) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let mut state = self.state.write().map_err(lock_error)?;
        let endpoint = call.endpoint();
        state.calls.push(call);
        if let Some(position) = state
            .failures
            .iter()
            .position(|(target, _)| *target == endpoint)
        {
            let (_, failure) = state.failures.remove(position);
            return Err(failure.into_error());
        }
        operation(&mut *state)
    }
}

#[async_trait]
impl BoardApi for InMemoryBoardApi {
    async fn list_statuses(&self) -> SyncResult<Vec<RawStatus>> {
        self.handle(ApiCall::ListStatuses, |state| Ok(state.statuses.clone()))
    }

    async fn list_project_tasks(&self, project: &ProjectId) -> SyncResult<Vec<RawTask>> {
        self.handle(ApiCall::ListProjectTasks(project.clone()), |state| {
            Ok(state.tasks.clone())
        })
    }

    async fn list_all_tasks(&self) -> SyncResult<Vec<RawTask>> {
        self.handle(ApiCall::ListAllTasks, |state| {
            Ok(state
                .tasks
                .iter()
                .chain(&state.foreign_tasks)
                .cloned()
                .collect())
        })
    }

    async fn get_task(&self, task: &TaskId) -> SyncResult<RawTask> {
        self.handle(ApiCall::GetTask(task.clone()), |state| {
            state
                .tasks
                .iter()
                .find(|record| matches_id(record.id.as_ref(), task.as_str()))
                .cloned()
                .ok_or_else(|| not_found("Task"))
        })
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> SyncResult<RawTask> {
        self.handle(ApiCall::CreateTask(request.clone()), |state| {
            let status = request.status.as_str();
            let order = state
                .tasks
                .iter()
                .filter(|record| matches_id(record.status.as_ref(), status))
                .count();
            let record = RawTask {
                id: Some(state.allocate_id("task")),
                name: Some(request.name.clone()),
                description: Some(RawDescription::Text(request.description.clone())),
                status: Some(RawId::from(status)),
                order: i64::try_from(order).ok(),
                ..RawTask::default()
            };
            state.tasks.push(record.clone());
            Ok(record)
        })
    }

    async fn update_task(
        &self,
        task: &TaskId,
        request: &UpdateTaskRequest,
    ) -> SyncResult<RawTask> {
        self.handle(ApiCall::UpdateTask(task.clone(), request.clone()), |state| {
            let record = state.task_mut(task).ok_or_else(|| not_found("Task"))?;
            record.name = Some(request.name.clone());
            record.title = None;
            record.description = Some(RawDescription::Text(request.description.clone()));
            record.content = None;
            record.status = Some(RawId::from(request.status.as_str()));
            record.order = i64::try_from(request.order).ok();
            record.due_at = request.due_at.map(|due| due.to_rfc3339());
            record.assigned_to = request.assigned_to.as_deref().map(RawId::from);
            Ok(record.clone())
        })
    }

    async fn delete_task(&self, task: &TaskId) -> SyncResult<()> {
        self.handle(ApiCall::DeleteTask(task.clone()), |state| {
            let before = state.tasks.len();
            state
                .tasks
                .retain(|record| !matches_id(record.id.as_ref(), task.as_str()));
            if state.tasks.len() == before {
                return Err(not_found("Task"));
            }
            Ok(())
        })
    }

    async fn create_status(&self, request: &CreateStatusRequest) -> SyncResult<RawStatus> {
        self.handle(ApiCall::CreateStatus(request.clone()), |state| {
            let record = RawStatus {
                id: Some(state.allocate_id("status")),
                name: Some(request.name.clone()),
                order: i64::try_from(request.order).ok(),
                kind: Some(request.kind.clone()),
                color: Some(request.color.clone()),
                ..RawStatus::default()
            };
            state.statuses.push(record.clone());
            Ok(record)
        })
    }

    async fn update_status_order(
        &self,
        status: &StatusId,
        update: &StatusOrderUpdate,
    ) -> SyncResult<()> {
        self.handle(ApiCall::UpdateStatusOrder(status.clone(), *update), |state| {
            let record = state.status_mut(status).ok_or_else(|| not_found("Status"))?;
            record.order = i64::try_from(update.order).ok();
            Ok(())
        })
    }

    async fn update_status_name(
        &self,
        status: &StatusId,
        update: &StatusNameUpdate,
    ) -> SyncResult<()> {
        self.handle(
            ApiCall::UpdateStatusName(status.clone(), update.clone()),
            |state| {
                let record = state.status_mut(status).ok_or_else(|| not_found("Status"))?;
                record.name = Some(update.name.clone());
                Ok(())
            },
        )
    }

    async fn delete_status(&self, status: &StatusId) -> SyncResult<()> {
        self.handle(ApiCall::DeleteStatus(status.clone()), |state| {
            if state.status_mut(status).is_none() {
                return Err(not_found("Status"));
            }
            state
                .statuses
                .retain(|record| !matches_id(record.id.as_ref(), status.as_str()));
            state
                .tasks
                .retain(|record| !matches_id(record.status.as_ref(), status.as_str()));
            Ok(())
        })
    }
}
