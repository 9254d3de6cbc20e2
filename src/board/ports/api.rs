//! Backend sync client port.

use super::payload::{
    CreateStatusRequest, CreateTaskRequest, RawStatus, RawTask, StatusNameUpdate,
    StatusOrderUpdate, UpdateTaskRequest,
};
use crate::board::domain::{ProjectId, StatusId, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend calls.
pub type SyncResult<T> = Result<T, SyncError>;

/// Contract for the backend REST API owning statuses and tasks.
///
/// Implementations never retry: every failure is reported to the caller
/// immediately, which decides how to compensate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Lists every status visible to the caller.
    async fn list_statuses(&self) -> SyncResult<Vec<RawStatus>>;

    /// Lists the tasks of a project.
    async fn list_project_tasks(&self, project: &ProjectId) -> SyncResult<Vec<RawTask>>;

    /// Lists every task visible to the caller, across projects.
    async fn list_all_tasks(&self) -> SyncResult<Vec<RawTask>>;

    /// Reads one task record.
    async fn get_task(&self, task: &TaskId) -> SyncResult<RawTask>;

    /// Creates a task, returning the stored record.
    async fn create_task(&self, request: &CreateTaskRequest) -> SyncResult<RawTask>;

    /// Replaces a task's fields (edits and moves), returning the stored
    /// record. Backends that answer without a body yield an empty record.
    async fn update_task(&self, task: &TaskId, request: &UpdateTaskRequest)
    -> SyncResult<RawTask>;

    /// Deletes a task.
    async fn delete_task(&self, task: &TaskId) -> SyncResult<()>;

    /// Creates a status, returning the stored record.
    async fn create_status(&self, request: &CreateStatusRequest) -> SyncResult<RawStatus>;

    /// Changes a status's column order.
    async fn update_status_order(
        &self,
        status: &StatusId,
        update: &StatusOrderUpdate,
    ) -> SyncResult<()>;

    /// Renames a status.
    async fn update_status_name(
        &self,
        status: &StatusId,
        update: &StatusNameUpdate,
    ) -> SyncResult<()>;

    /// Deletes a status; the backend cascades to its tasks.
    async fn delete_status(&self, status: &StatusId) -> SyncResult<()>;
}

/// Errors returned by backend sync clients.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The request never completed (connection, timeout, transport).
    #[error("request did not complete: {0}")]
    Network(Arc<dyn std::error::Error + Send + Sync>),

    /// The request completed with a failure status.
    #[error("server responded with status {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response body could not be read.
    #[error("unreadable response body: {0}")]
    InvalidBody(Arc<dyn std::error::Error + Send + Sync>),

    /// The credential expired before the request was sent.
    #[error("access credential expired at {0}")]
    CredentialExpired(DateTime<Utc>),
}

impl SyncError {
    /// Wraps a transport failure.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Arc::new(err))
    }

    /// Wraps a body decoding failure.
    pub fn invalid_body(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidBody(Arc::new(err))
    }

    /// Returns `true` when the request never completed.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns the HTTP status of a server failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
