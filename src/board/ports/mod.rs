//! Port contracts for board synchronisation.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod api;
pub mod notifier;
pub mod payload;

pub use api::{BoardApi, SyncError, SyncResult};
pub use notifier::{Notification, NotificationLevel, Notifier};
pub use payload::{
    CreateStatusRequest, CreateTaskRequest, RawDescription, RawId, RawStatus, RawTask,
    StatusNameUpdate, StatusOrderUpdate, UpdateTaskRequest, status_records, task_records,
};

#[cfg(test)]
pub use api::MockBoardApi;
