//! Wire shapes exchanged with the backend REST API.
//!
//! Inbound records (`Raw*`) are deliberately forgiving: every field is
//! optional and a field of unexpected JSON type reads as absent. The
//! normalizer turns them into domain values. Outbound request bodies mirror
//! the backend's field names exactly.

use crate::board::domain::{ProjectId, StatusId, Task};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Reads a field, treating any value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Identifier as sent by the backend: a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// String identifier.
    Text(String),
    /// Numeric identifier.
    Number(serde_json::Number),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Task description as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDescription {
    /// Plain text.
    Text(String),
    /// Rich-text wrapper carrying the text under `details`.
    Wrapped {
        /// The wrapped text.
        details: String,
    },
    /// Any other shape; reads as empty text.
    Other(Value),
}

/// Task record as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTask {
    /// Task identifier.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Title under its backend name.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Title under its alternative name.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description, plain or wrapped.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<RawDescription>,
    /// Description under its alternative name.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content: Option<RawDescription>,
    /// Owning status identifier.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<RawId>,
    /// Position within the owning column.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Position under its alternative name.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Due date text.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    /// Assignee identifier.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<RawId>,
}

impl RawTask {
    /// Creates a record with an identifier, a title and a status.
    #[must_use]
    pub fn titled(id: &str, name: &str, status: &str) -> Self {
        Self {
            id: Some(RawId::from(id)),
            name: Some(name.to_owned()),
            status: Some(RawId::from(status)),
            ..Self::default()
        }
    }

    /// Sets the position within the owning column.
    #[must_use]
    pub const fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets a plain-text description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(RawDescription::Text(description.to_owned()));
        self
    }
}

/// Status record as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStatus {
    /// Status identifier.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Display name.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Column order.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Backend type slug.
    #[serde(
        rename = "type",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    /// Presentational color.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Tasks embedded in the status record.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<RawTask>>,
    /// Tasks embedded under the alternative name.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<RawTask>>,
}

impl RawStatus {
    /// Creates a record with an identifier, a name and a column order.
    #[must_use]
    pub fn named(id: &str, name: &str, order: i64) -> Self {
        Self {
            id: Some(RawId::from(id)),
            name: Some(name.to_owned()),
            order: Some(order),
            ..Self::default()
        }
    }
}

/// Extracts task records from a list response.
///
/// Accepts a bare array or an object with a `tasks` array. Elements that
/// are not JSON objects are skipped; any other body yields no records.
#[must_use]
pub fn task_records(body: Value) -> Vec<RawTask> {
    records(body, "tasks")
}

/// Extracts status records from a list response.
///
/// Accepts a bare array or an object with a `statuses` array.
#[must_use]
pub fn status_records(body: Value) -> Vec<RawStatus> {
    records(body, "statuses")
}

fn records<T: DeserializeOwned>(body: Value, envelope_key: &str) -> Vec<T> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove(envelope_key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Body of `POST /api/v1/project/task/create/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title.
    pub name: String,
    /// Owning project.
    pub project: ProjectId,
    /// Owning status.
    pub status: StatusId,
    /// Description text.
    pub description: String,
}

/// Body of `PUT /api/v1/project/task/{id}/update/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    /// Task title.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Owning project.
    pub project: ProjectId,
    /// Owning status.
    pub status: StatusId,
    /// Position within the owning column.
    pub order: usize,
    /// Due date.
    pub due_at: Option<DateTime<Utc>>,
    /// Assignee identifier.
    pub assigned_to: Option<String>,
}

impl UpdateTaskRequest {
    /// Builds the full update body describing `task` as it now stands.
    #[must_use]
    pub fn describing(task: &Task, project: &ProjectId) -> Self {
        Self {
            name: task.title().to_owned(),
            description: task.content().to_owned(),
            project: project.clone(),
            status: task.status().clone(),
            order: task.index(),
            due_at: task.due_at(),
            assigned_to: task.assignee().map(str::to_owned),
        }
    }
}

/// Body of `POST /api/v1/project/status/create/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStatusRequest {
    /// Display name.
    pub name: String,
    /// Backend type slug.
    #[serde(rename = "type")]
    pub kind: String,
    /// Presentational color.
    pub color: String,
    /// Owning project.
    pub project: ProjectId,
    /// Column order.
    pub order: usize,
}

/// Body of `POST /api/v1/project/status/{id}/update/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOrderUpdate {
    /// New column order.
    pub order: usize,
}

/// Rename body of `POST /api/v1/project/status/{id}/update/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNameUpdate {
    /// New display name.
    pub name: String,
}
