//! Backend route table.
//!
//! Identifiers are percent-encoded as single path segments, so an id holding
//! `/`, `?` or `#` cannot reach another route.

use crate::board::domain::{ProjectId, StatusId, TaskId};
use percent_encoding::{AsciiSet, CONTROLS, PercentEncode, utf8_percent_encode};

/// Bytes escaped inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Lists every status.
pub const STATUS_LIST: &str = "/api/v1/project/status/";

/// Creates a status.
pub const STATUS_CREATE: &str = "/api/v1/project/status/create/";

/// Lists every task across projects.
pub const TASK_LIST: &str = "/api/v1/project/task/";

/// Creates a task.
pub const TASK_CREATE: &str = "/api/v1/project/task/create/";

fn segment(id: &str) -> PercentEncode<'_> {
    utf8_percent_encode(id, SEGMENT)
}

/// Lists the tasks of a project.
#[must_use]
pub fn project_tasks(project: &ProjectId) -> String {
    format!("/api/v1/project/project/{}/tasks/", segment(project.as_str()))
}

/// Reads one task.
#[must_use]
pub fn task_detail(task: &TaskId) -> String {
    format!("/api/v1/project/task/{}/", segment(task.as_str()))
}

/// Updates a task (edit or move).
#[must_use]
pub fn task_update(task: &TaskId) -> String {
    format!("/api/v1/project/task/{}/update/", segment(task.as_str()))
}

/// Deletes a task.
#[must_use]
pub fn task_delete(task: &TaskId) -> String {
    format!("/api/v1/project/task/{}/delete/", segment(task.as_str()))
}

/// Changes a status's column order or name.
#[must_use]
pub fn status_update(status: &StatusId) -> String {
    format!("/api/v1/project/status/{}/update/", segment(status.as_str()))
}

/// Deletes a status.
#[must_use]
pub fn status_delete(status: &StatusId) -> String {
    format!("/api/v1/project/status/{}/", segment(status.as_str()))
}
