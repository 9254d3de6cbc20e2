//! Task (board card) values.

use super::{BoardDomainError, StatusId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to tasks that arrive without one.
pub const UNTITLED_TASK: &str = "Untitled Task";

/// One unit of work, owned by exactly one status at a time.
///
/// `index` is the position within the owning column. Values are immutable:
/// every change goes through a consuming `with_*` method that returns the
/// updated task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    content: String,
    status: StatusId,
    index: usize,
    due_at: Option<DateTime<Utc>>,
    assignee: Option<String>,
}

impl Task {
    /// Creates a task with empty content at index zero.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, status: StatusId) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            status,
            index: 0,
            due_at: None,
            assignee: None,
        }
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the position within the owning column.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Reassigns the task to another status.
    #[must_use]
    pub fn with_status(mut self, status: StatusId) -> Self {
        self.status = status;
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub fn with_due_at(mut self, due_at: Option<DateTime<Utc>>) -> Self {
        self.due_at = due_at;
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = assignee;
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the plain-text description.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the owning status.
    #[must_use]
    pub const fn status(&self) -> &StatusId {
        &self.status
    }

    /// Returns the position within the owning column.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the assignee identifier, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    /// Applies an edit, leaving untouched fields as they are.
    #[must_use]
    pub fn edited(self, edit: TaskEdit) -> Self {
        let TaskEdit {
            title,
            content,
            due_at,
            assignee,
        } = edit;
        Self {
            title: title.map_or(self.title, TaskTitle::into_inner),
            content: content.unwrap_or(self.content),
            due_at: due_at.unwrap_or(self.due_at),
            assignee: assignee.unwrap_or(self.assignee),
            ..self
        }
    }
}

/// Validated, trimmed task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Validates a user-supplied title.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskTitle`] when the title is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, BoardDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyTaskTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the trimmed title.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the title, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Partial update to a task's editable fields.
///
/// `None` leaves a field untouched; for the optional fields `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    title: Option<TaskTitle>,
    content: Option<String>,
    due_at: Option<Option<DateTime<Utc>>>,
    assignee: Option<Option<String>>,
}

impl TaskEdit {
    /// Creates an edit that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub fn due_at(mut self, due_at: Option<DateTime<Utc>>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub fn assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Returns `true` when the edit changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.due_at.is_none()
            && self.assignee.is_none()
    }
}
