//! Workflow status (board column) values.

use super::{BoardDomainError, StatusId};
use serde::{Deserialize, Serialize};

/// Display name given to statuses that arrive without one.
pub const UNNAMED_STATUS: &str = "Unnamed Status";

/// Color assigned to statuses created without an explicit one.
pub const DEFAULT_STATUS_COLOR: &str = "#3498db";

/// One workflow column.
///
/// `order` defines left-to-right column order. `color` and `kind` are
/// presentational and carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    id: StatusId,
    name: String,
    order: usize,
    color: Option<String>,
    kind: Option<String>,
}

impl Status {
    /// Creates a status with the given identifier, display name and order.
    #[must_use]
    pub fn new(id: StatusId, name: impl Into<String>, order: usize) -> Self {
        Self {
            id,
            name: name.into(),
            order,
            color: None,
            kind: None,
        }
    }

    /// Sets the presentational color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the backend status type slug.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Returns a copy placed at a different column order.
    #[must_use]
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Returns a copy carrying a validated new display name.
    #[must_use]
    pub fn renamed(mut self, name: &StatusName) -> Self {
        self.name = name.as_str().to_owned();
        self
    }

    /// Returns the status identifier.
    #[must_use]
    pub const fn id(&self) -> &StatusId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column order.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns the presentational color, if any.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Returns the backend status type slug, if any.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

/// Validated, trimmed status name used when creating or renaming a status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusName(String);

impl StatusName {
    /// Validates a user-supplied status name.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyStatusName`] when the name is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, BoardDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyStatusName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the trimmed name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the backend type slug: lower-case, whitespace runs as `_`.
    #[must_use]
    pub fn kind_slug(&self) -> String {
        self.0
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Blueprint for a status seeded when a project is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTemplate {
    /// Display name.
    pub name: &'static str,
    /// Backend type slug.
    pub kind: &'static str,
    /// Presentational color.
    pub color: &'static str,
}

/// Statuses every new project starts with, in column order.
pub const DEFAULT_STATUS_TEMPLATES: [StatusTemplate; 3] = [
    StatusTemplate {
        name: "To Do",
        kind: "todo",
        color: "#3498db",
    },
    StatusTemplate {
        name: "In Progress",
        kind: "in_progress",
        color: "#f39c12",
    },
    StatusTemplate {
        name: "Done",
        kind: "done",
        color: "#2ecc71",
    },
];
