//! Identifier types for the board domain.
//!
//! The backend owns identifier allocation, so identifiers are opaque strings
//! on this side of the wire. Numeric identifiers are canonicalised to their
//! decimal form by the normalizer before they reach these types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix used for identifiers minted locally when the backend omitted one.
pub const PROVISIONAL_TASK_PREFIX: &str = "temp-";

/// Number of UUID characters kept in a provisional identifier.
const PROVISIONAL_SUFFIX_LEN: usize = 9;

/// Identifier of a workflow status (board column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

impl StatusId {
    /// Wraps a backend status identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StatusId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for StatusId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for StatusId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a task (board card).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a backend task identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mints a local identifier for a task record that arrived without one.
    ///
    /// Provisional identifiers are never sent back to the backend as the
    /// target of a mutation; see [`TaskId::is_provisional`].
    #[must_use]
    pub fn provisional() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        let suffix: String = simple.chars().take(PROVISIONAL_SUFFIX_LEN).collect();
        Self(format!("{PROVISIONAL_TASK_PREFIX}{suffix}"))
    }

    /// Returns `true` when the identifier was minted locally.
    #[must_use]
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_TASK_PREFIX)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the project whose board is being synchronised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Wraps a backend project identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
