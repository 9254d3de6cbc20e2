//! Normalisation of backend records into board values.
//!
//! Nothing here fails. Missing or malformed fields degrade to defaults so a
//! single odd record never blocks the board from rendering.

use crate::board::domain::{
    Reassignment, Status, StatusId, StatusResolution, Task, TaskId, UNNAMED_STATUS,
    UNTITLED_TASK, resolve_status,
};
use crate::board::ports::{RawDescription, RawId, RawStatus, RawTask};
use chrono::{DateTime, NaiveDate, Utc};

/// A task record resolved against the known statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTask {
    /// The normalised task.
    pub task: Task,
    /// Set when the record's status is unknown and the task was placed in
    /// the fallback column.
    pub reassignment: Option<Reassignment>,
}

/// Task records resolved against the known statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTasks {
    /// Normalised tasks in input order.
    pub tasks: Vec<Task>,
    /// Tasks moved to the fallback column.
    pub reassigned: Vec<Reassignment>,
}

/// Status records with the tasks they embed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedStatuses {
    /// Statuses that can own a column, in response order.
    pub statuses: Vec<Status>,
    /// Task records embedded in the status records, each carrying its
    /// owning status.
    pub embedded_tasks: Vec<RawTask>,
    /// Number of records skipped because they carry no identifier.
    pub skipped: usize,
}

/// Normalises one task record.
///
/// The title comes from `name`, then `title`, then [`UNTITLED_TASK`]. The
/// description may be plain text or `{details}`; any other shape is empty.
/// A record without an identifier gets a provisional one. A status that is
/// not among `known` resolves to the first known status.
#[must_use]
pub fn normalize_task(raw: RawTask, known: &[StatusId]) -> NormalizedTask {
    let id = raw
        .id
        .map_or_else(TaskId::provisional, |id| TaskId::new(id.to_string()));
    let title = present(raw.name)
        .or_else(|| present(raw.title))
        .unwrap_or_else(|| UNTITLED_TASK.to_owned());
    let content = description_text(raw.description.or(raw.content));
    let referenced = raw
        .status
        .map_or_else(|| StatusId::new(""), |status| StatusId::new(status.to_string()));
    let index = raw.order.or(raw.index).map_or(0, non_negative);

    let (status, reassignment) = match resolve_status(&referenced, known) {
        StatusResolution::Fallback(position) => match known.get(position) {
            Some(target) => (
                target.clone(),
                Some(Reassignment {
                    task_id: id.clone(),
                    from: referenced,
                    to: target.clone(),
                }),
            ),
            None => (referenced, None),
        },
        StatusResolution::Known(_) | StatusResolution::Unplaceable => (referenced, None),
    };

    let task = Task::new(id, title, status)
        .with_content(content)
        .with_index(index)
        .with_due_at(raw.due_at.as_deref().and_then(parse_due_date))
        .with_assignee(raw.assigned_to.map(|assignee| assignee.to_string()));
    NormalizedTask { task, reassignment }
}

/// Normalises a batch of task records, collecting reassignments.
#[must_use]
pub fn normalize_tasks(raw: impl IntoIterator<Item = RawTask>, known: &[StatusId]) -> NormalizedTasks {
    raw.into_iter()
        .map(|record| normalize_task(record, known))
        .fold(NormalizedTasks::default(), |mut acc, normalized| {
            acc.tasks.push(normalized.task);
            acc.reassigned.extend(normalized.reassignment);
            acc
        })
}

/// Normalises one status record found at `position` in its response.
///
/// Returns `None` for a record without an identifier, which cannot own a
/// column.
#[must_use]
pub fn normalize_status(raw: &RawStatus, position: usize) -> Option<Status> {
    let id = raw.id.as_ref()?;
    let name = present(raw.name.clone()).unwrap_or_else(|| UNNAMED_STATUS.to_owned());
    let order = raw.order.map_or(position, non_negative);
    let mut status = Status::new(StatusId::new(id.to_string()), name, order);
    if let Some(color) = raw.color.clone() {
        status = status.with_color(color);
    }
    if let Some(kind) = raw.kind.clone() {
        status = status.with_kind(kind);
    }
    Some(status)
}

/// Normalises a status list response, lifting out embedded tasks.
///
/// Embedded tasks come from `cards`, or `tasks` when `cards` is empty or
/// absent. Embedded records without a status are attributed to the status
/// embedding them.
#[must_use]
pub fn normalize_statuses(raw: Vec<RawStatus>) -> NormalizedStatuses {
    let mut normalized = NormalizedStatuses::default();
    for (position, mut record) in raw.into_iter().enumerate() {
        let Some(status) = normalize_status(&record, position) else {
            normalized.skipped += 1;
            continue;
        };
        let embedded = match (record.cards.take(), record.tasks.take()) {
            (Some(cards), _) if !cards.is_empty() => cards,
            (_, Some(tasks)) => tasks,
            _ => Vec::new(),
        };
        let owner = RawId::Text(status.id().as_str().to_owned());
        normalized
            .embedded_tasks
            .extend(embedded.into_iter().map(|mut task| {
                task.status.get_or_insert_with(|| owner.clone());
                task
            }));
        normalized.statuses.push(status);
    }
    normalized
}

/// Parses a backend due date: RFC 3339, or a bare `YYYY-MM-DD` taken as
/// midnight UTC.
#[must_use]
pub fn parse_due_date(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc())
        })
}

fn description_text(description: Option<RawDescription>) -> String {
    match description {
        Some(RawDescription::Text(text) | RawDescription::Wrapped { details: text }) => text,
        Some(RawDescription::Other(_)) | None => String::new(),
    }
}

fn present(text: Option<String>) -> Option<String> {
    text.filter(|value| !value.trim().is_empty())
}

fn non_negative(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
