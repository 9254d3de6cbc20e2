//! Shared test helpers for in-memory backend integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use trellis::board::{
    adapters::memory::{InMemoryBoardApi, RecordingNotifier},
    domain::{Board, ProjectId, StatusId},
    ports::{RawStatus, RawTask},
    services::BoardSynchronizer,
};

/// Synchroniser type used by the in-memory tests.
pub type TestSync = BoardSynchronizer<InMemoryBoardApi, RecordingNotifier, DefaultClock>;

/// Backend plus a synchroniser and notifier wired to it.
pub struct Setup {
    pub api: InMemoryBoardApi,
    pub notifier: Arc<RecordingNotifier>,
    pub sync: TestSync,
}

impl Setup {
    /// Wires a synchroniser for project `p1` to `api`.
    #[must_use]
    pub fn over(api: InMemoryBoardApi) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let sync = BoardSynchronizer::new(
            ProjectId::new("p1"),
            Arc::new(api.clone()),
            Arc::clone(&notifier),
            Arc::new(DefaultClock),
        );
        Self {
            api,
            notifier,
            sync,
        }
    }

    /// A second synchroniser sharing this backend, as another client would.
    #[must_use]
    pub fn another_client(&self) -> Self {
        Self::over(self.api.clone())
    }
}

/// Backend with a three-column board and four tasks.
#[fixture]
pub fn populated() -> Setup {
    Setup::over(InMemoryBoardApi::seeded(
        [
            RawStatus::named("todo", "To Do", 0),
            RawStatus::named("doing", "In Progress", 1),
            RawStatus::named("done", "Done", 2),
        ],
        [
            RawTask::titled("a", "Write docs", "todo").with_order(0),
            RawTask::titled("b", "Fix login", "todo").with_order(1),
            RawTask::titled("c", "Deploy", "doing").with_order(0),
            RawTask::titled("d", "Kick-off", "done").with_order(0),
        ],
    ))
}

/// Backend with no records at all.
#[fixture]
pub fn empty() -> Setup {
    Setup::over(InMemoryBoardApi::new())
}

/// Task titles of one column, in order.
#[must_use]
pub fn titles_in(board: &Board, status: &StatusId) -> Vec<String> {
    board
        .column(status)
        .map(|column| {
            column
                .tasks()
                .iter()
                .map(|task| task.title().to_owned())
                .collect()
        })
        .unwrap_or_default()
}
