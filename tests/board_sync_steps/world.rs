//! Shared world state for board synchronisation BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use trellis::board::{
    adapters::memory::{InMemoryBoardApi, RecordingNotifier},
    domain::{Board, ProjectId, Task},
    ports::{RawStatus, RawTask},
    services::{BoardResult, BoardSynchronizer, DragOutcome},
};

/// Synchroniser type used by the BDD world.
pub type TestSync = BoardSynchronizer<InMemoryBoardApi, RecordingNotifier, DefaultClock>;

/// Client side of a scenario, wired once the board is first loaded.
pub struct Client {
    pub api: InMemoryBoardApi,
    pub notifier: Arc<RecordingNotifier>,
    pub sync: TestSync,
}

/// Scenario world for board synchronisation behaviour tests.
#[derive(Default)]
pub struct BoardWorld {
    pub statuses: Vec<RawStatus>,
    pub tasks: Vec<RawTask>,
    pub client: Option<Client>,
    pub board_before: Option<Board>,
    pub last_drag: Option<DragOutcome>,
    pub last_create: Option<BoardResult<Task>>,
}

impl BoardWorld {
    /// Returns the wired client, failing when no board was loaded yet.
    ///
    /// # Errors
    ///
    /// Returns an error before the board has been loaded.
    pub fn client(&self) -> Result<&Client, eyre::Report> {
        self.client
            .as_ref()
            .ok_or_else(|| eyre::eyre!("board not loaded in scenario world"))
    }

    /// Seeds the backend from the given records and loads the board.
    ///
    /// # Errors
    ///
    /// Returns an error when the load fails.
    pub fn load(&mut self) -> Result<(), eyre::Report> {
        let api = InMemoryBoardApi::seeded(self.statuses.clone(), self.tasks.clone());
        let notifier = Arc::new(RecordingNotifier::new());
        let sync = BoardSynchronizer::new(
            ProjectId::new("p1"),
            Arc::new(api.clone()),
            Arc::clone(&notifier),
            Arc::new(DefaultClock),
        );
        run_async(sync.load())?;
        self.board_before = Some(sync.board());
        self.client = Some(Client {
            api,
            notifier,
            sync,
        });
        Ok(())
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
