//! In-memory adapters for tests and local experiments.

mod api;
mod notifier;

pub use api::{ApiCall, Endpoint, InMemoryBoardApi, InjectedFailure};
pub use notifier::RecordingNotifier;
