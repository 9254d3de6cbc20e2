//! Adapters for the board ports.
//!
//! - [`http::HttpBoardApi`]: the backend REST API over reqwest
//! - [`memory::InMemoryBoardApi`]: an in-memory backend with failure
//!   injection for tests
//! - [`notify::TracingNotifier`]: notifications as log events

pub mod http;
pub mod memory;
pub mod notify;
