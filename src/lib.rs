//! Trellis: a kanban board client for a project-management REST backend.
//!
//! The crate keeps a client-side board (statuses as columns, each holding
//! its ordered tasks) in step with the backend that owns the records. Drag
//! moves are applied optimistically and rolled back when the backend
//! refuses them.
//!
//! # Architecture
//!
//! Trellis follows hexagonal architecture principles:
//!
//! - **Domain**: Pure board values and transitions
//! - **Ports**: Abstract trait interfaces for the backend and notifications
//! - **Adapters**: Concrete implementations of ports (HTTP, in-memory, logs)
//!
//! # Modules
//!
//! - [`board`]: Board state, normalisation and synchronisation
//! - [`session`]: Explicit access credentials
//! - [`telemetry`]: Logging setup for entry points

pub mod board;
pub mod session;
pub mod telemetry;
