//! Step definitions for board synchronisation scenarios.

mod given;
mod when;
pub mod world;
