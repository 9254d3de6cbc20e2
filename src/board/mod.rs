//! Kanban board state and backend synchronisation.
//!
//! A board maps every status of a project to its ordered tasks. The
//! client-side board is a best-effort mirror of the backend: moves are shown
//! before the backend confirms them and undone when it refuses. The module
//! follows hexagonal architecture:
//!
//! - Value types and pure transitions in [`domain`]
//! - Backend record normalisation in [`normalize`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The board store and synchroniser in [`services`]

pub mod adapters;
pub mod domain;
pub mod normalize;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
