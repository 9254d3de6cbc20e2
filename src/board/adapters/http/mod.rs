//! HTTP adapter for the backend REST API.

mod client;
mod config;
pub mod routes;

pub use client::HttpBoardApi;
pub use config::{
    ApiConfig, BACKEND_URL_VAR, ConfigError, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT,
    HTTP_TIMEOUT_VAR,
};
