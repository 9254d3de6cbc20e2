//! Logging setup for binaries and integration harnesses.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the process entry point.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_VAR: &str = "TRELLIS_LOG";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_VAR: &str = "TRELLIS_LOG_FORMAT";

/// Filter used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "trellis=info,warn";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter {directives:?}: {message}")]
    InvalidFilter {
        /// The rejected directives.
        directives: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error(transparent)]
    Install(#[from] TryInitError),
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name; anything other than `json` is compact.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directives.
    pub directives: String,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Reads settings through `lookup`; unset or blank values take their
    /// defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|text| !text.trim().is_empty());
        Self {
            directives: value(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            format: value(LOG_FORMAT_VAR)
                .map(|name| LogFormat::from_name(&name))
                .unwrap_or_default(),
        }
    }
}

/// Installs the global subscriber from the process environment.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing() -> Result<(), TelemetryError> {
    init_tracing_with(&LogSettings::from_lookup(|key| std::env::var(key).ok()))
}

/// Installs the global subscriber with explicit settings.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing_with(settings: &LogSettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&settings.directives).map_err(|err| {
        TelemetryError::InvalidFilter {
            directives: settings.directives.clone(),
            message: err.to_string(),
        }
    })?;
    let registry = tracing_subscriber::registry().with(filter);
    match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}
