//! Loads a project board from the backend and writes it to stdout as JSON.
//!
//! Usage:
//!
//! ```text
//! board_dump <project-id>
//! ```
//!
//! Connection settings come from `TRELLIS_BACKEND_URL` and
//! `TRELLIS_HTTP_TIMEOUT_SECS`; the bearer token from `TRELLIS_ACCESS_TOKEN`.
//! Log output goes to stderr and is controlled by `TRELLIS_LOG` and
//! `TRELLIS_LOG_FORMAT`.

use mockable::DefaultClock;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use trellis::board::adapters::http::{ApiConfig, ConfigError, HttpBoardApi};
use trellis::board::adapters::notify::TracingNotifier;
use trellis::board::domain::{Board, ProjectId};
use trellis::board::services::{BoardServiceError, BoardSynchronizer};
use trellis::session::{AccessToken, Credential, SessionError};
use trellis::telemetry;

/// Environment variable holding the bearer token.
const ACCESS_TOKEN_VAR: &str = "TRELLIS_ACCESS_TOKEN";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while dumping a board.
#[derive(Debug, Error)]
enum DumpError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("{ACCESS_TOKEN_VAR} is not set")]
    MissingToken,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error("board could not be loaded: {0}")]
    Load(#[from] BoardServiceError),
    #[error("board could not be written: {0}")]
    Output(#[source] serde_json::Error),
}

fn main() -> Result<(), BoxError> {
    telemetry::init_tracing()?;
    let args: Vec<String> = env::args().collect();
    run(&args).map_err(Into::into)
}

fn run(args: &[String]) -> Result<(), DumpError> {
    let project = parse_args(args)?;
    let config = ApiConfig::from_env()?;
    let credential = credential_from(env::var(ACCESS_TOKEN_VAR).ok())?;
    let clock = Arc::new(DefaultClock);
    let api = HttpBoardApi::new(config, credential, Arc::clone(&clock))?;
    let synchronizer =
        BoardSynchronizer::new(project, Arc::new(api), Arc::new(TracingNotifier), clock);

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DumpError::RuntimeInit)?;
    runtime.block_on(synchronizer.load())?;
    write_board(&mut io::stdout().lock(), &synchronizer.board())
}

fn parse_args(args: &[String]) -> Result<ProjectId, DumpError> {
    match args {
        [_, project] if !project.trim().is_empty() => Ok(ProjectId::new(project.trim())),
        _ => Err(DumpError::InvalidArgs(
            "expected exactly one argument: <project-id>".to_owned(),
        )),
    }
}

fn credential_from(token: Option<String>) -> Result<Credential, DumpError> {
    let raw = token.ok_or(DumpError::MissingToken)?;
    Ok(Credential::new(AccessToken::new(raw)?))
}

fn write_board(out: &mut impl Write, board: &Board) -> Result<(), DumpError> {
    serde_json::to_writer_pretty(&mut *out, board).map_err(DumpError::Output)?;
    writeln!(out).map_err(|err| DumpError::Output(serde_json::Error::io(err)))
}
