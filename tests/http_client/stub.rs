//! Recording stub backend served on an ephemeral local port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use mockable::DefaultClock;
use serde_json::Value;
use tokio::net::TcpListener;
use trellis::board::adapters::http::{ApiConfig, HttpBoardApi};
use trellis::session::{AccessToken, Credential};

/// Token every stub client authenticates with.
pub const TOKEN: &str = "stub-token";

/// One request as the stub received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct StubState {
    requests: Vec<RecordedRequest>,
    responses: HashMap<(Method, String), (StatusCode, String)>,
}

/// Handle to a running stub backend.
#[derive(Debug, Clone)]
pub struct StubBackend {
    state: Arc<Mutex<StubState>>,
    base_url: String,
}

impl StubBackend {
    /// Binds the stub to `127.0.0.1:0` and serves it in the background.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be bound.
    pub async fn start() -> Result<Self, eyre::Report> {
        let state = Arc::new(Mutex::new(StubState::default()));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let app = Router::new().fallback(record).with_state(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(Self {
            state,
            base_url: format!("http://{address}"),
        })
    }

    /// Answers `method path` with `status` and `body` from now on.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.lock()
            .responses
            .insert((method, path.to_owned()), (code, body.to_owned()));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Root URL of the stub.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a client for this stub with a non-expiring credential.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be configured.
    pub fn client(&self) -> Result<HttpBoardApi<DefaultClock>, eyre::Report> {
        client_for(&self.base_url, Credential::new(AccessToken::new(TOKEN)?))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds a client for `base_url` with a short timeout.
///
/// # Errors
///
/// Returns an error when the URL is rejected.
pub fn client_for(
    base_url: &str,
    credential: Credential,
) -> Result<HttpBoardApi<DefaultClock>, eyre::Report> {
    let config = ApiConfig::new(base_url, Duration::from_secs(5))?;
    Ok(HttpBoardApi::new(config, credential, Arc::new(DefaultClock))?)
}

async fn record(
    State(shared): State<Arc<Mutex<StubState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
    let path = uri.path().to_owned();
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&body).ok(),
    });
    let (status, body) = state
        .responses
        .get(&(method, path))
        .cloned()
        .unwrap_or((StatusCode::OK, String::new()));
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
