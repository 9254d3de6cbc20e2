//! reqwest implementation of the backend sync client.

use super::config::{ApiConfig, ConfigError};
use super::routes;
use crate::board::domain::{ProjectId, StatusId, TaskId};
use crate::board::ports::{
    BoardApi, CreateStatusRequest, CreateTaskRequest, RawStatus, RawTask, StatusNameUpdate,
    StatusOrderUpdate, SyncError, SyncResult, UpdateTaskRequest, status_records, task_records,
};
use crate::session::Credential;
use async_trait::async_trait;
use mockable::Clock;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Backend client speaking JSON over HTTP with a bearer credential.
#[derive(Debug, Clone)]
pub struct HttpBoardApi<C>
where
    C: Clock + Send + Sync,
{
    client: Client,
    config: ApiConfig,
    credential: Credential,
    clock: Arc<C>,
}

impl<C> HttpBoardApi<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a client for `config` authenticating with `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] when the TLS backend cannot be
    /// initialised.
    pub fn new(config: ApiConfig, credential: Credential, clock: Arc<C>) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            config,
            credential,
            clock,
        })
    }

    /// Returns the connection settings.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> SyncResult<RequestBuilder> {
        if let Some(expiry) = self.credential.expires_at()
            && self.credential.is_expired_at(self.clock.utc())
        {
            return Err(SyncError::CredentialExpired(expiry));
        }
        let url = self.config.endpoint(path);
        debug!(method = %method, url = %url, "dispatching backend request");
        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, self.credential.bearer()))
    }

    fn request_with<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> SyncResult<RequestBuilder> {
        Ok(self.request(method, path)?.json(body))
    }
}

/// Sends a request and returns the raw body of a successful response.
///
/// A failure status is reported as [`SyncError::Server`] even when its body
/// cannot be read.
async fn send(request: RequestBuilder) -> SyncResult<Vec<u8>> {
    let response = request.send().await.map_err(SyncError::network)?;
    let status = response.status();
    let body = response.bytes().await;
    if !status.is_success() {
        let code = status.as_u16();
        return Err(SyncError::Server {
            status: code,
            message: body.map_or_else(
                |_| server_message(&[], code),
                |bytes| server_message(&bytes, code),
            ),
        });
    }
    Ok(body.map_err(SyncError::network)?.to_vec())
}

/// Parses a successful body; an empty body reads as JSON `null`.
fn json_body(body: &[u8]) -> SyncResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(SyncError::invalid_body)
}

/// Decodes a single record; `null` or a non-object body yields an empty one.
fn record<T: DeserializeOwned + Default>(body: &[u8]) -> SyncResult<T> {
    match json_body(body)? {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(SyncError::invalid_body),
        _ => Ok(T::default()),
    }
}

/// Extracts the failure text from an error body.
fn server_message(body: &[u8], status: u16) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail"].iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

#[async_trait]
impl<C> BoardApi for HttpBoardApi<C>
where
    C: Clock + Send + Sync,
{
    async fn list_statuses(&self) -> SyncResult<Vec<RawStatus>> {
        let body = send(self.request(Method::GET, routes::STATUS_LIST)?).await?;
        Ok(status_records(json_body(&body)?))
    }

    async fn list_project_tasks(&self, project: &ProjectId) -> SyncResult<Vec<RawTask>> {
        let body = send(self.request(Method::GET, &routes::project_tasks(project))?).await?;
        Ok(task_records(json_body(&body)?))
    }

    async fn list_all_tasks(&self) -> SyncResult<Vec<RawTask>> {
        let body = send(self.request(Method::GET, routes::TASK_LIST)?).await?;
        Ok(task_records(json_body(&body)?))
    }

    async fn get_task(&self, task: &TaskId) -> SyncResult<RawTask> {
        let body = send(self.request(Method::GET, &routes::task_detail(task))?).await?;
        record(&body)
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> SyncResult<RawTask> {
        let body = send(self.request_with(Method::POST, routes::TASK_CREATE, request)?).await?;
        record(&body)
    }

    async fn update_task(
        &self,
        task: &TaskId,
        request: &UpdateTaskRequest,
    ) -> SyncResult<RawTask> {
        let body =
            send(self.request_with(Method::PUT, &routes::task_update(task), request)?).await?;
        record(&body)
    }

    async fn delete_task(&self, task: &TaskId) -> SyncResult<()> {
        send(self.request(Method::DELETE, &routes::task_delete(task))?).await?;
        Ok(())
    }

    async fn create_status(&self, request: &CreateStatusRequest) -> SyncResult<RawStatus> {
        let body = send(self.request_with(Method::POST, routes::STATUS_CREATE, request)?).await?;
        record(&body)
    }

    async fn update_status_order(
        &self,
        status: &StatusId,
        update: &StatusOrderUpdate,
    ) -> SyncResult<()> {
        send(self.request_with(Method::POST, &routes::status_update(status), update)?).await?;
        Ok(())
    }

    async fn update_status_name(
        &self,
        status: &StatusId,
        update: &StatusNameUpdate,
    ) -> SyncResult<()> {
        send(self.request_with(Method::POST, &routes::status_update(status), update)?).await?;
        Ok(())
    }

    async fn delete_status(&self, status: &StatusId) -> SyncResult<()> {
        send(self.request(Method::DELETE, &routes::status_delete(status))?).await?;
        Ok(())
    }
}
