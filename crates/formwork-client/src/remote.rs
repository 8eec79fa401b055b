//! Transport seam and the remote call adapter.
//!
//! [`Transport`] is the low-level seam the engine's network traffic goes
//! through; [`HttpTransport`] implements it over an HTTP client, tests use
//! scripted in-memory implementations. [`RemoteClient`] layers the wire
//! envelope on top, giving the rest of the engine uniform `read`/`write`
//! operations that yield decoded payloads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use formwork_core::error::{FormworkError, FormworkResult};
use formwork_core::settings::SETTINGS;

use crate::wire;

/// Low-level request transport.
///
/// Implementations return the raw response body; envelope interpretation
/// happens in [`RemoteClient`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for the given endpoint (path plus query), returning the
    /// raw response body.
    async fn get(&self, url: &str) -> FormworkResult<String>;

    /// Issues a POST with a JSON body, returning the raw response body.
    async fn post(&self, url: &str, body: String) -> FormworkResult<String>;
}

/// HTTP transport over a shared client and a base URL.
///
/// Calls carry no timeout unless `request_timeout_secs` is configured; the
/// envelope's status field, not the HTTP status, is what signals backend
/// failure.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpTransport {
    /// Creates a transport for the given base URL, honoring the configured
    /// request timeout.
    pub fn new(base_url: &str) -> FormworkResult<Self> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| FormworkError::Configuration(format!("invalid base url: {e}")))?;
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = SETTINGS.get().request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FormworkError::Transport(format!("HTTP client build failed: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn absolute(&self, url: &str) -> FormworkResult<url::Url> {
        self.base_url
            .join(url)
            .map_err(|e| FormworkError::Configuration(format!("invalid endpoint {url:?}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> FormworkResult<String> {
        let target = self.absolute(url)?;
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| FormworkError::Transport(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| FormworkError::Transport(e.to_string()))
    }

    async fn post(&self, url: &str, body: String) -> FormworkResult<String> {
        let target = self.absolute(url)?;
        let response = self
            .client
            .post(target)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| FormworkError::Transport(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| FormworkError::Transport(e.to_string()))
    }
}

/// The remote call adapter: wire envelope over a [`Transport`].
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
}

impl RemoteClient {
    /// Creates an adapter over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Read operation: the payload travels on the URL, the enveloped
    /// response is decoded down to its data value.
    pub async fn read(&self, endpoint: &str, payload: &Value) -> FormworkResult<Value> {
        let url = wire::read_url(endpoint, payload)?;
        let body = self.transport.get(&url).await?;
        wire::decode_envelope(&body)
    }

    /// Write operation: the payload travels nested in the request body, the
    /// enveloped response is decoded down to its data value.
    pub async fn write(&self, endpoint: &str, payload: &Value) -> FormworkResult<Value> {
        let body = wire::write_body(payload)?;
        let raw = self.transport.post(endpoint, body).await?;
        wire::decode_envelope(&raw)
    }
}
