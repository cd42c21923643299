//! HTTP client for the Enux REST API.
//!
//! Every authenticated operation goes through [`ApiClient::authorized`], which
//! resolves the bearer token from the caller's [`Session`] before a request is
//! built. A session without a token therefore never reaches the network.
//!
//! Endpoints are given as path segments. Each segment is percent-encoded on
//! its own, so an id containing `/` or `?` stays inside its segment.

mod notifications;
mod playbooks;
mod profiles;
mod pull_requests;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{EnuxError, EnuxResult};
use crate::session::Session;

/// Shared client for all playbook, pull request, and notification calls.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> EnuxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("enux/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EnuxError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append `segments` to the base URL, encoding each one.
    fn url(&self, segments: &[&str]) -> EnuxResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            EnuxError::Internal(format!("Invalid API base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                EnuxError::Internal(format!("API base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build a request carrying the session's bearer token.
    pub(crate) fn authorized(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
    ) -> EnuxResult<RequestBuilder> {
        let token = session.bearer_token()?;
        let url = self.url(segments)?;
        debug!(method = %method, path = url.path(), "Sending authorized request");
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// Build a request for the unauthenticated auth endpoints.
    pub(crate) fn public(&self, method: Method, segments: &[&str]) -> EnuxResult<RequestBuilder> {
        let url = self.url(segments)?;
        debug!(method = %method, path = url.path(), "Sending request");
        Ok(self.client.request(method, url))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> EnuxResult<T> {
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    pub(crate) async fn send_empty(request: RequestBuilder) -> EnuxResult<()> {
        let response = request.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Turn a non-2xx response into [`EnuxError::ServerRejected`], preferring
    /// the server's own message.
    async fn ensure_success(response: Response) -> EnuxResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, &["message", "detail"])
            .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

        debug!(status = status.as_u16(), "Request rejected: {}", message);
        Err(EnuxError::server_rejected(status.as_u16(), message))
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> EnuxResult<T> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| EnuxError::ResponseParse(e.to_string()))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Keys are tried in order. String values are used as-is; structured values
/// such as validation error arrays are rendered as compact JSON.
pub(crate) fn error_message(body: &str, keys: &[&str]) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}
