//! HTTP capability used by the cloud wake-up sequence.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::{Method as HttpMethod, RequestBuilder};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::error::Result;

// ============================================================================
// HttpResponse
// ============================================================================

/// Response of an HTTP call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: FxHashMap<String, String>,
    /// Body parsed as JSON; a non-JSON body is kept as a string and an empty
    /// body is `null`.
    pub body: Value,
}

impl HttpResponse {
    /// Creates a response with the given status and JSON body.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: FxHashMap::default(),
            body,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns `true` for a 2xx status.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// Minimal HTTP client.
///
/// Non-2xx statuses are returned as responses, not errors. Errors mean the
/// request could not be made at all.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// Issues a POST request with a JSON body.
    async fn post(&self, url: &str, body: &Value) -> Result<HttpResponse>;

    /// Issues an OPTIONS request.
    async fn options(&self, url: &str) -> Result<HttpResponse>;
}

// ============================================================================
// ReqwestHttpClient
// ============================================================================

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Creates a client with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<HttpResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        trace!(status, "HTTP response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.execute(self.client.get(url)).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        self.execute(self.client.post(url).json(body)).await
    }

    async fn options(&self, url: &str) -> Result<HttpResponse> {
        self.execute(self.client.request(HttpMethod::OPTIONS, url))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
