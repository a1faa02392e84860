use async_trait::async_trait;
use log::debug;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;

use crate::errors::TransportError;

/// A fully assembled backend call: where, with which headers, carrying which JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpRequest {
    /// First header value with the given (case-insensitive) name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The single point where a completion touches the network.
///
/// Aborting the future returned by [`Transport::send`] is how callers cancel a call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST the request and return the decoded JSON body of a successful response
    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
///
/// No timeout is configured; wrap calls in an external deadline or pass a
/// client built with one.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default, connection-pooling client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a transport whose client keeps no idle connections between calls.
    ///
    /// Calls made through [`Dispatcher::complete_blocking`](super::Dispatcher::complete_blocking)
    /// each run on their own short-lived runtime, so pooled connections would not outlive them.
    pub fn unpooled() -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Uses a caller-configured client (timeouts, proxies, pooling).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_headers(request: &HttpRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidRequest(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::InvalidRequest(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError> {
        let headers = Self::build_headers(&request)?;

        debug!("POST {}", request.url);
        let response = self
            .client
            .post(&request.url)
            .headers(headers)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Unknown error. Status: {}", status));
            return Err(TransportError::from_api_response(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        if response_text.trim().is_empty() {
            return Err(TransportError::Parse(
                "Received empty response body".to_string(),
            ));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            TransportError::Parse(format!(
                "Failed to parse JSON response: {}. Body: {}",
                e, response_text
            ))
        })
    }
}
