use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::constants;
use crate::errors::{DispatchError, DispatchResult, TransportError};
use crate::providers::chat_completions::{cannot_be_base, parse_base};
use crate::providers::transport::HttpRequest;
use crate::providers::types::{Message, ProviderKind, Role};

/// Adapter for the messages request shape (Anthropic).
#[derive(Debug, Clone)]
pub struct MessagesAdapter {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    extra_params: Map<String, Value>,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<&'a Message>,
    temperature: f64,
    max_tokens: u32,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl MessagesAdapter {
    /// Builds the adapter from a resolved config. Performs no I/O.
    ///
    /// An empty `base_url` targets the vendor's public endpoint.
    pub fn new(config: &Config) -> DispatchResult<Self> {
        let base_url = if config.base_url().is_empty() {
            constants::ANTHROPIC_BASE_URL
        } else {
            config.base_url()
        };
        let endpoint = messages_endpoint(base_url)
            .map_err(|e| DispatchError::transport(ProviderKind::Anthropic, e))?;

        Ok(Self {
            endpoint,
            api_key: config.api_key().to_string(),
            model: config.model().to_string(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            extra_params: config.extra_params().clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// System turns are lifted into the top-level `system` field; the API
    /// only accepts user and assistant turns inline.
    pub fn build_request(&self, messages: &[Message]) -> DispatchResult<HttpRequest> {
        let (system, turns): (Vec<&Message>, Vec<&Message>) =
            messages.iter().partition(|m| m.role == Role::System);

        let system = if system.is_empty() {
            None
        } else {
            Some(
                system
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            )
        };

        let body = MessagesRequest {
            model: &self.model,
            system,
            messages: turns,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            extra: &self.extra_params,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| DispatchError::transport(ProviderKind::Anthropic, e))?;

        Ok(HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("x-api-key".to_string(), self.api_key.clone()),
                (
                    "anthropic-version".to_string(),
                    constants::ANTHROPIC_API_VERSION.to_string(),
                ),
            ],
            body,
        })
    }

    /// Reads `content[0].text`.
    pub fn extract_text(&self, response: Value) -> DispatchResult<String> {
        let response: MessagesResponse = serde_json::from_value(response)
            .map_err(|e| DispatchError::transport(ProviderKind::Anthropic, e))?;

        response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or(DispatchError::EmptyResponse(ProviderKind::Anthropic))
    }
}

fn messages_endpoint(base_url: &str) -> Result<String, TransportError> {
    let mut url = parse_base(base_url)?;
    if !url.path().trim_end_matches('/').ends_with("/messages") {
        url.path_segments_mut()
            .map_err(|_| cannot_be_base(base_url))?
            .pop_if_empty()
            .push("messages");
    }
    Ok(url.to_string())
}
