use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::config::Config;
use crate::errors::{DispatchError, DispatchResult, TransportError};
use crate::providers::transport::HttpRequest;
use crate::providers::types::{Message, ProviderKind};

/// Adapter for the chat-completions request shape (Ollama, OpenAI, Azure).
///
/// Ollama and OpenAI differ only in the endpoint they target. Azure routes by
/// deployment, pins an API version in the query string and authenticates with
/// an `api-key` header instead of a bearer token.
#[derive(Debug, Clone)]
pub struct ChatCompletionsAdapter {
    provider: ProviderKind,
    endpoint: String,
    headers: Vec<(String, String)>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    extra_params: Map<String, Value>,
}

/// Request structure for the chat completion API
#[derive(Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

/// Response structure from the chat completion API
#[derive(Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Individual choice from the response
#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsAdapter {
    /// Builds the adapter from a resolved config. Performs no I/O.
    pub fn new(config: &Config) -> DispatchResult<Self> {
        let provider = config.provider();
        let (endpoint, headers) = match provider {
            ProviderKind::Azure => (
                azure_endpoint(config.base_url(), config.model(), config.azure_api_version())
                    .map_err(|e| DispatchError::transport(provider, e))?,
                vec![("api-key".to_string(), config.api_key().to_string())],
            ),
            _ => (
                chat_endpoint(config.base_url()).map_err(|e| DispatchError::transport(provider, e))?,
                vec![(
                    "Authorization".to_string(),
                    format!("Bearer {}", config.api_key()),
                )],
            ),
        };

        Ok(Self {
            provider,
            endpoint,
            headers,
            model: config.model().to_string(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            extra_params: config.extra_params().clone(),
        })
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, messages: &[Message]) -> DispatchResult<HttpRequest> {
        let body = ChatCompletionsRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            extra: &self.extra_params,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| DispatchError::transport(self.provider, e))?;

        Ok(HttpRequest {
            url: self.endpoint.clone(),
            headers: self.headers.clone(),
            body,
        })
    }

    /// Reads `choices[0].message.content`.
    pub fn extract_text(&self, response: Value) -> DispatchResult<String> {
        let response: ChatCompletionsResponse = serde_json::from_value(response)
            .map_err(|e| DispatchError::transport(self.provider, e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(DispatchError::EmptyResponse(self.provider))
    }
}

/// `{base}/chat/completions`, unless the base already points there.
fn chat_endpoint(base_url: &str) -> Result<String, TransportError> {
    let mut url = parse_base(base_url)?;
    if !url.path().trim_end_matches('/').ends_with("/chat/completions") {
        url.path_segments_mut()
            .map_err(|_| cannot_be_base(base_url))?
            .pop_if_empty()
            .extend(["chat", "completions"]);
    }
    Ok(url.to_string())
}

/// `{endpoint}/openai/deployments/{model}/chat/completions?api-version={version}`
fn azure_endpoint(base_url: &str, model: &str, api_version: &str) -> Result<String, TransportError> {
    let mut url = parse_base(base_url)?;
    url.path_segments_mut()
        .map_err(|_| cannot_be_base(base_url))?
        .pop_if_empty()
        .extend(["openai", "deployments", model, "chat", "completions"]);
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url.to_string())
}

pub(crate) fn parse_base(base_url: &str) -> Result<Url, TransportError> {
    Url::parse(base_url).map_err(|e| {
        TransportError::InvalidRequest(format!("Invalid base URL '{}': {}", base_url, e))
    })
}

pub(crate) fn cannot_be_base(base_url: &str) -> TransportError {
    TransportError::InvalidRequest(format!("Base URL '{}' cannot carry a path", base_url))
}
