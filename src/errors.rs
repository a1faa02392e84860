use std::error::Error;
use std::fmt;

use crate::providers::ProviderKind;

/// Failures raised while resolving or validating a [`Config`](crate::config::Config)
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Provider name outside the supported set
    UnknownProvider(String),
    /// A provider that needs a key ended up without one
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },
    /// No model after explicit, environment and default resolution
    MissingModel(ProviderKind),
    /// No endpoint for a provider that talks to a distinct HTTP endpoint
    MissingEndpoint {
        provider: ProviderKind,
        env_var: &'static str,
    },
    /// `max_tokens` was not a positive integer
    InvalidMaxTokens(String),
    /// A passthrough parameter would override part of the request shape
    ReservedParam(String),
    /// Settings file could not be read, parsed or interpolated
    Settings(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownProvider(name) => write!(
                f,
                "Unknown provider '{}'\n  → Valid providers: ollama, openai, anthropic, azure (local is an alias of ollama)",
                name
            ),
            ConfigError::MissingCredential { provider, env_var } => write!(
                f,
                "API key not set for provider '{}'\n  → Set it with: export {}=\"your-key\"",
                provider, env_var
            ),
            ConfigError::MissingModel(provider) => write!(
                f,
                "Model not specified for provider '{}'\n  → Pass a model or set LLM_MODEL",
                provider
            ),
            ConfigError::MissingEndpoint { provider, env_var } => write!(
                f,
                "Endpoint not set for provider '{}'\n  → Set it with: export {}=\"https://...\"",
                provider, env_var
            ),
            ConfigError::InvalidMaxTokens(value) => write!(
                f,
                "Invalid max_tokens '{}'\n  → Expected a positive integer",
                value
            ),
            ConfigError::ReservedParam(key) => write!(
                f,
                "Parameter '{}' is reserved and cannot be passed through",
                key
            ),
            ConfigError::Settings(msg) => write!(f, "Settings error: {}", msg),
        }
    }
}

impl Error for ConfigError {}

/// Convert std::io::Error to ConfigError
impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Settings(err.to_string())
    }
}

/// Convert toml parsing errors to ConfigError
impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Settings(format!("Failed to parse TOML: {}", err))
    }
}

/// Low-level failures from the HTTP boundary
#[derive(Debug)]
pub enum TransportError {
    /// Error from the HTTP client
    Request(reqwest::Error),
    /// Request could not be assembled (bad endpoint URL or header value)
    InvalidRequest(String),
    /// Non-success status from the backend
    Api { status: u16, message: String },
    /// Rate limiting error
    RateLimit { status: u16, message: String },
    /// Body could not be encoded or decoded
    Parse(String),
    /// The blocking runtime could not be started
    Runtime(std::io::Error),
}

impl TransportError {
    /// Returns RateLimit error for 429 status or rate limit keywords
    pub fn from_api_response(status: u16, message: String) -> Self {
        if status == 429 {
            return TransportError::RateLimit { status, message };
        }

        let msg_lower = message.to_lowercase();
        if msg_lower.contains("rate limit")
            || msg_lower.contains("too many requests")
            || msg_lower.contains("quota exceeded")
            || msg_lower.contains("overloaded")
            || msg_lower.contains("throttle")
        {
            return TransportError::RateLimit { status, message };
        }

        TransportError::Api { status, message }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(err) => write!(f, "Request error: {}", err),
            TransportError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            TransportError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            TransportError::RateLimit { status, message } => {
                write!(f, "Rate limit error (status {}): {}", status, message)
            }
            TransportError::Parse(msg) => write!(f, "Parse error: {}", msg),
            TransportError::Runtime(err) => write!(f, "Runtime error: {}", err),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransportError::Request(err) => Some(err),
            TransportError::Runtime(err) => Some(err),
            _ => None,
        }
    }
}

/// Convert reqwest errors to TransportError
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err)
    }
}

/// Convert serde_json errors to TransportError
impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Parse(err.to_string())
    }
}

/// Failures raised while dispatching a completion
#[derive(Debug)]
pub enum DispatchError {
    /// Provider is not enabled on this dispatcher
    UnsupportedProvider(ProviderKind),
    /// The backend call failed
    TransportFailure {
        provider: ProviderKind,
        source: TransportError,
    },
    /// Syntactically valid response carrying no text
    EmptyResponse(ProviderKind),
}

impl DispatchError {
    pub(crate) fn transport(provider: ProviderKind, source: impl Into<TransportError>) -> Self {
        DispatchError::TransportFailure {
            provider,
            source: source.into(),
        }
    }

    /// Provider the failing call was aimed at
    pub fn provider(&self) -> ProviderKind {
        match self {
            DispatchError::UnsupportedProvider(p)
            | DispatchError::TransportFailure { provider: p, .. }
            | DispatchError::EmptyResponse(p) => *p,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnsupportedProvider(provider) => {
                write!(f, "Unsupported provider: {}", provider)
            }
            DispatchError::TransportFailure { provider, source } => {
                write!(f, "{} call failed: {}", provider, source)
            }
            DispatchError::EmptyResponse(provider) => {
                write!(f, "No response content from {}", provider)
            }
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::TransportFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Either half of a resolve-then-dispatch call
#[derive(Debug)]
pub enum LlmError {
    Config(ConfigError),
    Dispatch(DispatchError),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Config(err) => write!(f, "Configuration error: {}", err),
            LlmError::Dispatch(err) => write!(f, "Dispatch error: {}", err),
        }
    }
}

impl Error for LlmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LlmError::Config(err) => Some(err),
            LlmError::Dispatch(err) => Some(err),
        }
    }
}

impl From<ConfigError> for LlmError {
    fn from(err: ConfigError) -> Self {
        LlmError::Config(err)
    }
}

impl From<DispatchError> for LlmError {
    fn from(err: DispatchError) -> Self {
        LlmError::Dispatch(err)
    }
}

/// Result type alias for configuration resolution
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type alias for combined operations
pub type LlmResult<T> = Result<T, LlmError>;
