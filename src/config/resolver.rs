//! Field resolution: explicit argument, then environment, then provider default.

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::constants::*;
use crate::errors::{ConfigError, ConfigResult};
use crate::providers::ProviderKind;
use super::env::Environment;
use super::types::{Config, ResolveOptions};

/// Where a field comes from once explicit and generic environment values are exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Fixed(&'static str),
    Env(&'static str),
    Unset,
}

/// Per-provider defaults, applied only to fields still unset.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDefaults {
    pub provider: ProviderKind,
    pub base_url: Fallback,
    pub api_key: Fallback,
    pub model: &'static str,
    /// Variable named in the error when a required key is missing
    pub credential_env: Option<&'static str>,
    /// Variable named in the error when a required endpoint is missing
    pub endpoint_env: Option<&'static str>,
}

pub const PROVIDER_DEFAULTS: [ProviderDefaults; 4] = [
    ProviderDefaults {
        provider: ProviderKind::Ollama,
        base_url: Fallback::Fixed(OLLAMA_BASE_URL),
        api_key: Fallback::Fixed(OLLAMA_PLACEHOLDER_KEY),
        model: OLLAMA_DEFAULT_MODEL,
        credential_env: None,
        endpoint_env: Some(ENV_BASE_URL),
    },
    ProviderDefaults {
        provider: ProviderKind::OpenAI,
        base_url: Fallback::Fixed(OPENAI_BASE_URL),
        api_key: Fallback::Env(ENV_OPENAI_API_KEY),
        model: OPENAI_DEFAULT_MODEL,
        credential_env: Some(ENV_OPENAI_API_KEY),
        endpoint_env: None,
    },
    ProviderDefaults {
        provider: ProviderKind::Anthropic,
        base_url: Fallback::Unset,
        api_key: Fallback::Env(ENV_ANTHROPIC_API_KEY),
        model: ANTHROPIC_DEFAULT_MODEL,
        credential_env: Some(ENV_ANTHROPIC_API_KEY),
        endpoint_env: None,
    },
    ProviderDefaults {
        provider: ProviderKind::Azure,
        base_url: Fallback::Env(ENV_AZURE_ENDPOINT),
        api_key: Fallback::Env(ENV_AZURE_API_KEY),
        model: AZURE_DEFAULT_MODEL,
        credential_env: Some(ENV_AZURE_API_KEY),
        endpoint_env: Some(ENV_AZURE_ENDPOINT),
    },
];

/// Keys consumed by resolution rather than passed through
const CONSUMED_PARAMS: [&str; 3] = ["temperature", "max_tokens", "azure_api_version"];

/// Keys that would clobber the request shape if flattened into it
const RESERVED_PARAMS: [&str; 3] = ["model", "messages", "stream"];

/// Looks up the defaults row for a provider.
pub fn defaults_for(provider: ProviderKind) -> &'static ProviderDefaults {
    let row = match provider {
        ProviderKind::Ollama => 0,
        ProviderKind::OpenAI => 1,
        ProviderKind::Anthropic => 2,
        ProviderKind::Azure => 3,
    };
    &PROVIDER_DEFAULTS[row]
}

impl Fallback {
    fn apply(&self, env: &Environment) -> Option<String> {
        match self {
            Fallback::Fixed(value) => Some(value.to_string()),
            Fallback::Env(name) => env.get(name).map(str::to_string),
            Fallback::Unset => None,
        }
    }
}

/// Resolves a [`Config`] against a fresh snapshot of the process environment.
pub fn resolve(
    provider: Option<&str>,
    model: Option<&str>,
    api_key: Option<&str>,
    base_url: Option<&str>,
    options: &ResolveOptions,
) -> ConfigResult<Config> {
    resolve_from(&Environment::capture(), provider, model, api_key, base_url, options)
}

/// Resolves a [`Config`] against the given snapshot. Reads nothing else.
///
/// Empty explicit strings count as absent.
pub fn resolve_from(
    env: &Environment,
    provider: Option<&str>,
    model: Option<&str>,
    api_key: Option<&str>,
    base_url: Option<&str>,
    options: &ResolveOptions,
) -> ConfigResult<Config> {
    let provider_name = pick(provider, env.get(ENV_PROVIDER))
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    let provider: ProviderKind = provider_name.parse()?;
    let defaults = defaults_for(provider);

    let model = pick(model, env.get(ENV_MODEL)).unwrap_or_else(|| defaults.model.to_string());
    let api_key = pick(api_key, env.get(ENV_API_KEY))
        .or_else(|| defaults.api_key.apply(env))
        .unwrap_or_default();
    let base_url = pick(base_url, env.get(ENV_BASE_URL))
        .or_else(|| defaults.base_url.apply(env))
        .unwrap_or_default();

    let temperature = resolve_temperature(options.get("temperature"));
    let max_tokens = resolve_max_tokens(options.get("max_tokens"))?;
    let azure_api_version = options
        .get("azure_api_version")
        .and_then(scalar_to_string)
        .or_else(|| env.get(ENV_AZURE_API_VERSION).map(str::to_string))
        .unwrap_or_else(|| AZURE_DEFAULT_API_VERSION.to_string());
    let extra_params = passthrough_params(&options.params)?;

    let config = Config {
        provider,
        model,
        api_key,
        base_url,
        temperature,
        max_tokens,
        azure_api_version,
        extra_params,
    };
    validate(&config)?;

    debug!(
        "Resolved {} config: model={}, base_url={}, temperature={}, max_tokens={}",
        config.provider,
        config.model,
        if config.base_url.is_empty() { "<vendor default>" } else { config.base_url.as_str() },
        config.temperature,
        config.max_tokens
    );
    Ok(config)
}

/// Checks credentials, endpoint and model for the resolved provider.
pub fn validate(config: &Config) -> ConfigResult<()> {
    let defaults = defaults_for(config.provider);

    if let Some(env_var) = defaults.credential_env {
        if config.api_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                provider: config.provider,
                env_var,
            });
        }
    }

    if let Some(env_var) = defaults.endpoint_env {
        if config.base_url.is_empty() {
            return Err(ConfigError::MissingEndpoint {
                provider: config.provider,
                env_var,
            });
        }
    }

    if config.model.is_empty() {
        return Err(ConfigError::MissingModel(config.provider));
    }

    Ok(())
}

/// Parses, then clamps into [0.0, 2.0]; anything unparseable becomes the default.
pub fn resolve_temperature(value: Option<&Value>) -> f64 {
    let Some(value) = value else {
        return DEFAULT_TEMPERATURE;
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(t) if !t.is_nan() => t.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
        _ => {
            warn!(
                "Ignoring malformed temperature {}, using {}",
                value, DEFAULT_TEMPERATURE
            );
            DEFAULT_TEMPERATURE
        }
    }
}

/// Parses a positive integer; malformed input fails resolution.
pub fn resolve_max_tokens(value: Option<&Value>) -> ConfigResult<u32> {
    let Some(value) = value else {
        return Ok(DEFAULT_MAX_TOKENS);
    };

    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidMaxTokens(display_value(value))),
    }
}

fn passthrough_params(params: &Map<String, Value>) -> ConfigResult<Map<String, Value>> {
    let mut extra = Map::new();
    for (key, value) in params {
        if CONSUMED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        if RESERVED_PARAMS.contains(&key.as_str()) {
            return Err(ConfigError::ReservedParam(key.clone()));
        }
        extra.insert(key.clone(), value.clone());
    }
    Ok(extra)
}

fn pick(explicit: Option<&str>, from_env: Option<&str>) -> Option<String> {
    explicit
        .filter(|value| !value.is_empty())
        .or(from_env)
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON has no non-finite numbers, so `inf`, `-inf` and `NaN` are kept as
/// strings for [`resolve_temperature`] to parse.
pub(crate) fn float_value(f: f64) -> Value {
    if f.is_finite() {
        Value::from(f)
    } else {
        Value::String(f.to_string())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
