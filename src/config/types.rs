//! Resolved configuration and the knobs callers pass into resolution.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::errors::ConfigResult;
use crate::providers::ProviderKind;
use super::env::Environment;
use super::resolver;

/// Validated, immutable settings for one backend.
///
/// Only produced by resolution; every instance has passed validation.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub(crate) provider: ProviderKind,
    pub(crate) model: String,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) temperature: f64,
    pub(crate) max_tokens: u32,
    pub(crate) azure_api_version: String,
    pub(crate) extra_params: Map<String, Value>,
}

impl Config {
    /// Starts an explicit-argument builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolves a config purely from the process environment and defaults.
    pub fn from_env() -> ConfigResult<Config> {
        ConfigBuilder::default().build()
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Empty when the provider's vendor default endpoint applies
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn azure_api_version(&self) -> &str {
        &self.azure_api_version
    }

    pub fn extra_params(&self) -> &Map<String, Value> {
        &self.extra_params
    }

    /// Flat view of every field with passthrough params merged in.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("provider".to_string(), json!(self.provider.as_str()));
        map.insert("model".to_string(), json!(self.model));
        map.insert("api_key".to_string(), json!(self.api_key));
        map.insert("base_url".to_string(), json!(self.base_url));
        map.insert("temperature".to_string(), json!(self.temperature));
        map.insert("max_tokens".to_string(), json!(self.max_tokens));
        map.insert("azure_api_version".to_string(), json!(self.azure_api_version));
        for (key, value) in &self.extra_params {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("azure_api_version", &self.azure_api_version)
            .field("extra_params", &self.extra_params)
            .finish()
    }
}

/// Keyword-style options: `temperature`, `max_tokens`, `azure_api_version`
/// and any provider-specific passthrough such as `top_p`.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub(crate) params: Map<String, Value>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or updates a parameter.
    /// Accepts any value that can be converted into a serde_json::Value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_temperature(self, temperature: f64) -> Self {
        self.with_param("temperature", resolver::float_value(temperature))
    }

    pub fn with_max_tokens(self, max_tokens: u32) -> Self {
        self.with_param("max_tokens", max_tokens)
    }

    pub fn with_azure_api_version(self, version: impl Into<String>) -> Self {
        self.with_param("azure_api_version", version.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// Collects explicit arguments, then resolves them against the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    options: ResolveOptions,
}

impl ConfigBuilder {
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.options = self.options.with_temperature(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options = self.options.with_max_tokens(max_tokens);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options = self.options.with_param(key, value);
        self
    }

    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves against a fresh snapshot of the process environment.
    pub fn build(self) -> ConfigResult<Config> {
        self.build_with(&Environment::capture())
    }

    /// Resolves against the given snapshot.
    pub fn build_with(self, env: &Environment) -> ConfigResult<Config> {
        resolver::resolve_from(
            env,
            self.provider.as_deref(),
            self.model.as_deref(),
            self.api_key.as_deref(),
            self.base_url.as_deref(),
            &self.options,
        )
    }
}
