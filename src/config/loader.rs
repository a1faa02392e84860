//! Settings file loading and `${VAR}` resolution.

use std::fs;
use std::path::Path;

use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{ConfigError, ConfigResult};
use super::env::Environment;
use super::resolver;
use super::types::{Config, ResolveOptions};

/// Root of a settings file.
#[derive(Debug, Deserialize, Default)]
pub struct SettingsFile {
    #[serde(default)]
    pub llm: Settings,
}

/// The `[llm]` table. Every field is optional; present values act as explicit arguments.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Settings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Number or string; malformed values fall back like any other temperature input
    pub temperature: Option<toml::Value>,
    pub max_tokens: Option<toml::Value>,
    pub azure_api_version: Option<String>,
    /// Provider-specific passthrough knobs such as `top_p`
    #[serde(default)]
    pub params: toml::Table,
}

impl Settings {
    /// Passes the settings through the resolver as explicit arguments.
    pub fn resolve(&self, env: &Environment) -> ConfigResult<Config> {
        resolver::resolve_from(
            env,
            self.provider.as_deref(),
            self.model.as_deref(),
            self.api_key.as_deref(),
            self.base_url.as_deref(),
            &self.options(),
        )
    }

    /// Numeric fields and passthrough params as resolver options.
    pub fn options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::new();
        for (key, value) in &self.params {
            options = options.with_param(key.clone(), toml_to_json(value));
        }
        if let Some(ref temperature) = self.temperature {
            options = options.with_param("temperature", toml_to_json(temperature));
        }
        if let Some(ref max_tokens) = self.max_tokens {
            options = options.with_param("max_tokens", toml_to_json(max_tokens));
        }
        if let Some(ref version) = self.azure_api_version {
            options = options.with_azure_api_version(version.clone());
        }
        options
    }
}

/// Load a settings file, resolving `${VAR}` references from the process environment.
///
/// # Example
/// ```no_run
/// use llmswitch::config::load_settings;
///
/// let settings = load_settings("llm.toml").unwrap();
/// ```
pub fn load_settings<P: AsRef<Path>>(path: P) -> ConfigResult<Settings> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::Settings(format!(
            "Failed to read settings file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let env = Environment::capture().merged(Environment::capture_vars(referenced_vars(&content)));
    parse_settings(&content, &env)
}

/// Load a settings file and resolve it into a [`Config`] in one step.
pub fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
    let settings = load_settings(path)?;
    settings.resolve(&Environment::capture())
}

/// Parse a settings string, resolving `${VAR}` references from `env`.
pub fn parse_settings(content: &str, env: &Environment) -> ConfigResult<Settings> {
    let file: SettingsFile = toml::from_str(content)?;
    let mut settings = file.llm;

    resolve_env_vars(&mut settings, env)?;
    debug!("Parsed settings for provider {:?}", settings.provider);

    Ok(settings)
}

fn env_var_pattern() -> Regex {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
}

/// Names of every `${VAR}` referenced in the raw text.
fn referenced_vars(content: &str) -> Vec<String> {
    env_var_pattern()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn resolve_env_vars(settings: &mut Settings, env: &Environment) -> ConfigResult<()> {
    let pattern = env_var_pattern();

    for (field, slot) in [
        ("provider", &mut settings.provider),
        ("model", &mut settings.model),
        ("api_key", &mut settings.api_key),
        ("base_url", &mut settings.base_url),
        ("azure_api_version", &mut settings.azure_api_version),
    ] {
        if let Some(value) = slot.as_mut() {
            *value = resolve_env_var_string(value, &pattern, env, field)?;
        }
    }

    for (field, slot) in [
        ("temperature", &mut settings.temperature),
        ("max_tokens", &mut settings.max_tokens),
    ] {
        if let Some(toml::Value::String(s)) = slot.as_mut() {
            *s = resolve_env_var_string(s, &pattern, env, field)?;
        }
    }

    for (key, value) in settings.params.iter_mut() {
        if let toml::Value::String(s) = value {
            *s = resolve_env_var_string(s, &pattern, env, &format!("params.{}", key))?;
        }
    }

    Ok(())
}

fn resolve_env_var_string(
    s: &str,
    pattern: &Regex,
    env: &Environment,
    field: &str,
) -> ConfigResult<String> {
    let mut result = s.to_string();

    for caps in pattern.captures_iter(s) {
        let full_match = &caps[0];
        let var_name = &caps[1];

        match env.get(var_name) {
            Some(value) => {
                result = result.replace(full_match, value);
            }
            None => {
                return Err(ConfigError::Settings(format!(
                    "Environment variable '{}' not found\n  \
                     → Referenced in llm.{}\n  \
                     → Set it with: export {}=\"your-value\"",
                    var_name, field, var_name
                )));
            }
        }
    }

    Ok(result)
}

fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => resolver::float_value(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}
