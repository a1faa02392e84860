//! Configuration resolution.
//!
//! A [`Config`] is built once per call site from three layers, highest priority first:
//!
//! 1. explicit arguments (builder calls, or values from a settings file)
//! 2. the process environment (`LLM_PROVIDER`, `LLM_MODEL`, `LLM_API_KEY`, `LLM_BASE_URL`)
//! 3. provider-specific defaults, some of which read vendor variables such as `OPENAI_API_KEY`
//!
//! The environment is read once into an [`Environment`] snapshot; the resulting
//! `Config` never consults it again.
//!
//! # Example Settings File
//!
//! ```toml
//! [llm]
//! provider = "anthropic"
//! api_key = "${ANTHROPIC_API_KEY}"
//! temperature = 0.2
//!
//! [llm.params]
//! top_p = 0.9
//! ```

mod env;
mod loader;
mod resolver;
mod types;

pub use env::Environment;
pub use loader::{load_config, load_settings, parse_settings, Settings, SettingsFile};
pub use resolver::{
    defaults_for, resolve, resolve_from, resolve_max_tokens, resolve_temperature, validate,
    Fallback, ProviderDefaults, PROVIDER_DEFAULTS,
};
pub use types::{Config, ConfigBuilder, ResolveOptions};
