//! llmswitch resolves which LLM backend to talk to and issues chat-style
//! completions against it through one call.
//!
//! # Features
//!
//! - **Layered configuration**: explicit arguments win over environment
//!   variables, which win over per-provider defaults
//! - **Four providers, two request shapes**: Ollama, OpenAI and Azure speak
//!   chat-completions; Anthropic speaks messages
//! - **Stateless dispatch**: every call builds, sends and parses one request,
//!   with no retries and no streaming
//!
//! # Example
//!
//! ```no_run
//! use llmswitch::{Config, Dispatcher, Message};
//!
//! async fn example() {
//!     let config = Config::builder()
//!         .provider("anthropic")
//!         .temperature(0.2)
//!         .build()
//!         .expect("ANTHROPIC_API_KEY must be set");
//!
//!     let reply = Dispatcher::new()
//!         .complete(&[Message::user("Explain Rust in one paragraph")], &config)
//!         .await
//!         .expect("completion failed");
//!     println!("{}", reply);
//! }
//! ```

pub mod blocking;
pub mod config;
pub mod constants;
pub mod errors;
pub mod providers;

pub use config::{Config, ConfigBuilder, Environment, ResolveOptions};
pub use errors::{
    ConfigError, ConfigResult, DispatchError, DispatchResult, LlmError, LlmResult, TransportError,
};
pub use providers::{Dispatcher, HttpRequest, Message, ProviderKind, Role, Shape, Transport};

/// Sends `messages` using `config` over a default [`Dispatcher`].
///
/// Every call builds a new HTTP client, so connections are never reused.
/// Keep a [`Dispatcher`] around when making repeated calls.
pub async fn complete(messages: &[Message], config: &Config) -> DispatchResult<String> {
    Dispatcher::new().complete(messages, config).await
}

/// Sends `messages`, resolving a config from the environment when none is given.
pub async fn call_llm(messages: &[Message], config: Option<&Config>) -> LlmResult<String> {
    let resolved;
    let config = match config {
        Some(config) => config,
        None => {
            resolved = Config::from_env()?;
            &resolved
        }
    };
    Ok(complete(messages, config).await?)
}

/// Sends a single user prompt.
pub async fn call_llm_prompt(prompt: &str, config: Option<&Config>) -> LlmResult<String> {
    call_llm(&[Message::user(prompt)], config).await
}

/// Initialize the logging system
///
/// This should be called at the start of your application in case
/// you want to activate the library's debug and info logging.
pub fn use_logging() {
    env_logger::init();
}
