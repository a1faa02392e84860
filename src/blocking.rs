//! Synchronous entry points.
//!
//! Each call blocks the current thread until the backend answers or fails.
//! None of these may be called from inside an async runtime.

use crate::config::Config;
use crate::errors::{DispatchResult, LlmResult};
use crate::providers::{Dispatcher, Message};

/// Blocking form of [`crate::complete`].
pub fn complete(messages: &[Message], config: &Config) -> DispatchResult<String> {
    Dispatcher::blocking().complete_blocking(messages, config)
}

/// Blocking form of [`crate::call_llm`].
pub fn call_llm(messages: &[Message], config: Option<&Config>) -> LlmResult<String> {
    let resolved;
    let config = match config {
        Some(config) => config,
        None => {
            resolved = Config::from_env()?;
            &resolved
        }
    };
    Ok(complete(messages, config)?)
}

/// Blocking form of [`crate::call_llm_prompt`].
pub fn call_llm_prompt(prompt: &str, config: Option<&Config>) -> LlmResult<String> {
    call_llm(&[Message::user(prompt)], config)
}
