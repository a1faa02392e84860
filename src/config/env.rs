//! Point-in-time snapshot of the environment variables the resolver consults.

use std::collections::HashMap;
use std::env;

use crate::constants::ENV_VARS;

/// Environment variables captured once and read from afterwards.
///
/// Empty values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// An environment with nothing set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads the process variables listed in [`ENV_VARS`].
    pub fn capture() -> Self {
        Self::capture_vars(ENV_VARS)
    }

    /// Reads the given process variables in addition to nothing else.
    pub fn capture_vars<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                env::var(name).ok().map(|value| (name.to_string(), value))
            })
            .collect();
        Self { vars }
    }

    /// Builds a snapshot from explicit pairs without touching the process.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { vars }
    }

    /// Adds the variables of `other`, overwriting on conflict.
    pub fn merged(mut self, other: Environment) -> Self {
        self.vars.extend(other.vars);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}
