// Environment variable lookup

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Where variables are read from.
enum Source {
    Process,
    Fixed(HashMap<String, String>),
}

/// Environment variable loader
///
/// Reads from the process environment by default. Tests build one from a map
/// so nothing has to call `std::env::set_var`.
pub struct EnvLoader {
    source: Source,
}

impl EnvLoader {
    /// Create a loader over the process environment
    pub fn new() -> Self {
        Self {
            source: Source::Process,
        }
    }

    /// Create a loader over a fixed set of variables
    pub fn from_map<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: Source::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Load `.env` from the working directory into the process environment.
    ///
    /// A missing file is not an error.
    pub fn load_dotenv(path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(())
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = key.to_uppercase();

        match self.source {
            Source::Process => env::var(&full_key).map_err(ConfigError::EnvError),
            Source::Fixed(ref vars) => vars
                .get(&full_key)
                .cloned()
                .ok_or(ConfigError::KeyNotFound(full_key)),
        }
    }

    /// Load a variable, treating an empty value as unset
    pub fn load_opt(&self, key: &str) -> Option<String> {
        self.load_var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and parse a variable, falling back to `default` when unset
    pub fn load_parsed_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.load_opt(key) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::ParseError(format!("{} has an invalid value: {}", key, raw))
            }),
            None => Ok(default),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new()
    }
}
