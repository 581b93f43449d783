//! Configuration for flagwatch
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Process environment (after loading `.env` through `dotenvy`)
//! 2. An optional TOML or JSON file
//! 3. Command-line overrides applied by the binary
//!
//! # Environment Variables
//!
//! - `ENVIRONMENT` - `dev` (default), `staging` or `prod`
//! - `LAUNCHDARKLY_SDK_KEY_DEV` / `_STAGING` / `_PROD` - SDK key per environment
//! - `LAUNCHDARKLY_FLAG_KEY` - Flag to watch (default `sample-feature`)
//! - `FLAGWATCH_CONTEXT_KEY`, `FLAGWATCH_CONTEXT_KIND`, `FLAGWATCH_CONTEXT_NAME`
//! - `FLAGWATCH_POLL_INTERVAL_MS`, `FLAGWATCH_INIT_TIMEOUT_SECS`
//! - `FLAGWATCH_SEND_EVENTS` - Send analytics events to LaunchDarkly (default `false`)
//!
//! ```
//! use flagwatch_config::{EnvLoader, FlagwatchConfig};
//!
//! let loader = EnvLoader::from_map([("LAUNCHDARKLY_SDK_KEY_DEV", "sdk-123")]);
//! let config = FlagwatchConfig::from_env(&loader).unwrap();
//!
//! assert_eq!(config.flag_key, "sample-feature");
//! assert_eq!(config.sdk_key().unwrap(), "sdk-123");
//! ```

pub mod env;
pub mod environment;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use environment::Environment;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat, merge_values};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Flag watched when `LAUNCHDARKLY_FLAG_KEY` is unset
pub const DEFAULT_FLAG_KEY: &str = "sample-feature";

/// Default evaluation context
pub const DEFAULT_CONTEXT_KEY: &str = "example-user-key";
pub const DEFAULT_CONTEXT_KIND: &str = "user";
pub const DEFAULT_CONTEXT_NAME: &str = "Sandy";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_INIT_TIMEOUT_SECS: u64 = 5;

/// SDK keys, one per environment
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod: Option<String>,
}

impl SdkKeys {
    pub fn get(&self, environment: Environment) -> Option<&str> {
        let key = match environment {
            Environment::Dev => &self.dev,
            Environment::Staging => &self.staging,
            Environment::Prod => &self.prod,
        };
        key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn set(&mut self, environment: Environment, key: impl Into<String>) {
        let slot = match environment {
            Environment::Dev => &mut self.dev,
            Environment::Staging => &mut self.staging,
            Environment::Prod => &mut self.prod,
        };
        *slot = Some(key.into());
    }
}

// Keys are secrets; never print them.
impl fmt::Debug for SdkKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("SdkKeys")
            .field("dev", &redact(&self.dev))
            .field("staging", &redact(&self.staging))
            .field("prod", &redact(&self.prod))
            .finish()
    }
}

/// Settings for the context the flag is evaluated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    pub key: String,
    pub kind: String,
    pub name: Option<String>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_CONTEXT_KEY.to_string(),
            kind: DEFAULT_CONTEXT_KIND.to_string(),
            name: Some(DEFAULT_CONTEXT_NAME.to_string()),
        }
    }
}

/// Complete flagwatch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagwatchConfig {
    pub environment: Environment,
    pub sdk_keys: SdkKeys,
    pub flag_key: String,
    pub context: ContextSettings,
    pub poll_interval_ms: u64,
    pub init_timeout_secs: u64,
    /// Whether the SDK reports evaluations and other analytics events
    pub send_events: bool,
}

impl Default for FlagwatchConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            sdk_keys: SdkKeys::default(),
            flag_key: DEFAULT_FLAG_KEY.to_string(),
            context: ContextSettings::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            init_timeout_secs: DEFAULT_INIT_TIMEOUT_SECS,
            send_events: false,
        }
    }
}

impl FlagwatchConfig {
    /// Load a `.env` file, then read the process environment.
    ///
    /// Without a path, `./.env` is used when present.
    pub fn load(dotenv: Option<&str>) -> Result<Self> {
        EnvLoader::load_dotenv(dotenv)?;
        Self::from_env(&EnvLoader::default())
    }

    /// Build configuration from environment variables
    pub fn from_env(loader: &EnvLoader) -> Result<Self> {
        let defaults = Self::default();

        let environment = match loader.load_opt("ENVIRONMENT") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let mut sdk_keys = SdkKeys::default();
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            if let Some(key) = loader.load_opt(env.sdk_key_var()) {
                sdk_keys.set(env, key);
            }
        }

        let context = ContextSettings {
            key: loader.load_var_or("FLAGWATCH_CONTEXT_KEY", &defaults.context.key),
            kind: loader.load_var_or("FLAGWATCH_CONTEXT_KIND", &defaults.context.kind),
            name: loader
                .load_opt("FLAGWATCH_CONTEXT_NAME")
                .or(defaults.context.name),
        };

        Ok(Self {
            environment,
            sdk_keys,
            flag_key: loader.load_var_or("LAUNCHDARKLY_FLAG_KEY", &defaults.flag_key),
            context,
            poll_interval_ms: loader
                .load_parsed_or("FLAGWATCH_POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            init_timeout_secs: loader
                .load_parsed_or("FLAGWATCH_INIT_TIMEOUT_SECS", defaults.init_timeout_secs)?,
            send_events: loader.load_parsed_or("FLAGWATCH_SEND_EVENTS", defaults.send_events)?,
        })
    }

    /// Overlay settings from a TOML or JSON file
    pub fn merge_file(self, path: &Path) -> Result<Self> {
        let overlay = ConfigLoader::auto(path)?.load_file(path)?;
        self.merge_value(overlay)
    }

    /// Overlay settings from an already parsed value
    pub fn merge_value(self, overlay: serde_json::Value) -> Result<Self> {
        let mut base = serde_json::to_value(&self)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        merge_values(&mut base, overlay);

        serde_json::from_value(base).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// SDK key for the selected environment
    pub fn sdk_key(&self) -> Result<&str> {
        self.sdk_keys
            .get(self.environment)
            .ok_or_else(|| ConfigError::MissingSdkKey(self.environment.to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

impl Validate for FlagwatchConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_key(&self.flag_key, "flag_key")?;
        ConfigValidator::not_empty(&self.context.key, "context.key")?;
        ConfigValidator::not_empty(&self.context.kind, "context.kind")?;
        ConfigValidator::in_range(self.poll_interval_ms, 50, 3_600_000, "poll_interval_ms")?;
        ConfigValidator::in_range(self.init_timeout_secs, 1, 300, "init_timeout_secs")?;
        Ok(())
    }
}
