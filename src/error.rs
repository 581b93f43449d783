//! Error types for the flagwatch program.

use flagwatch_config::ConfigError;
use flagwatch_features::FeatureError;
use thiserror::Error;

/// Result type for program operations.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("Display sink error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Console line shown to the user for failures the program expects.
    pub fn status_line(&self) -> Option<String> {
        match self {
            AppError::Config(
                ConfigError::MissingSdkKey(environment) | ConfigError::UnknownEnvironment(environment),
            ) => Some(format!(
                "*** SDK key for '{}' environment is not set.",
                environment
            )),
            AppError::Feature(FeatureError::NotInitialized(_)) => Some(
                "*** SDK failed to initialize. Check internet connection and SDK key.".to_string(),
            ),
            _ => None,
        }
    }
}
