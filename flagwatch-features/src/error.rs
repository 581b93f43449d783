//! Error types for flag watching

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureError {
    /// Writing to the display sink failed
    #[error("Display sink error: {0}")]
    Sink(#[from] std::io::Error),

    #[error("Invalid evaluation context: {0}")]
    InvalidContext(String),

    #[error("SDK error: {0}")]
    Sdk(String),

    #[error("SDK did not initialize within {0:?}")]
    NotInitialized(std::time::Duration),

    #[error("Flag tracker is closed")]
    TrackerClosed,

    #[error("No tokio runtime available to run the flag tracker")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, FeatureError>;
