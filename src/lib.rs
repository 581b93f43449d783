// flagwatch - watch a LaunchDarkly feature flag from the terminal
//
// Evaluates one boolean flag for one context, prints the result, and keeps
// printing as the value changes. The first time the flag turns on a welcome
// banner is shown.

pub mod app;
pub mod error;
pub mod logging;

pub use error::{AppError, AppResult};

// Re-export member crates
pub use flagwatch_config;
pub use flagwatch_features;
