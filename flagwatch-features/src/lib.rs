//! Flag watching for flagwatch
//!
//! Evaluates a boolean feature flag, tracks changes to its value and shows a
//! one-time welcome banner the first time it turns on.
//!
//! # Features
//!
//! - **Change Gate** - [`ChangeNotificationGate`] reports every change and
//!   shows the banner at most once
//! - **Flag Tracker** - Turns repeated evaluations into [`FlagChangeEvent`]s
//! - **Display Sinks** - Console output, or in-memory recording for tests
//! - **LaunchDarkly** - Optional SDK-backed [`FlagSource`] (`launchdarkly` feature)
//!
//! # Quick Start
//!
//! ```
//! use flagwatch_features::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let source = Arc::new(InMemoryFlagSource::new().with_flag("sample-feature", false));
//! let tracker = FlagTracker::new(source.clone(), Duration::from_millis(500));
//!
//! let context = EvaluationContext::builder("example-user-key").name("Sandy").build()?;
//! let gate = Arc::new(ChangeNotificationGate::new(ConsoleSink::stdout()));
//! tracker.add_flag_value_change_listener("sample-feature", context, gate)?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod event;
pub mod gate;
#[cfg(feature = "launchdarkly")]
pub mod launchdarkly;
pub mod sink;
pub mod source;
pub mod tracker;

pub use context::{EvaluationContext, EvaluationContextBuilder};
pub use error::{FeatureError, Result};
pub use event::{FlagChangeEvent, FlagChangeListener};
pub use gate::ChangeNotificationGate;
#[cfg(feature = "launchdarkly")]
pub use launchdarkly::LaunchDarklySource;
pub use sink::{ConsoleSink, DisplaySink, MemorySink, SinkMessage, WELCOME_BANNER};
pub use source::{FlagSource, InMemoryFlagSource, wait_until_initialized};
pub use tracker::{FlagTracker, ListenerId};
