//! LaunchDarkly Source
//!
//! [`FlagSource`] backed by the LaunchDarkly server-side SDK.

use crate::context::EvaluationContext;
use crate::error::{FeatureError, Result};
use crate::source::FlagSource;
use launchdarkly_server_sdk::{
    Client, ConfigBuilder, Context, ContextBuilder, NullEventProcessorBuilder,
};
use tracing::{debug, warn};

/// LaunchDarkly client wrapped as a flag source
pub struct LaunchDarklySource {
    client: Client,
}

impl LaunchDarklySource {
    /// Build the client and start it on the current tokio runtime.
    ///
    /// Returns immediately; use [`wait_until_initialized`](crate::wait_until_initialized)
    /// to wait for flag data. Unless `send_events` is set, no analytics
    /// events are sent, so the tracker's periodic evaluations do not show up
    /// in LaunchDarkly's evaluation counts.
    pub fn connect(sdk_key: &str, send_events: bool) -> Result<Self> {
        let mut builder = ConfigBuilder::new(sdk_key);
        if !send_events {
            builder = builder.event_processor(&NullEventProcessorBuilder::new());
        }
        let config = builder
            .build()
            .map_err(|e| FeatureError::Sdk(e.to_string()))?;
        let client = Client::build(config).map_err(|e| FeatureError::Sdk(e.to_string()))?;

        client.start_with_default_executor();
        debug!(send_events, "LaunchDarkly client started");

        Ok(Self { client })
    }
}

fn to_sdk_context(context: &EvaluationContext) -> Result<Context> {
    let mut builder = ContextBuilder::new(context.key());
    builder.kind(context.kind());
    if let Some(name) = context.name() {
        builder.name(name);
    }
    for (attribute, value) in context.attributes() {
        builder.set_string(attribute, value);
    }
    builder.build().map_err(FeatureError::InvalidContext)
}

impl FlagSource for LaunchDarklySource {
    fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    fn bool_variation(&self, context: &EvaluationContext, flag_key: &str, default: bool) -> bool {
        match to_sdk_context(context) {
            Ok(sdk_context) => self.client.bool_variation(&sdk_context, flag_key, default),
            Err(e) => {
                warn!(flag_key, error = %e, "Falling back to default value");
                default
            }
        }
    }

    fn close(&self) {
        self.client.close();
    }
}
