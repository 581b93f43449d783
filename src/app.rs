//! Program flow
//!
//! Evaluate the flag once, report it, then hand every later change to a
//! [`ChangeNotificationGate`] until shutdown.

use crate::error::AppResult;
use flagwatch_config::{ContextSettings, FlagwatchConfig};
use flagwatch_features::{
    ChangeNotificationGate, DisplaySink, EvaluationContext, FlagSource, FlagTracker,
};
use std::future::Future;
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the evaluation context described by the configuration.
pub fn build_context(settings: &ContextSettings) -> AppResult<EvaluationContext> {
    let mut builder = EvaluationContext::builder(settings.key.as_str()).kind(settings.kind.as_str());
    if let Some(ref name) = settings.name {
        builder = builder.name(name.as_str());
    }
    Ok(builder.build()?)
}

/// Report the flag's current value, then watch it until `shutdown` resolves.
///
/// The first report goes straight to the sink; only later changes pass
/// through the gate. The reported value seeds the tracker, so a flip right
/// after the first evaluation still reaches the gate. The tracker and the
/// source are closed before returning.
pub async fn watch_flag<S, F>(
    config: &FlagwatchConfig,
    source: Arc<dyn FlagSource>,
    sink: Arc<S>,
    shutdown: F,
) -> AppResult<()>
where
    S: DisplaySink + 'static,
    F: Future<Output = ()>,
{
    let context = build_context(&config.context)?;

    let value = source.bool_variation(&context, &config.flag_key, false);
    sink.show_evaluation_result(&config.flag_key, value)?;

    let tracker = FlagTracker::new(Arc::clone(&source), config.poll_interval());
    let gate = Arc::new(ChangeNotificationGate::new(sink));
    tracker.add_flag_value_change_listener_with_baseline(
        config.flag_key.clone(),
        context,
        value,
        gate,
    )?;

    shutdown.await;

    tracker.close();
    source.close();
    info!(flag_key = %config.flag_key, "Stopped watching flag");
    Ok(())
}

const INTERRUPTED: &str = "\n*** Program interrupted. Exiting...";

/// Resolves on Ctrl-C, or when the signal handler cannot be installed.
pub async fn interrupted() {
    if let Some(line) = interrupt_notice(tokio::signal::ctrl_c().await) {
        println!("{}", line);
    }
}

/// Console line for the outcome of waiting on Ctrl-C, if any.
fn interrupt_notice(signal: io::Result<()>) -> Option<&'static str> {
    match signal {
        Ok(()) => Some(INTERRUPTED),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
            None
        }
    }
}

/// Connect to LaunchDarkly and watch the configured flag until Ctrl-C.
#[cfg(feature = "launchdarkly")]
pub async fn run(config: FlagwatchConfig) -> AppResult<()> {
    use flagwatch_features::{ConsoleSink, LaunchDarklySource, wait_until_initialized};

    let sdk_key = config.sdk_key()?;
    info!(
        environment = %config.environment,
        flag_key = %config.flag_key,
        "Starting LaunchDarkly client"
    );

    let source = LaunchDarklySource::connect(sdk_key, config.send_events)?;
    if let Err(e) = wait_until_initialized(&source, config.init_timeout()).await {
        source.close();
        return Err(e.into());
    }
    println!("*** SDK successfully initialized");

    let source: Arc<dyn FlagSource> = Arc::new(source);
    watch_flag(&config, source, Arc::new(ConsoleSink::stdout()), interrupted()).await
}
