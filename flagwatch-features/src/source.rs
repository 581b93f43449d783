//! Flag Sources
//!
//! The part of an SDK client flagwatch needs: an initialized check, boolean
//! evaluation and shutdown.

use crate::context::EvaluationContext;
use crate::error::{FeatureError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

const INIT_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Evaluates flags for a context
pub trait FlagSource: Send + Sync {
    /// Whether the source has received its flag data
    fn is_initialized(&self) -> bool;

    /// Evaluate a boolean flag, returning `default` when it cannot be evaluated
    fn bool_variation(&self, context: &EvaluationContext, flag_key: &str, default: bool) -> bool;

    /// Release the underlying client
    fn close(&self);
}

/// Wait until `source` reports it is initialized or `timeout` elapses.
///
/// Checks every 100ms.
pub async fn wait_until_initialized(source: &dyn FlagSource, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;

    while !source.is_initialized() {
        if Instant::now() >= deadline {
            warn!(?timeout, "Flag source did not initialize");
            return Err(FeatureError::NotInitialized(timeout));
        }
        tokio::time::sleep(INIT_CHECK_INTERVAL).await;
    }

    info!("Flag source initialized");
    Ok(())
}

/// Source backed by an in-memory table of flag values.
///
/// Every context sees the same value. Used by tests and local runs.
#[derive(Debug)]
pub struct InMemoryFlagSource {
    flags: RwLock<HashMap<String, bool>>,
    initialized: AtomicBool,
    closed: AtomicBool,
    evaluations: AtomicUsize,
}

impl InMemoryFlagSource {
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn with_flag(self, key: impl Into<String>, value: bool) -> Self {
        self.set_flag(key, value);
        self
    }

    pub fn set_flag(&self, key: impl Into<String>, value: bool) {
        self.flags.write().insert(key.into(), value);
    }

    pub fn remove_flag(&self, key: &str) -> Option<bool> {
        self.flags.write().remove(key)
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of `bool_variation` calls served
    pub fn evaluation_count(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryFlagSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagSource for InMemoryFlagSource {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst) && !self.is_closed()
    }

    fn bool_variation(&self, _context: &EvaluationContext, flag_key: &str, default: bool) -> bool {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return default;
        }
        self.flags.read().get(flag_key).copied().unwrap_or(default)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
