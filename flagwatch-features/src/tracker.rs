//! Flag Tracker
//!
//! Watches one flag for one context and calls a [`FlagChangeListener`] when
//! the evaluated value changes. Each listener runs in its own tokio task that
//! re-evaluates the flag on a fixed interval.

use crate::context::EvaluationContext;
use crate::error::{FeatureError, Result};
use crate::event::{FlagChangeEvent, FlagChangeListener};
use crate::source::FlagSource;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Identifies a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Turns repeated evaluations of a flag into change events
pub struct FlagTracker {
    source: Arc<dyn FlagSource>,
    poll_interval: Duration,
    listeners: DashMap<ListenerId, JoinHandle<()>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl FlagTracker {
    pub fn new(source: Arc<dyn FlagSource>, poll_interval: Duration) -> Self {
        Self {
            source,
            // tokio intervals panic on zero
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Register `listener` for changes of `flag_key` evaluated for `context`.
    ///
    /// The value at registration time is the baseline and produces no event.
    /// Must be called from within a tokio runtime.
    pub fn add_flag_value_change_listener(
        &self,
        flag_key: impl Into<String>,
        context: EvaluationContext,
        listener: Arc<dyn FlagChangeListener>,
    ) -> Result<ListenerId> {
        let flag_key = flag_key.into();
        let baseline = self.source.bool_variation(&context, &flag_key, false);
        self.add_flag_value_change_listener_with_baseline(flag_key, context, baseline, listener)
    }

    /// Register `listener` with a value the caller already evaluated.
    ///
    /// The first poll compares against `baseline`, so a change that lands
    /// between the caller's evaluation and registration is still delivered.
    pub fn add_flag_value_change_listener_with_baseline(
        &self,
        flag_key: impl Into<String>,
        context: EvaluationContext,
        baseline: bool,
        listener: Arc<dyn FlagChangeListener>,
    ) -> Result<ListenerId> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FeatureError::TrackerClosed);
        }
        let runtime = Handle::try_current().map_err(|_| FeatureError::NoRuntime)?;

        let flag_key = flag_key.into();
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));

        info!(
            flag_key = %flag_key,
            context_key = %context.key(),
            baseline,
            "Watching flag for changes"
        );

        let watch = FlagWatch {
            source: Arc::clone(&self.source),
            flag_key,
            context,
            last_value: baseline,
            listener,
        };
        let handle = runtime.spawn(watch.run(self.poll_interval));
        self.listeners.insert(id, handle);

        Ok(id)
    }

    /// Stop delivering changes to a listener. Returns `false` if it was not registered.
    pub fn remove_flag_value_change_listener(&self, id: ListenerId) -> bool {
        match self.listeners.remove(&id) {
            Some((_, handle)) => {
                handle.abort();
                debug!(listener = id.0, "Removed flag change listener");
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop every listener. Further registrations fail.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.listeners.retain(|_, handle| {
            handle.abort();
            false
        });
        debug!("Flag tracker closed");
    }
}

impl Drop for FlagTracker {
    fn drop(&mut self) {
        self.close();
    }
}

struct FlagWatch {
    source: Arc<dyn FlagSource>,
    flag_key: String,
    context: EvaluationContext,
    last_value: bool,
    listener: Arc<dyn FlagChangeListener>,
}

impl FlagWatch {
    async fn run(mut self, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the baseline covers it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.poll();
        }
    }

    fn poll(&mut self) {
        // An unevaluable flag keeps its last value.
        let current = self
            .source
            .bool_variation(&self.context, &self.flag_key, self.last_value);
        if current == self.last_value {
            return;
        }

        let event = FlagChangeEvent::transition(self.flag_key.clone(), self.last_value, current);
        self.last_value = current;
        debug!(flag_key = %event.key, old = ?event.old_value, new = event.new_value, "Flag value changed");

        if let Err(e) = self.listener.on_flag_change(&event) {
            error!(flag_key = %event.key, error = %e, "Flag change listener failed");
        }
    }
}
