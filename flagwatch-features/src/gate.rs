//! First-change banner gate
//!
//! Forwards every flag change to a [`DisplaySink`] and, the first time the
//! flag is seen as `true`, shows the welcome banner before that report.
//! After the banner has been shown it is never shown again, even if the flag
//! later goes `false -> true`.

use crate::error::Result;
use crate::event::{FlagChangeEvent, FlagChangeListener};
use crate::sink::DisplaySink;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct GateState {
    banner_shown: bool,
}

/// Change listener that shows a one-time welcome banner.
///
/// # Examples
///
/// ```
/// use flagwatch_features::{ChangeNotificationGate, FlagChangeEvent, FlagChangeListener, MemorySink};
///
/// let gate = ChangeNotificationGate::new(MemorySink::new());
/// for value in [false, true, true] {
///     gate.on_flag_change(&FlagChangeEvent::new("sample-feature", value)).unwrap();
/// }
///
/// assert_eq!(gate.sink().banner_count(), 1);
/// assert_eq!(gate.sink().reported_values(), vec![false, true, true]);
/// ```
pub struct ChangeNotificationGate<S: DisplaySink> {
    sink: S,
    state: Mutex<GateState>,
}

impl<S: DisplaySink> ChangeNotificationGate<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Whether the welcome banner has been shown
    pub fn banner_shown(&self) -> bool {
        self.state.lock().banner_shown
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: DisplaySink> FlagChangeListener for ChangeNotificationGate<S> {
    fn on_flag_change(&self, event: &FlagChangeEvent) -> Result<()> {
        // Held across both sink writes so concurrent deliveries serialize.
        let mut state = self.state.lock();

        if !state.banner_shown && event.new_value {
            self.sink.show_welcome_banner()?;
            state.banner_shown = true;
            debug!(flag_key = %event.key, "Welcome banner shown");
        }

        self.sink.show_evaluation_result(&event.key, event.new_value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use crate::sink::{MemorySink, SinkMessage};
    use std::io;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn deliver(gate: &ChangeNotificationGate<MemorySink>, values: &[bool]) {
        for &value in values {
            gate.on_flag_change(&FlagChangeEvent::new("sample-feature", value))
                .unwrap();
        }
    }

    fn report(value: bool) -> SinkMessage {
        SinkMessage::EvaluationResult {
            key: "sample-feature".to_string(),
            value,
        }
    }

    #[test]
    fn test_banner_on_first_true() {
        let gate = ChangeNotificationGate::new(MemorySink::new());
        deliver(&gate, &[false, false, true, true, false]);

        assert_eq!(
            gate.sink().messages(),
            vec![
                report(false),
                report(false),
                SinkMessage::WelcomeBanner,
                report(true),
                report(true),
                report(false),
            ]
        );
        assert!(gate.banner_shown());
    }

    #[test]
    fn test_single_true() {
        let gate = ChangeNotificationGate::new(MemorySink::new());
        deliver(&gate, &[true]);

        assert_eq!(
            gate.sink().messages(),
            vec![SinkMessage::WelcomeBanner, report(true)]
        );
    }

    #[test]
    fn test_no_events() {
        let gate = ChangeNotificationGate::new(MemorySink::new());
        deliver(&gate, &[]);

        assert!(gate.sink().messages().is_empty());
        assert!(!gate.banner_shown());
    }

    #[test]
    fn test_never_true_never_banner() {
        let gate = ChangeNotificationGate::new(MemorySink::new());
        deliver(&gate, &[false, false, false]);

        assert_eq!(gate.sink().banner_count(), 0);
        assert_eq!(gate.sink().reported_values(), vec![false, false, false]);
    }

    #[test]
    fn test_banner_not_rearmed_after_false() {
        let gate = ChangeNotificationGate::new(MemorySink::new());
        deliver(&gate, &[true, false, true, false, true]);

        assert_eq!(gate.sink().banner_count(), 1);
        assert_eq!(
            gate.sink().reported_values(),
            vec![true, false, true, false, true]
        );
    }

    #[test]
    fn test_concurrent_deliveries_show_one_banner() {
        const THREADS: usize = 16;
        const EVENTS_PER_THREAD: usize = 50;

        let gate = Arc::new(ChangeNotificationGate::new(MemorySink::new()));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let gate = Arc::clone(&gate);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..EVENTS_PER_THREAD {
                        let value = (t + i) % 2 == 0;
                        gate.on_flag_change(&FlagChangeEvent::new("sample-feature", value))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let messages = gate.sink().messages();
        assert_eq!(gate.sink().banner_count(), 1);
        assert_eq!(
            gate.sink().reported_values().len(),
            THREADS * EVENTS_PER_THREAD
        );

        // The banner is immediately followed by a `true` report.
        let banner_at = messages
            .iter()
            .position(|m| *m == SinkMessage::WelcomeBanner)
            .unwrap();
        assert_eq!(messages[banner_at + 1], report(true));
        assert!(
            messages[..banner_at]
                .iter()
                .all(|m| *m == report(false))
        );
    }

    /// Sink whose banner write fails a configurable number of times.
    struct FlakySink {
        banner_failures: AtomicUsize,
        inner: MemorySink,
    }

    impl DisplaySink for FlakySink {
        fn show_welcome_banner(&self) -> io::Result<()> {
            if self
                .banner_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
            }
            self.inner.show_welcome_banner()
        }

        fn show_evaluation_result(&self, key: &str, value: bool) -> io::Result<()> {
            self.inner.show_evaluation_result(key, value)
        }
    }

    #[test]
    fn test_banner_failure_propagates_and_stays_pending() {
        let gate = ChangeNotificationGate::new(FlakySink {
            banner_failures: AtomicUsize::new(1),
            inner: MemorySink::new(),
        });

        let result = gate.on_flag_change(&FlagChangeEvent::new("sample-feature", true));
        assert!(matches!(result, Err(FeatureError::Sink(_))));
        assert!(!gate.banner_shown());
        assert!(gate.sink().inner.messages().is_empty());

        gate.on_flag_change(&FlagChangeEvent::new("sample-feature", true))
            .unwrap();
        assert!(gate.banner_shown());
        assert_eq!(
            gate.sink().inner.messages(),
            vec![SinkMessage::WelcomeBanner, report(true)]
        );
    }

    struct ClosedSink;

    impl DisplaySink for ClosedSink {
        fn show_welcome_banner(&self) -> io::Result<()> {
            Ok(())
        }

        fn show_evaluation_result(&self, _key: &str, _value: bool) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    #[test]
    fn test_report_failure_propagates() {
        let gate = ChangeNotificationGate::new(ClosedSink);

        let result = gate.on_flag_change(&FlagChangeEvent::new("sample-feature", false));
        assert!(matches!(result, Err(FeatureError::Sink(_))));
    }

    struct PanickingSink {
        panicked: AtomicUsize,
        inner: MemorySink,
    }

    impl DisplaySink for PanickingSink {
        fn show_welcome_banner(&self) -> io::Result<()> {
            self.inner.show_welcome_banner()
        }

        fn show_evaluation_result(&self, key: &str, value: bool) -> io::Result<()> {
            if self.panicked.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("sink exploded");
            }
            self.inner.show_evaluation_result(key, value)
        }
    }

    #[test]
    fn test_lock_released_after_sink_panic() {
        let gate = ChangeNotificationGate::new(PanickingSink {
            panicked: AtomicUsize::new(0),
            inner: MemorySink::new(),
        });

        let first = catch_unwind(AssertUnwindSafe(|| {
            gate.on_flag_change(&FlagChangeEvent::new("sample-feature", true))
        }));
        assert!(first.is_err());

        gate.on_flag_change(&FlagChangeEvent::new("sample-feature", false))
            .unwrap();
        assert!(gate.banner_shown());
        assert_eq!(gate.sink().inner.reported_values(), vec![false]);
    }
}
