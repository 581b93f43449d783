//! Display sinks
//!
//! Where the welcome banner and evaluation results are written.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Banner printed the first time the watched flag evaluates to `true`
pub const WELCOME_BANNER: &str = r#"
        ██
          ██
      ████████
         ███████
██ LAUNCHDARKLY █
         ███████
      ████████
          ██
        ██
"#;

/// Output for the banner and per-event evaluation reports
pub trait DisplaySink: Send + Sync {
    fn show_welcome_banner(&self) -> io::Result<()>;

    fn show_evaluation_result(&self, key: &str, value: bool) -> io::Result<()>;
}

impl<S: DisplaySink + ?Sized> DisplaySink for Arc<S> {
    fn show_welcome_banner(&self) -> io::Result<()> {
        (**self).show_welcome_banner()
    }

    fn show_evaluation_result(&self, key: &str, value: bool) -> io::Result<()> {
        (**self).show_evaluation_result(key, value)
    }
}

/// Sink writing human-readable lines to a writer (stdout by default)
pub struct ConsoleSink<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> DisplaySink for ConsoleSink<W> {
    fn show_welcome_banner(&self) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{}", WELCOME_BANNER)?;
        out.flush()
    }

    fn show_evaluation_result(&self, key: &str, value: bool) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "\n*** The {} feature flag evaluates to {}", key, value)?;
        out.flush()
    }
}

/// Message recorded by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkMessage {
    WelcomeBanner,
    EvaluationResult { key: String, value: bool },
}

/// Sink that records every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<SinkMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SinkMessage> {
        self.messages.lock().clone()
    }

    pub fn banner_count(&self) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|m| matches!(m, SinkMessage::WelcomeBanner))
            .count()
    }

    /// Reported values in the order they were written
    pub fn reported_values(&self) -> Vec<bool> {
        self.messages
            .lock()
            .iter()
            .filter_map(|m| match m {
                SinkMessage::EvaluationResult { value, .. } => Some(*value),
                SinkMessage::WelcomeBanner => None,
            })
            .collect()
    }
}

impl DisplaySink for MemorySink {
    fn show_welcome_banner(&self) -> io::Result<()> {
        self.messages.lock().push(SinkMessage::WelcomeBanner);
        Ok(())
    }

    fn show_evaluation_result(&self, key: &str, value: bool) -> io::Result<()> {
        self.messages.lock().push(SinkMessage::EvaluationResult {
            key: key.to_string(),
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_evaluation_line() {
        let sink = ConsoleSink::new(Vec::new());
        sink.show_evaluation_result("sample-feature", true).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "\n*** The sample-feature feature flag evaluates to true\n");
    }

    #[test]
    fn test_console_banner() {
        let sink = ConsoleSink::new(Vec::new());
        sink.show_welcome_banner().unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("██ LAUNCHDARKLY █"));
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.show_evaluation_result("a", false).unwrap();
        sink.show_welcome_banner().unwrap();
        sink.show_evaluation_result("a", true).unwrap();

        assert_eq!(sink.banner_count(), 1);
        assert_eq!(sink.reported_values(), vec![false, true]);
        assert_eq!(sink.messages()[1], SinkMessage::WelcomeBanner);
    }

    #[test]
    fn test_shared_sink() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<MemorySink> = Arc::clone(&sink);

        shared.show_evaluation_result("a", true).unwrap();
        assert_eq!(sink.reported_values(), vec![true]);
    }
}
