//! Flag change events and the listener interface

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A change in the evaluated value of a watched flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagChangeEvent {
    /// Flag key
    pub key: String,

    /// Value observed before the change, when known
    pub old_value: Option<bool>,

    /// Newly evaluated value
    pub new_value: bool,
}

impl FlagChangeEvent {
    pub fn new(key: impl Into<String>, new_value: bool) -> Self {
        Self {
            key: key.into(),
            old_value: None,
            new_value,
        }
    }

    /// Event for an observed `old_value -> new_value` transition
    pub fn transition(key: impl Into<String>, old_value: bool, new_value: bool) -> Self {
        Self {
            key: key.into(),
            old_value: Some(old_value),
            new_value,
        }
    }
}

/// Handler invoked whenever a watched flag's value changes.
///
/// Called from whatever thread delivers changes, so implementations must be
/// `Send + Sync`. An error is returned to the deliverer, which logs it; there
/// is no retry.
pub trait FlagChangeListener: Send + Sync {
    fn on_flag_change(&self, event: &FlagChangeEvent) -> Result<()>;
}

impl<F> FlagChangeListener for F
where
    F: Fn(&FlagChangeEvent) -> Result<()> + Send + Sync,
{
    fn on_flag_change(&self, event: &FlagChangeEvent) -> Result<()> {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_constructors() {
        let event = FlagChangeEvent::new("sample-feature", true);
        assert_eq!(event.old_value, None);

        let event = FlagChangeEvent::transition("sample-feature", false, true);
        assert_eq!(event.old_value, Some(false));
        assert!(event.new_value);
    }

    #[test]
    fn test_event_serializes() {
        let event = FlagChangeEvent::transition("sample-feature", true, false);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["key"], "sample-feature");
        assert_eq!(json["old_value"], true);
        assert_eq!(json["new_value"], false);
    }

    #[test]
    fn test_closure_listener() {
        let calls = AtomicUsize::new(0);
        let listener = |_: &FlagChangeEvent| -> Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        listener
            .on_flag_change(&FlagChangeEvent::new("sample-feature", true))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
