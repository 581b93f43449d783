//! Evaluation Context
//!
//! The subject a flag is evaluated against, usually a user.

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Context kind used when none is given
pub const DEFAULT_KIND: &str = "user";

/// Evaluation context (key, kind and attributes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    key: String,
    kind: String,
    name: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl EvaluationContext {
    /// Start building a context with the given key
    ///
    /// # Examples
    ///
    /// ```
    /// use flagwatch_features::EvaluationContext;
    ///
    /// let context = EvaluationContext::builder("example-user-key")
    ///     .kind("user")
    ///     .name("Sandy")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(context.name(), Some("Sandy"));
    /// ```
    pub fn builder(key: impl Into<String>) -> EvaluationContextBuilder {
        EvaluationContextBuilder {
            key: key.into(),
            kind: DEFAULT_KIND.to_string(),
            name: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Shorthand for a `user` context with only a key
    pub fn user(key: impl Into<String>) -> Result<Self> {
        Self::builder(key).build()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(|s| s.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builder for [`EvaluationContext`]
#[derive(Debug, Clone)]
pub struct EvaluationContextBuilder {
    key: String,
    kind: String,
    name: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl EvaluationContextBuilder {
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Validate and build the context
    pub fn build(self) -> Result<EvaluationContext> {
        if self.key.is_empty() {
            return Err(FeatureError::InvalidContext(
                "context key cannot be empty".to_string(),
            ));
        }

        let kind_ok = !self.kind.is_empty()
            && self.kind != "kind"
            && self.kind != "multi"
            && self
                .kind
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !kind_ok {
            return Err(FeatureError::InvalidContext(format!(
                "invalid context kind: {:?}",
                self.kind
            )));
        }

        Ok(EvaluationContext {
            key: self.key,
            kind: self.kind,
            name: self.name,
            attributes: self.attributes,
        })
    }
}
