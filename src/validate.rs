//! Validation with retry
//!
//! `ValidateWithRetry` turns an external validator's failure into a boolean
//! decision plus a stored, read-once diagnostic. It holds per-attempt state and
//! belongs to exactly one retry loop.

use crate::error::GenerationError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A post-generation constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub message: String,
    #[serde(default)]
    pub violated_paths: BTreeSet<String>,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            violated_paths: BTreeSet::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.violated_paths.insert(path.into());
        self
    }

    /// Synthetic failure for an attempt that produced no instance at all.
    pub fn from_generation(err: &GenerationError) -> Self {
        let failure = Self::new(err.to_string());
        match err {
            GenerationError::RecursionLimit { path, .. } => failure.with_path(path.clone()),
            _ => failure,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.violated_paths.is_empty() {
            let paths: Vec<&str> = self.violated_paths.iter().map(String::as_str).collect();
            write!(f, " (violated: {})", paths.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// External constraint validator.
pub trait Validator: Send + Sync {
    /// `Err` describes the violation and the property paths it concerns.
    fn validate(&self, instance: &Value) -> Result<(), ValidationFailure>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), ValidationFailure> + Send + Sync,
{
    fn validate(&self, instance: &Value) -> Result<(), ValidationFailure> {
        self(instance)
    }
}

/// Validator that accepts every instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _instance: &Value) -> Result<(), ValidationFailure> {
        Ok(())
    }
}

/// Validator wrapper that remembers only the most recent failure.
pub struct ValidateWithRetry {
    validator: Arc<dyn Validator>,
    last_failure: Option<ValidationFailure>,
}

impl ValidateWithRetry {
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self {
            validator,
            last_failure: None,
        }
    }

    /// Validate `instance`. Success clears the stored failure; a violation is
    /// stored and reported as `false`.
    pub fn try_validate(&mut self, instance: &Value) -> bool {
        match self.validator.validate(instance) {
            Ok(()) => {
                self.last_failure = None;
                true
            }
            Err(failure) => {
                debug!(failure = %failure, "Instance rejected by validator");
                self.last_failure = Some(failure);
                false
            }
        }
    }

    /// Return and clear the stored failure.
    pub fn consume_failure(&mut self) -> Option<ValidationFailure> {
        self.last_failure.take()
    }

    /// Record a failure that did not come from the validator.
    pub fn mark_failure(&mut self, failure: ValidationFailure) {
        self.last_failure = Some(failure);
    }
}
