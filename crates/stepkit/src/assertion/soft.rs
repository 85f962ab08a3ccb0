//! Soft assertions.
//!
//! A `softly` validation that fails is recorded here instead of failing the
//! step; [`SoftAssertions::verify`] reports everything collected at the end
//! of the scenario.

use crate::result::{StepError, StepResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Step or phrase that produced the failure
    pub location: Option<String>,
    /// Index of this failure in the sequence
    pub index: usize,
}

impl AssertionFailure {
    /// Create a new assertion failure
    #[must_use]
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            location: None,
            index,
        }
    }

    /// Set the location of the failure
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Soft assertions collector
#[derive(Debug, Default, Clone)]
pub struct SoftAssertions {
    failures: Vec<AssertionFailure>,
    assertion_count: usize,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a soft assertion that passed
    pub fn record_pass(&mut self) {
        self.assertion_count += 1;
    }

    /// Record a failed soft assertion
    pub fn record_failure(&mut self, message: impl Into<String>, location: Option<&str>) {
        self.assertion_count += 1;
        let mut failure = AssertionFailure::new(message, self.failures.len());
        if let Some(location) = location {
            failure = failure.with_location(location);
        }
        warn!(index = failure.index, message = %failure.message, "soft assertion failed");
        self.failures.push(failure);
    }

    /// Get all failures
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get the total number of soft assertions checked
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fail with every recorded message if anything failed
    pub fn verify(&self) -> StepResult<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let summary = self
            .failures
            .iter()
            .map(|f| match &f.location {
                Some(location) => format!("  {}. {location}: {}", f.index + 1, f.message),
                None => format!("  {}. {}", f.index + 1, f.message),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Err(StepError::SoftAssertions {
            count: self.failures.len(),
            summary,
        })
    }

    /// Clear all recorded failures
    pub fn clear(&mut self) {
        self.failures.clear();
        self.assertion_count = 0;
    }

    /// Get a summary of the assertions
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count - self.failures.len(),
            failed: self.failures.len(),
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}
