//! Result and error types for stepkit.

use thiserror::Error;

/// Result type for stepkit operations
pub type StepResult<T> = Result<T, StepError>;

/// Errors that can occur while resolving or validating a step
#[derive(Debug, Error)]
pub enum StepError {
    /// A validation or condition phrase did not match its grammar
    #[error("{message}")]
    Grammar {
        /// Phrase as written in the step
        phrase: String,
        /// Error message
        message: String,
    },

    /// Page-object alias missing from the current component
    #[error("Alias '{alias}' has not been found in '{parent}'")]
    AliasNotFound {
        /// Alias that was looked up
        alias: String,
        /// Alias of the enclosing component
        parent: String,
    },

    /// A path segment tried to descend into a plain element
    #[error("Alias '{alias}' is not a component")]
    NotAComponent {
        /// Alias that has no child component
        alias: String,
    },

    /// Memory expression or locator could not be resolved
    #[error("{message}")]
    Resolution {
        /// Error message
        message: String,
    },

    /// A comparison did not hold
    #[error("{message}")]
    Assertion {
        /// Error message
        message: String,
        /// Rendered actual value
        actual: String,
        /// Rendered expected value
        expected: String,
    },

    /// Operand of the wrong kind for a comparison
    #[error("{message}")]
    Type {
        /// Error message
        message: String,
    },

    /// Soft assertions collected during the scenario failed
    #[error("{count} soft assertion(s) failed:\n{summary}")]
    SoftAssertions {
        /// Number of failures
        count: usize,
        /// Joined failure messages
        summary: String,
    },

    /// Invalid configuration or page-object definition
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Driver-level failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StepError {
    /// Create a grammar error for an unsupported phrase
    pub fn grammar(phrase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Grammar {
            phrase: phrase.into(),
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion error
    pub fn assertion(
        message: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Assertion {
            message: message.into(),
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Whether this error is a failed comparison (as opposed to a usage error)
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_errors_name_alias_and_parent() {
        let err = StepError::AliasNotFound {
            alias: "Buton".to_string(),
            parent: "App".to_string(),
        };
        assert_eq!(err.to_string(), "Alias 'Buton' has not been found in 'App'");

        let err = StepError::NotAComponent {
            alias: "Header".to_string(),
        };
        assert_eq!(err.to_string(), "Alias 'Header' is not a component");
    }

    #[test]
    fn test_assertion_classification() {
        assert!(StepError::assertion("expected 1 to equal 2", "1", "2").is_assertion());
        assert!(!StepError::type_error("x is not a number").is_assertion());
        assert!(!StepError::grammar("foo", "validation 'foo' is not supported").is_assertion());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: StepError = io.into();
        assert!(err.to_string().contains("missing"));
    }
}
