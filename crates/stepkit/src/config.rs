//! Engine configuration.

use crate::assertion::{AllOfMode, RetryConfig};
use crate::locator::Viewport;
use crate::result::StepResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default polling timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

/// Default polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Settings shared by every step of a scenario
///
/// ```yaml
/// viewport: { width: 1280, height: 720 }
/// timeout_ms: 8000
/// poll_interval_ms: 100
/// all_of_mode: every
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Viewport used by the `in viewport` condition
    pub viewport: Viewport,
    /// How long `should` keeps polling
    pub timeout_ms: u64,
    /// Pause between polling attempts
    pub poll_interval_ms: u64,
    /// Semantics of `all of` validations
    pub all_of_mode: AllOfMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            all_of_mode: AllOfMode::default(),
        }
    }
}

impl EngineConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport size
    #[must_use]
    pub const fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Set the polling timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the `all of` semantics
    #[must_use]
    pub const fn with_all_of_mode(mut self, mode: AllOfMode) -> Self {
        self.all_of_mode = mode;
        self
    }

    /// Polling settings for drivers
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(Duration::from_millis(self.timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Parse from YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> StepResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> StepResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.viewport, Viewport::new(1000.0, 660.0));
        assert_eq!(config.all_of_mode, AllOfMode::FirstMatch);
        assert_eq!(config.retry_config().timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_viewport(800.0, 600.0)
            .with_timeout_ms(10)
            .with_poll_interval_ms(1)
            .with_all_of_mode(AllOfMode::Every);
        assert_eq!(config.viewport.height, 600.0);
        assert_eq!(config.retry_config().poll_interval, Duration::from_millis(1));
        assert_eq!(config.all_of_mode, AllOfMode::Every);
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml_str("all_of_mode: every\ntimeout_ms: 100\n").unwrap();
        assert_eq!(config.all_of_mode, AllOfMode::Every);
        assert_eq!(config.timeout_ms, 100);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "viewport:\n  width: 320\n  height: 480").unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.viewport, Viewport::new(320.0, 480.0));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_yaml_str("timeout: 100\n").unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(EngineConfig::from_yaml_str("timeout_ms: [1, 2]").is_err());
    }
}
