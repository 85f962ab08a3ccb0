//! Per-scenario context.
//!
//! A [`World`] owns everything one scenario needs: its memory, the page
//! object, the driver, the engine configuration, and the soft-assertion
//! collector. The host runner creates one per scenario and drops it
//! afterwards, so nothing leaks between scenarios.

use crate::assertion::{RetryConfig, SoftAssertions};
use crate::config::EngineConfig;
use crate::driver::{Driver, ElementHandle};
use crate::grammar::NormalizedValidation;
use crate::locator::Locator;
use crate::memory::Memory;
use crate::page_object::PageObject;
use crate::result::{StepError, StepResult};
use crate::token::{LocatorToken, ValueToken};
use crate::value::Value;
use std::cell::RefCell;
use tracing::debug;

/// Scenario state shared by the steps
#[derive(Debug)]
pub struct World {
    memory: Memory,
    page_object: PageObject,
    driver: Box<dyn Driver>,
    config: EngineConfig,
    soft: SoftAssertions,
}

impl World {
    /// Create a world with empty memory and default configuration
    #[must_use]
    pub fn new(page_object: PageObject, driver: Box<dyn Driver>) -> Self {
        Self {
            memory: Memory::new(),
            page_object,
            driver,
            config: EngineConfig::default(),
            soft: SoftAssertions::new(),
        }
    }

    /// Seed memory
    #[must_use]
    pub fn with_memory(mut self, memory: Memory) -> Self {
        self.memory = memory;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Memory store
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable memory store
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Page-object tree
    #[must_use]
    pub const fn page_object(&self) -> &PageObject {
        &self.page_object
    }

    /// Driver root
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Soft assertions recorded so far
    #[must_use]
    pub const fn soft_assertions(&self) -> &SoftAssertions {
        &self.soft
    }

    /// Polling settings handed to the driver
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        self.config.retry_config()
    }

    /// Run `check` through the driver until it holds or the configured timeout elapses
    pub fn poll(&self, check: &dyn Fn() -> StepResult<()>) -> StepResult<()> {
        self.driver.poll(&self.retry_config(), check)
    }

    /// Poll `check` against fresh snapshots of the locator's elements
    pub fn should(
        &self,
        locator: &Locator,
        check: &dyn Fn(&[ElementHandle]) -> StepResult<()>,
    ) -> StepResult<()> {
        self.driver.should(&self.retry_config(), locator, check)
    }

    /// Resolve a value token
    pub fn value(&self, token: &ValueToken) -> StepResult<Value> {
        token.value(&self.memory)
    }

    /// Store a value in memory
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) {
        self.memory.set_value(key, value);
    }

    /// Resolve a locator token from the driver root
    pub fn element(&self, token: &LocatorToken) -> StepResult<Locator> {
        token.resolve(&self.memory, &self.page_object, &Locator::root())
    }

    /// Snapshot of the locator's elements once at least one exists
    pub fn elements(&self, locator: &Locator) -> StepResult<Vec<ElementHandle>> {
        let snapshot = RefCell::new(Vec::new());
        self.should(locator, &|found| {
            require_elements(locator, found)?;
            *snapshot.borrow_mut() = found.to_vec();
            Ok(())
        })?;
        Ok(snapshot.into_inner())
    }

    /// Validate two values, honouring the soft flag
    pub fn validate(
        &mut self,
        validation: &NormalizedValidation,
        actual: &Value,
        expected: &Value,
    ) -> StepResult<()> {
        let result = validation.validate(actual, expected);
        self.settle(validation, result)
    }

    /// Apply the soft flag to the result of a validation.
    ///
    /// A soft validation records a failed comparison and succeeds; every
    /// other error is returned unchanged.
    pub fn settle(&mut self, validation: &NormalizedValidation, result: StepResult<()>) -> StepResult<()> {
        if !validation.soft {
            return result;
        }
        match result {
            Ok(()) => {
                self.soft.record_pass();
                Ok(())
            }
            Err(e) if e.is_assertion() => {
                self.soft.record_failure(e.to_string(), Some(&validation.to_phrase()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Fail with every soft assertion that failed during the scenario
    pub fn verify_soft(&self) -> StepResult<()> {
        debug!(summary = ?self.soft.summary(), "verifying soft assertions");
        self.soft.verify()
    }
}

/// Fail with a retryable assertion error when nothing matched
pub(crate) fn require_elements(locator: &Locator, found: &[ElementHandle]) -> StepResult<()> {
    if found.is_empty() {
        return Err(StepError::assertion(
            format!("expected to find element '{}'", subject(locator)),
            "0 element(s)",
            "at least 1 element",
        ));
    }
    Ok(())
}

/// How a locator is named in messages
pub(crate) fn subject(locator: &Locator) -> String {
    if locator.path().is_empty() {
        locator.to_string()
    } else {
        locator.path().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::page_object::LocatorDef;
    use std::time::{Duration, Instant};

    fn world() -> World {
        let mut tree = PageObject::new();
        let root = tree.root();
        tree.define(root, "Header", LocatorDef::simple("h1")).unwrap();
        tree.define(root, "Missing", LocatorDef::simple("#missing")).unwrap();
        let driver = MockDriver::new().with_element(&["h1"], ElementHandle::new("h", "h1").with_text("Todos"));
        World::new(tree, Box::new(driver))
            .with_config(EngineConfig::new().with_timeout_ms(20).with_poll_interval_ms(1))
    }

    fn validation(phrase: &str) -> NormalizedValidation {
        NormalizedValidation::parse(phrase).unwrap()
    }

    #[test]
    fn test_memory_round_trip() {
        let mut world = world();
        world.set_value("plan", "free");
        assert_eq!(world.value(&ValueToken::new("$plan")).unwrap(), Value::from("free"));
    }

    #[test]
    fn test_element_and_snapshot() {
        let world = world();
        let locator = world.element(&LocatorToken::new("Header")).unwrap();
        let elements = world.elements(&locator).unwrap();
        assert_eq!(elements[0].text_content, "Todos");
    }

    #[test]
    fn test_elements_requires_a_match() {
        let world = world();
        let locator = world.element(&LocatorToken::new("Missing")).unwrap();
        let err = world.elements(&locator).unwrap_err();
        assert_eq!(err.to_string(), "expected to find element 'Missing'");
    }

    #[test]
    fn test_polling_uses_configured_timeout() {
        let world = world().with_config(EngineConfig::new().with_timeout_ms(60).with_poll_interval_ms(5));
        let locator = world.element(&LocatorToken::new("Missing")).unwrap();
        let start = Instant::now();
        assert!(world.elements(&locator).is_err());
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_zero_timeout_is_single_attempt() {
        let world = world().with_config(EngineConfig::new().with_timeout_ms(0));
        let attempts = std::cell::Cell::new(0);
        let result = world.poll(&|| {
            attempts.set(attempts.get() + 1);
            Err(StepError::assertion("never", "", ""))
        });
        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_hard_validation_fails() {
        let mut world = world();
        assert!(world.validate(&validation("to equal"), &1.into(), &2.into()).is_err());
        assert!(world.verify_soft().is_ok());
    }

    #[test]
    fn test_soft_validation_is_recorded() {
        let mut world = world();
        world
            .validate(&validation("to softly equal"), &1.into(), &2.into())
            .unwrap();
        world
            .validate(&validation("to softly equal"), &1.into(), &1.into())
            .unwrap();
        assert_eq!(world.soft_assertions().failure_count(), 1);
        assert_eq!(world.soft_assertions().assertion_count(), 2);
        let err = world.verify_soft().unwrap_err();
        assert!(err.to_string().contains("expected 1 to equal 2"));
    }

    #[test]
    fn test_soft_does_not_swallow_type_errors() {
        let mut world = world();
        let err = world
            .validate(&validation("to be softly above"), &"x".into(), &1.into())
            .unwrap_err();
        assert!(matches!(err, StepError::Type { .. }));
    }
}
