//! Stepkit: phrase resolution and validation engine for behavioural browser tests
//!
//! Gherkin steps reach the engine as raw text. Stepkit turns that text into
//! typed values, locators, validations and conditions, then runs the
//! comparison against a [`Driver`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐    ┌────────────────┐    ┌────────────────┐
//! │ Step phrase    │    │ Tokens         │    │ World          │
//! │ '$a' to equal  │───►│ value/locator  │───►│ memory + page  │
//! │ '42'           │    │ validation     │    │ object + driver│
//! └────────────────┘    └────────────────┘    └───────┬────────┘
//!                                                     │
//!                       ┌────────────────┐    ┌───────▼────────┐
//!                       │ Soft collector │◄───│ Comparators    │
//!                       └────────────────┘    └────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use stepkit::{steps, MockDriver, PageObject, ValueToken, World, NormalizedValidation};
//!
//! let mut world = World::new(PageObject::new(), Box::new(MockDriver::new()));
//! world.set_value("total", 42);
//! let validation = NormalizedValidation::parse("to equal").unwrap();
//! steps::validation::expect_value(
//!     &mut world,
//!     &ValueToken::new("$total"),
//!     &validation,
//!     &ValueToken::new("42"),
//! )
//! .unwrap();
//! ```

#![warn(missing_docs)]

#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::float_cmp,
    clippy::doc_markdown
)]
mod assertion;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod config;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod grammar;
#[allow(clippy::must_use_candidate, clippy::missing_const_for_fn)]
mod locator;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod memory;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod page_object;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod params;
mod result;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod token;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]
mod value;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod world;

/// Step definitions grouped by the area they cover
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod steps;

pub use assertion::{
    all_of, any_of, at_least_n, compare, every_element, sorted_by, AllOfMode, AssertionFailure,
    AssertionSummary, RetryConfig, RetryResult, SoftAssertions,
};
pub use config::{EngineConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
pub use driver::{Driver, ElementHandle, MockDriver};
pub use grammar::{
    condition_pattern, validation_pattern, ConditionKind, NormalizedCondition,
    NormalizedValidation, Operator,
};
pub use locator::{BoundingRect, Locator, Selector, Viewport};
pub use memory::Memory;
pub use page_object::{
    ChainItem, Component, ComponentId, LocatorDef, LocatorKind, NativeFn as NativeLocatorFn,
    NativeScope, PageObject, TemplateFn, ROOT_COMPONENT,
};
pub use params::{
    parameter_types, transform, BrowserButton, MouseButton, Parameter, ParameterType, PoType,
};
pub use result::{StepError, StepResult};
pub use token::{unescape_quotes, LocatorToken, ValueToken};
pub use value::{format_number, parse_float, Callable, Pattern, Value};
pub use world::World;
