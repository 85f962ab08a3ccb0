//! Driver root abstraction.
//!
//! The engine only needs a driver to resolve a [`Locator`] to element
//! snapshots, read page-level state, and poll until an assertion holds.
//! [`MockDriver`] keeps an in-memory DOM for tests and for the CLI.

use crate::assertion::RetryConfig;
use crate::locator::{BoundingRect, Locator, Selector};
use crate::result::{StepError, StepResult};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::trace;

/// Snapshot of an element as seen by a step
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHandle {
    /// Unique identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Element text content
    pub text_content: String,
    /// Form value, for inputs
    pub value: Option<String>,
    /// HTML attributes
    pub attributes: BTreeMap<String, String>,
    /// DOM properties beyond the built-in ones
    pub properties: BTreeMap<String, Value>,
    /// Computed style
    pub css: BTreeMap<String, String>,
    /// Client rect, `None` when not rendered
    pub bounding_rect: Option<BoundingRect>,
    /// Whether the element is visible
    pub visible: bool,
    /// Whether the element is enabled
    pub enabled: bool,
}

impl ElementHandle {
    /// Create a visible, enabled element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: String::new(),
            value: None,
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            css: BTreeMap::new(),
            bounding_rect: None,
            visible: true,
            enabled: true,
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    /// Set form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a DOM property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a computed style entry
    #[must_use]
    pub fn with_css(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(name.into(), value.into());
        self
    }

    /// Set the client rect
    #[must_use]
    pub const fn with_rect(mut self, rect: BoundingRect) -> Self {
        self.bounding_rect = Some(rect);
        self
    }

    /// Mark as hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attribute value, `Undefined` when absent
    #[must_use]
    pub fn attribute(&self, name: &str) -> Value {
        self.attributes
            .get(name)
            .map_or(Value::Undefined, |v| Value::String(v.clone()))
    }

    /// DOM property, falling back to the built-in ones
    #[must_use]
    pub fn property(&self, name: &str) -> Value {
        if let Some(value) = self.properties.get(name) {
            return value.clone();
        }
        match name {
            "id" => Value::String(self.id.clone()),
            "tagName" => Value::String(self.tag_name.to_uppercase()),
            "textContent" | "innerText" => Value::String(self.text_content.clone()),
            "value" => self.value.clone().map_or(Value::Undefined, Value::String),
            "disabled" => Value::Bool(!self.enabled),
            _ => Value::Undefined,
        }
    }

    /// Computed style value, empty when unset
    #[must_use]
    pub fn css_property(&self, name: &str) -> Value {
        Value::String(self.css.get(name).cloned().unwrap_or_default())
    }

    /// Plain object view handed to custom-property functions
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = BTreeMap::new();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        object.insert("tagName".to_string(), self.property("tagName"));
        object.insert("textContent".to_string(), Value::String(self.text_content.clone()));
        object.insert("value".to_string(), self.property("value"));
        object.insert("disabled".to_string(), Value::Bool(!self.enabled));
        object.insert(
            "attributes".to_string(),
            Value::object(self.attributes.iter().map(|(k, v)| (k.clone(), Value::String(v.clone())))),
        );
        for (name, value) in &self.properties {
            object.insert(name.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Browser root as seen by the engine
pub trait Driver: Debug {
    /// Snapshot of every element matching the locator
    fn query(&self, locator: &Locator) -> StepResult<Vec<ElementHandle>>;

    /// Current page URL
    fn current_url(&self) -> StepResult<String>;

    /// Current page title
    fn title(&self) -> StepResult<String>;

    /// Text of the open alert dialog
    fn alert_text(&self) -> StepResult<String>;

    /// Run `check` until it holds or `retry` gives up
    fn poll(&self, retry: &RetryConfig, check: &dyn Fn() -> StepResult<()>) -> StepResult<()> {
        retry.retry(check).map(|_| ())
    }

    /// Poll `check` against fresh snapshots of the locator's elements
    fn should(
        &self,
        retry: &RetryConfig,
        locator: &Locator,
        check: &dyn Fn(&[ElementHandle]) -> StepResult<()>,
    ) -> StepResult<()> {
        self.poll(retry, &|| check(&self.query(locator)?))
    }
}

#[derive(Debug, Clone)]
struct MockElement {
    scope: Vec<Selector>,
    handle: ElementHandle,
}

/// Mock driver with an in-memory DOM
///
/// Elements are mounted under the selector chain that finds them; a query
/// matches elements mounted under exactly the locator's chain, with text
/// filters applied to the element text.
#[derive(Debug, Default)]
pub struct MockDriver {
    /// Current URL
    pub current_url: String,
    /// Page title
    pub title: String,
    /// Open alert text
    pub alert: Option<String>,
    elements: Vec<MockElement>,
    call_history: RefCell<Vec<String>>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.current_url = url.into();
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open an alert
    #[must_use]
    pub fn with_alert(mut self, text: impl Into<String>) -> Self {
        self.alert = Some(text.into());
        self
    }

    /// Mount an element under a chain of selector declarations
    pub fn mount(&mut self, scope: &[&str], element: ElementHandle) {
        self.elements.push(MockElement {
            scope: scope.iter().map(|s| Selector::parse(s)).collect(),
            handle: element,
        });
    }

    /// Builder form of [`MockDriver::mount`]
    #[must_use]
    pub fn with_element(mut self, scope: &[&str], element: ElementHandle) -> Self {
        self.mount(scope, element);
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history.borrow().clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.borrow().iter().any(|c| c.starts_with(method))
    }

    fn record(&self, call: String) {
        self.call_history.borrow_mut().push(call);
    }
}

impl Driver for MockDriver {
    fn query(&self, locator: &Locator) -> StepResult<Vec<ElementHandle>> {
        self.record(format!("query:{locator}"));
        let mut scope = Vec::new();
        let mut text_filters = Vec::new();
        for selector in locator.chain() {
            match selector {
                Selector::CssWithText { css, text } => {
                    scope.push(Selector::Css(css.clone()));
                    text_filters.push(text.as_str());
                }
                Selector::Text(text) => text_filters.push(text.as_str()),
                other => scope.push(other.clone()),
            }
        }
        let found: Vec<ElementHandle> = self
            .elements
            .iter()
            .filter(|e| e.scope == scope)
            .filter(|e| text_filters.iter().all(|t| e.handle.text_content.contains(t)))
            .map(|e| e.handle.clone())
            .collect();
        trace!(locator = %locator, count = found.len(), "mock query");
        Ok(found)
    }

    fn current_url(&self) -> StepResult<String> {
        self.record("current_url".to_string());
        Ok(self.current_url.clone())
    }

    fn title(&self) -> StepResult<String> {
        self.record("title".to_string());
        Ok(self.title.clone())
    }

    fn alert_text(&self) -> StepResult<String> {
        self.record("alert_text".to_string());
        self.alert.clone().ok_or_else(|| StepError::Driver {
            message: "no alert is open".to_string(),
        })
    }
}
