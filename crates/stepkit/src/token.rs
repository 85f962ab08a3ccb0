//! Quoted step arguments before resolution.
//!
//! A [`ValueToken`] resolves through [`Memory`]; a [`LocatorToken`] resolves
//! through the page-object tree after memory interpolation of its path.

use crate::locator::Locator;
use crate::memory::Memory;
use crate::page_object::PageObject;
use crate::result::{StepError, StepResult};
use crate::value::{Callable, Value};
use serde::Serialize;

/// Undo quote escaping from a quoted step argument (`\'` and `\"`)
#[must_use]
pub fn unescape_quotes(raw: &str) -> String {
    raw.replace("\\'", "'").replace("\\\"", "\"")
}

/// A value argument: memory reference or literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueToken {
    expression: String,
}

impl ValueToken {
    /// Create a token from the raw text between the quotes
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            expression: unescape_quotes(raw),
        }
    }

    /// Expression after unescaping
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Resolve against memory
    pub fn value(&self, memory: &Memory) -> StepResult<Value> {
        memory.get_value(&self.expression)
    }

    /// Resolve to a function; anything else is a type error
    pub fn callable(&self, memory: &Memory) -> StepResult<Callable> {
        match self.value(memory)? {
            Value::Function(func) => Ok(func),
            other => Err(StepError::type_error(format!(
                "'{}' is not a function but {}",
                self.expression,
                other.type_tag()
            ))),
        }
    }

    /// Store `value` under this token's key
    pub fn set(&self, memory: &mut Memory, value: impl Into<Value>) {
        memory.set_value(&self.expression, value);
    }
}

impl From<&str> for ValueToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A locator argument: an alias path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatorToken {
    path: String,
}

impl LocatorToken {
    /// Create a token from the raw text between the quotes
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            path: unescape_quotes(raw),
        }
    }

    /// Alias path after unescaping
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Interpolate memory placeholders, then walk the page-object tree
    pub fn resolve(
        &self,
        memory: &Memory,
        page_object: &PageObject,
        root: &Locator,
    ) -> StepResult<Locator> {
        let path = memory.interpolate(&self.path)?;
        page_object.element_from(&path, root)
    }
}

impl From<&str> for LocatorToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
