//! Parameter types for step registration.
//!
//! A host runner registers each [`ParameterType`] with its regular
//! expression and hands captured text to [`transform`] before calling a
//! step.

use crate::grammar::{condition_pattern, validation_pattern, NormalizedCondition, NormalizedValidation};
use crate::result::{StepError, StepResult};
use crate::token::{LocatorToken, ValueToken};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const QUOTED: &str = r#""([^"\\]*(?:\\.[^"\\]*)*)"|'([^'\\]*(?:\\.[^'\\]*)*)'"#;

/// A named placeholder in step phrases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterType {
    /// Placeholder name, as in `{validation}`
    pub name: &'static str,
    /// Regular expression matching the placeholder text
    pub regexp: String,
    /// Whether snippet generators may suggest this type
    pub use_for_snippets: bool,
}

impl ParameterType {
    fn new(name: &'static str, regexp: impl Into<String>) -> Self {
        Self {
            name,
            regexp: regexp.into(),
            use_for_snippets: false,
        }
    }
}

/// Every parameter type the step library uses
#[must_use]
pub fn parameter_types() -> Vec<ParameterType> {
    vec![
        ParameterType::new("value", QUOTED),
        ParameterType::new("locator", QUOTED),
        ParameterType::new("validation", format!("({})", validation_pattern())),
        ParameterType::new("condition", format!("({})", condition_pattern())),
        ParameterType::new("mouseButton", "(left|right|middle)"),
        ParameterType::new("poType", "(element|collection)"),
        ParameterType::new("browserButton", "(back|forward)"),
    ]
}

/// Mouse button with its DOM `buttons` bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

impl MouseButton {
    /// Value of `MouseEvent.buttons` for this button
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Right => 2,
            Self::Middle => 4,
        }
    }
}

impl FromStr for MouseButton {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "middle" => Ok(Self::Middle),
            other => Err(StepError::grammar(other, format!("mouse button '{other}' is not supported"))),
        }
    }
}

/// Whether a page-object path names one element or a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoType {
    /// Single element
    Element,
    /// Collection of elements
    Collection,
}

impl FromStr for PoType {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "element" => Ok(Self::Element),
            "collection" => Ok(Self::Collection),
            other => Err(StepError::grammar(other, format!("page object type '{other}' is not supported"))),
        }
    }
}

/// Browser history navigation button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserButton {
    /// History back
    Back,
    /// History forward
    Forward,
}

impl FromStr for BrowserButton {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "back" => Ok(Self::Back),
            "forward" => Ok(Self::Forward),
            other => Err(StepError::grammar(other, format!("browser button '{other}' is not supported"))),
        }
    }
}

/// A transformed step argument
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// `{value}`
    Value(ValueToken),
    /// `{locator}`
    Locator(LocatorToken),
    /// `{validation}`
    Validation(NormalizedValidation),
    /// `{condition}`
    Condition(NormalizedCondition),
    /// `{mouseButton}`
    MouseButton(MouseButton),
    /// `{poType}`
    PoType(PoType),
    /// `{browserButton}`
    BrowserButton(BrowserButton),
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(token) => write!(f, "value '{}'", token.expression()),
            Self::Locator(token) => write!(f, "locator '{}'", token.path()),
            Self::Validation(validation) => write!(f, "validation '{validation}'"),
            Self::Condition(condition) => write!(f, "condition '{condition}'"),
            Self::MouseButton(button) => write!(f, "mouse button {}", button.code()),
            Self::PoType(po_type) => write!(f, "{po_type:?}"),
            Self::BrowserButton(button) => write!(f, "{button:?}"),
        }
    }
}

/// Transform captured text for the parameter type `name`.
///
/// For `value` and `locator`, `captured` is the text between the quotes.
pub fn transform(name: &str, captured: &str) -> StepResult<Parameter> {
    let parameter = match name {
        "value" => Parameter::Value(ValueToken::new(captured)),
        "locator" => Parameter::Locator(LocatorToken::new(captured)),
        "validation" => Parameter::Validation(NormalizedValidation::parse(captured)?),
        "condition" => Parameter::Condition(NormalizedCondition::parse(captured)?),
        "mouseButton" => Parameter::MouseButton(captured.parse()?),
        "poType" => Parameter::PoType(captured.parse()?),
        "browserButton" => Parameter::BrowserButton(captured.parse()?),
        other => {
            return Err(StepError::config(format!("parameter type '{other}' is not defined")));
        }
    };
    Ok(parameter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::grammar::{ConditionKind, Operator};
    use regex::Regex;

    fn regexp(name: &str) -> Regex {
        let parameter = parameter_types().into_iter().find(|p| p.name == name).unwrap();
        Regex::new(&format!("^(?:{})$", parameter.regexp)).unwrap()
    }

    #[test]
    fn test_every_regexp_compiles() {
        for parameter in parameter_types() {
            assert!(Regex::new(&parameter.regexp).is_ok(), "{}", parameter.name);
            assert!(!parameter.use_for_snippets);
        }
    }

    #[test]
    fn test_quoted_value_regexp() {
        let value = regexp("value");
        assert!(value.is_match("'hello'"));
        assert!(value.is_match(r#""say \"hi\"""#));
        assert!(!value.is_match("hello"));
    }

    #[test]
    fn test_validation_and_condition_regexps() {
        assert!(regexp("validation").is_match("does not equal"));
        assert!(regexp("validation").is_match("to be softly above"));
        assert!(regexp("condition").is_match("not to be visible"));
        assert!(!regexp("condition").is_match("to be clickable"));
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!("left".parse::<MouseButton>().unwrap().code(), 1);
        assert_eq!("right".parse::<MouseButton>().unwrap().code(), 2);
        assert_eq!("middle".parse::<MouseButton>().unwrap().code(), 4);
        assert!("wheel".parse::<MouseButton>().is_err());
    }

    #[test]
    fn test_transform() {
        assert_eq!(
            transform("validation", "does not equal").unwrap(),
            Parameter::Validation(NormalizedValidation::new(Operator::Equal, true, false))
        );
        assert_eq!(
            transform("condition", "to be visible").unwrap(),
            Parameter::Condition(NormalizedCondition::new(ConditionKind::Visible, false))
        );
        assert_eq!(transform("poType", "collection").unwrap(), Parameter::PoType(PoType::Collection));
        assert_eq!(
            transform("browserButton", "back").unwrap(),
            Parameter::BrowserButton(BrowserButton::Back)
        );
        assert_eq!(
            transform("value", r"it\'s").unwrap(),
            Parameter::Value(ValueToken::new("it's"))
        );
        assert!(transform("colour", "red").is_err());
        assert!(transform("validation", "to resemble").is_err());
    }

    #[test]
    fn test_display() {
        let parameter = transform("mouseButton", "middle").unwrap();
        assert_eq!(parameter.to_string(), "mouse button 4");
    }
}
