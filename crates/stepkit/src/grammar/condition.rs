//! Element condition phrases: `to be visible`, `not to be present`, `to be in viewport`.

use crate::driver::ElementHandle;
use crate::locator::Viewport;
use crate::result::{StepError, StepResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// Element state a condition checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionKind {
    /// At least one element matches
    Present,
    /// Every matched element is visible
    Visible,
    /// Every matched element is hidden
    Invisible,
    /// Every matched element is enabled
    Enabled,
    /// Every matched element is disabled
    Disabled,
    /// The first matched element lies inside the viewport
    InViewport,
}

impl ConditionKind {
    /// All condition kinds
    pub const ALL: [Self; 6] = [
        Self::Present,
        Self::Visible,
        Self::Invisible,
        Self::Enabled,
        Self::Disabled,
        Self::InViewport,
    ];

    /// Phrase keyword
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Invisible => "invisible",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::InViewport => "in viewport",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(
            r"^(?:to )?(?P<reverse>not )?(?:to )?(?:be )?(?P<condition>present|visible|invisible|enabled|disabled|in viewport)$",
        )
        .unwrap_or_else(|e| unreachable!("condition grammar: {e}"))
    })
}

/// Unanchored pattern matching any condition phrase, for step registration
#[must_use]
pub fn phrase_pattern() -> &'static str {
    "(?:to )?(?:not )?(?:to )?(?:be )?(?:present|visible|invisible|enabled|disabled|in viewport)"
}

/// A condition phrase reduced to kind and negation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedCondition {
    /// State to check
    pub kind: ConditionKind,
    /// Whether the check is negated
    pub negated: bool,
}

impl NormalizedCondition {
    /// Create a normalized condition
    #[must_use]
    pub const fn new(kind: ConditionKind, negated: bool) -> Self {
        Self { kind, negated }
    }

    /// Parse a condition phrase
    pub fn parse(phrase: &str) -> StepResult<Self> {
        let unsupported = || StepError::grammar(phrase, format!("{phrase} wait is not implemented"));
        let caps = grammar().captures(phrase).ok_or_else(unsupported)?;
        let kind = caps
            .name("condition")
            .and_then(|m| ConditionKind::from_keyword(m.as_str()))
            .ok_or_else(unsupported)?;
        let normalized = Self::new(kind, caps.name("reverse").is_some());
        debug!(phrase, ?normalized, "parsed condition");
        Ok(normalized)
    }

    /// Render a phrase that parses back to this condition
    #[must_use]
    pub fn to_phrase(&self) -> String {
        if self.negated {
            format!("not to be {}", self.kind)
        } else {
            format!("to be {}", self.kind)
        }
    }

    /// Whether the condition holds for a snapshot of matched elements
    #[must_use]
    pub fn holds(&self, elements: &[ElementHandle], viewport: Viewport) -> bool {
        let positive = match self.kind {
            ConditionKind::Present => !elements.is_empty(),
            ConditionKind::Visible => !elements.is_empty() && elements.iter().all(|e| e.visible),
            ConditionKind::Invisible => {
                !elements.is_empty() && elements.iter().all(|e| !e.visible)
            }
            ConditionKind::Enabled => !elements.is_empty() && elements.iter().all(|e| e.enabled),
            ConditionKind::Disabled => !elements.is_empty() && elements.iter().all(|e| !e.enabled),
            ConditionKind::InViewport => elements
                .first()
                .and_then(|e| e.bounding_rect)
                .is_some_and(|rect| rect.is_within(viewport)),
        };
        positive != self.negated
    }

    /// Assert the condition for `subject`, failing with an assertion error
    pub fn check(&self, subject: &str, elements: &[ElementHandle], viewport: Viewport) -> StepResult<()> {
        if self.holds(elements, viewport) {
            return Ok(());
        }
        Err(StepError::assertion(
            format!(
                "expected '{subject}' {} (matched {} element(s))",
                self.to_phrase(),
                elements.len()
            ),
            format!("{} element(s)", elements.len()),
            self.to_phrase(),
        ))
    }
}

impl fmt::Display for NormalizedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_phrase())
    }
}
