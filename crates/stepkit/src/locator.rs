//! Locators: resolved references to zero, one or many elements.
//!
//! A [`Locator`] is an ordered chain of [`Selector`]s, each scoped to the
//! elements matched by the previous one, together with the page-object path
//! it was resolved from. Plurality is left to the driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse a declaration string; `xpath=`, `text=` and `testid=` prefixes
    /// pick the selector kind, anything else is CSS
    #[must_use]
    pub fn parse(declaration: &str) -> Self {
        let declaration = declaration.trim();
        if let Some(rest) = declaration.strip_prefix("xpath=") {
            Self::xpath(rest)
        } else if declaration.starts_with("//") || declaration.starts_with("(//") {
            Self::xpath(declaration)
        } else if let Some(rest) = declaration.strip_prefix("text=") {
            Self::text(rest)
        } else if let Some(rest) = declaration.strip_prefix("testid=") {
            Self::test_id(rest)
        } else {
            Self::css(declaration.strip_prefix("css=").unwrap_or(declaration))
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::CssWithText { css, text } => write!(f, "css={css}:has-text({text:?})"),
        }
    }
}

/// A chain of selectors, resolved from a page-object path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    /// Alias path this locator was resolved from
    path: String,
    /// Selectors from outermost to innermost
    chain: Vec<Selector>,
}

impl Locator {
    /// The document root; matches the page itself
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a locator with a single selector declaration
    #[must_use]
    pub fn new(declaration: &str) -> Self {
        Self::from_selector(Selector::parse(declaration))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            path: String::new(),
            chain: vec![selector],
        }
    }

    /// Scope a selector declaration inside this locator
    #[must_use]
    pub fn locator(&self, declaration: &str) -> Self {
        self.child(Selector::parse(declaration))
    }

    /// Scope a selector inside this locator
    #[must_use]
    pub fn child(&self, selector: Selector) -> Self {
        let mut chain = self.chain.clone();
        chain.push(selector);
        Self {
            path: self.path.clone(),
            chain,
        }
    }

    /// Filter the innermost CSS selector by text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match self.chain.pop() {
            Some(Selector::Css(css)) => self.chain.push(Selector::CssWithText { css, text }),
            Some(other) => {
                self.chain.push(other);
                self.chain.push(Selector::Text(text));
            }
            None => self.chain.push(Selector::Text(text)),
        }
        self
    }

    /// Attach the alias path this locator came from
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Alias path, empty for ad-hoc locators
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Selector chain from outermost to innermost
    #[must_use]
    pub fn chain(&self) -> &[Selector] {
        &self.chain
    }

    /// Whether this is the document root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.chain.is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chain.is_empty() {
            return f.write_str(":root");
        }
        let parts: Vec<String> = self.chain.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(" >> "))
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1000.0, 660.0)
    }
}

/// Client rect of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    /// Top edge
    pub top: f64,
    /// Left edge
    pub left: f64,
    /// Right edge
    pub right: f64,
    /// Bottom edge
    pub bottom: f64,
}

impl BoundingRect {
    /// Create a rect from its edges
    #[must_use]
    pub const fn new(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Create a rect from position and size
    #[must_use]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(y, x, x + width, y + height)
    }

    /// Width
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether all four edges lie within the viewport
    #[must_use]
    pub fn is_within(&self, viewport: Viewport) -> bool {
        self.top >= 0.0
            && self.left >= 0.0
            && self.right <= viewport.width
            && self.bottom <= viewport.height
    }
}
