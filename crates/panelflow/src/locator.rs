//! Selectors for locating UI elements.
//!
//! Selectors are plain data: screens carry tables of them, drivers resolve
//! them. A selector can be checked for obvious malformation up front with
//! [`Selector::validate`], so that a wrong locator surfaces as invalid usage
//! instead of looking like an element that has not rendered yet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    #[serde(rename = "xpath")]
    XPath(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Test ID substring selector (`[data-testid*="..."]`)
    TestIdContains(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a test ID substring selector
    #[must_use]
    pub fn test_id_contains(fragment: impl Into<String>) -> Self {
        Self::TestIdContains(fragment.into())
    }

    /// Raw selector body
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Css(s)
            | Self::XPath(s)
            | Self::Text(s)
            | Self::TestId(s)
            | Self::TestIdContains(s) => s,
        }
    }

    /// Convert to an equivalent CSS selector, where one exists
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(s) => Some(s.clone()),
            Self::TestId(id) => Some(format!("[data-testid=\"{id}\"]")),
            Self::TestIdContains(id) => Some(format!("[data-testid*=\"{id}\"]")),
            Self::XPath(_) | Self::Text(_) => None,
        }
    }

    /// Check the selector for malformation
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the selector can never match
    pub fn validate(&self) -> Result<(), String> {
        let raw = self.raw();
        if raw.trim().is_empty() {
            return Err("selector is empty".to_string());
        }
        match self {
            Self::Css(css) => check_balanced(css),
            Self::XPath(path) => {
                if path.starts_with('/') || path.starts_with('(') || path.starts_with('.') {
                    check_balanced(path)
                } else {
                    Err(format!("xpath must start with '/', '(' or '.': {path}"))
                }
            }
            Self::TestId(id) | Self::TestIdContains(id) => {
                if id.contains('"') {
                    Err(format!("test id contains a quote: {id}"))
                } else {
                    Ok(())
                }
            }
            Self::Text(_) => Ok(()),
        }
    }
}

fn check_balanced(expr: &str) -> Result<(), String> {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    for c in expr.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '(' => stack.push(c),
            ']' => {
                if stack.pop() != Some('[') {
                    return Err(format!("unbalanced ']' in {expr}"));
                }
            }
            ')' => {
                if stack.pop() != Some('(') {
                    return Err(format!("unbalanced ')' in {expr}"));
                }
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(format!("unterminated quote in {expr}"));
    }
    if let Some(open) = stack.pop() {
        return Err(format!("unclosed '{open}' in {expr}"));
    }
    Ok(())
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XPath(path) => write!(f, "xpath={path}"),
            Self::Text(text) => write!(f, "text={text}"),
            other => {
                let css = other.to_css().unwrap_or_default();
                f.write_str(&css)
            }
        }
    }
}
