//! Locators: how to find zero or more nodes under a root.
//!
//! A [`Locator`] is pure data. It pairs a lookup [`Strategy`] with a selector
//! string and carries no behavior of its own; the session decides what the
//! pair means. Locators compare, hash and serialize by value so they can be
//! declared once in a page object or loaded from a fixture file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup strategy understood by the browser session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// CSS selector (e.g., "button.primary")
    Css,
    /// XPath expression
    XPath,
    /// Element id attribute
    Id,
    /// Element name attribute
    Name,
    /// Tag name
    TagName,
    /// Single class name
    ClassName,
    /// Exact link text
    LinkText,
    /// Substring of link text
    PartialLinkText,
}

impl Strategy {
    /// Short name used in logs and error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Name => "name",
            Self::TagName => "tag",
            Self::ClassName => "class",
            Self::LinkText => "link",
            Self::PartialLinkText => "partial_link",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(strategy, selector)` pair identifying zero or more nodes under a root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Create a locator from an explicit strategy
    #[must_use]
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// CSS selector locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, expression)
    }

    /// Id attribute locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Strategy::Id, id)
    }

    /// Name attribute locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(Strategy::Name, name)
    }

    /// Tag name locator
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(Strategy::TagName, tag)
    }

    /// Class name locator
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, class)
    }

    /// Exact link text locator
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, text)
    }

    /// Partial link text locator
    #[must_use]
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::new(Strategy::PartialLinkText, text)
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the selector string
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.selector)
    }
}
