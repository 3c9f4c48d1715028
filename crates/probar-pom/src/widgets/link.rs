use tracing::info;

use crate::element::{impl_widget, Element, Parent};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::NodeRef;

/// A navigation link that may be marked active
#[derive(Debug, Clone)]
pub struct Link {
    element: Element,
}

impl_widget!(Link);

impl Link {
    /// Selector used when no locator is given
    pub const DEFAULT_SELECTOR: &'static str = "a";

    /// The first `a` under `parent`
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// A link found by `locator` under `parent`
    #[must_use]
    pub fn with_locator(parent: impl Into<Parent>, locator: Locator) -> Self {
        Self {
            element: Element::new(parent, locator),
        }
    }

    /// Wrap an already-found node
    #[must_use]
    pub fn from_node(parent: impl Into<Parent>, node: NodeRef) -> Self {
        Self {
            element: Element::from_node(parent, node),
        }
    }

    /// Whether the link's class list mentions `active` (any case)
    pub fn is_active(&self) -> PomResult<bool> {
        Ok(self
            .element
            .attribute("class")?
            .is_some_and(|class| class.to_lowercase().contains("active")))
    }

    /// Follow the link unless it is already active
    pub fn open(&self) -> PomResult<&Self> {
        if !self.is_active()? {
            self.element.click()?;
            info!(link = %self.element.describe(), "opened link");
        }
        Ok(self)
    }
}
