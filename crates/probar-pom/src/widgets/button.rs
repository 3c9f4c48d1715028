use crate::element::{impl_widget, Element, Parent};
use crate::locator::Locator;
use crate::session::NodeRef;

/// A clickable button
#[derive(Debug, Clone)]
pub struct Button {
    element: Element,
}

impl_widget!(Button);

impl Button {
    /// Selector used when no locator is given
    pub const DEFAULT_SELECTOR: &'static str = "button";

    /// The first `button` under `parent`
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// A button found by `locator` under `parent`
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
}
