use tracing::info;

use crate::element::{impl_widget, Element, Parent};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::NodeRef;

/// A checkbox input
#[derive(Debug, Clone)]
pub struct Checkbox {
    element: Element,
}

impl_widget!(Checkbox);

impl Checkbox {
    /// Selector used when no locator is given
    pub const DEFAULT_SELECTOR: &'static str = r#"input[type="checkbox"]"#;

    /// The first checkbox under `parent`
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// A checkbox found by `locator` under `parent`
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

    /// Whether the box is ticked
    pub fn is_checked(&self) -> PomResult<bool> {
        self.element.is_selected()
    }

    /// Tick the box if it is not ticked
    pub fn check(&self) -> PomResult<&Self> {
        if !self.is_checked()? {
            self.element.click()?;
            info!(checkbox = %self.element.describe(), "checked");
        }
        Ok(self)
    }

    /// Untick the box if it is ticked
    pub fn uncheck(&self) -> PomResult<&Self> {
        if self.is_checked()? {
            self.element.click()?;
            info!(checkbox = %self.element.describe(), "unchecked");
        }
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{Effect, MockNode, MockSession};
    use std::rc::Rc;

    fn checkbox(selected: bool) -> (Rc<MockSession>, Checkbox, NodeRef) {
        let session = Rc::new(MockSession::new());
        let node = session.add_node(
            MockNode::new()
                .matching(Locator::css(Checkbox::DEFAULT_SELECTOR))
                .selected(selected),
        );
        session.on_click(&node, Effect::ToggleSelected(node.clone()));
        let checkbox = Checkbox::new(Parent::root(session.clone()));
        (session, checkbox, node)
    }

    #[test]
    fn test_check_is_idempotent() {
        let (session, checkbox, node) = checkbox(false);
        checkbox.check().unwrap().check().unwrap();
        assert!(checkbox.is_checked().unwrap());
        assert_eq!(session.clicks_on(&node), 1);
    }

    #[test]
    fn test_uncheck() {
        let (session, checkbox, node) = checkbox(true);
        checkbox.uncheck().unwrap();
        assert!(!checkbox.is_checked().unwrap());
        checkbox.uncheck().unwrap();
        assert_eq!(session.clicks_on(&node), 1);
    }
}
