use tracing::info;

use crate::element::{impl_widget, Element, Parent};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::{keys, NodeRef};

/// A text input
#[derive(Debug, Clone)]
pub struct Input {
    element: Element,
}

impl_widget!(Input);

impl Input {
    /// Selector used when no locator is given
    pub const DEFAULT_SELECTOR: &'static str = "input";

    /// The first `input` under `parent`
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// An input found by `locator` under `parent`
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

    /// Erase the current value.
    ///
    /// Selects the text with a double click followed by a click, then sends
    /// backspace. Some inputs ignore a programmatic clear, this does not
    /// rely on one.
    pub fn clear(&self) -> PomResult<&Self> {
        self.element.double_click()?;
        self.element.click()?;
        self.element.send_keys(keys::BACKSPACE)?;
        info!(input = %self.element.describe(), "cleared input");
        Ok(self)
    }

    /// Type `value`, optionally clearing first
    pub fn enter_value(&self, value: &str, clear_first: bool) -> PomResult<&Self> {
        if clear_first {
            self.clear()?;
        }
        self.element.send_keys(value)?;
        info!(input = %self.element.describe(), value, "entered value");
        Ok(self)
    }

    /// The `value` attribute, empty when absent
    pub fn current_value(&self) -> PomResult<String> {
        Ok(self.element.attribute("value")?.unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockNode, MockSession};
    use std::rc::Rc;

    fn email(initial: &str) -> (Rc<MockSession>, Input) {
        let session = Rc::new(MockSession::new());
        session.add_node(
            MockNode::new()
                .matching(Locator::name("email"))
                .attribute("value", initial),
        );
        let input = Input::with_locator(Parent::root(session.clone()), Locator::name("email"));
        (session, input)
    }

    #[test]
    fn test_enter_value_replaces() {
        let (_session, input) = email("old@example.test");
        input.enter_value("ann@example.test", true).unwrap();
        assert_eq!(input.current_value().unwrap(), "ann@example.test");
    }

    #[test]
    fn test_enter_value_appends_without_clear() {
        let (session, input) = email("ann");
        input.enter_value("@example.test", false).unwrap();
        assert_eq!(input.current_value().unwrap(), "ann@example.test");
        assert!(!session.was_called("double_click"));
    }

    #[test]
    fn test_clear_sequence() {
        let (session, input) = email("x");
        input.clear().unwrap();
        assert_eq!(input.current_value().unwrap(), "");
        assert_eq!(session.calls("double_click"), 1);
        assert_eq!(session.calls("click"), 1);
        assert_eq!(session.calls("send_keys"), 1);
    }

    #[test]
    fn test_missing_value_is_empty() {
        let session = Rc::new(MockSession::new());
        session.add_node(MockNode::new().matching(Locator::css("input")));
        let input = Input::new(Parent::root(session.clone()));
        assert_eq!(input.current_value().unwrap(), "");
    }
}
