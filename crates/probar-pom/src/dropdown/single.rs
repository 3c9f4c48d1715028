use std::ops::Deref;

use tracing::debug;

use super::{Dropdown, MatchMode};
use crate::element::{Element, Parent};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::NodeRef;
use crate::wait::WaitOptions;

/// A dropdown that holds one value, shown as the trigger's text
#[derive(Debug, Clone)]
pub struct SingleSelectDropdown {
    dropdown: Dropdown,
}

impl Deref for SingleSelectDropdown {
    type Target = Dropdown;

    fn deref(&self) -> &Self::Target {
        &self.dropdown
    }
}

impl From<&SingleSelectDropdown> for Parent {
    fn from(dropdown: &SingleSelectDropdown) -> Self {
        Self::from(&dropdown.dropdown)
    }
}

impl SingleSelectDropdown {
    /// Default trigger selector
    pub const DEFAULT_SELECTOR: &'static str = r#"button[class*="dropdown"]"#;
    /// Default expanded container selector
    pub const DEFAULT_EXPANDED_SELECTOR: &'static str = r#"div[class*="dropdown__content--is-open"]"#;
    /// Default option selector
    pub const DEFAULT_OPTIONS_SELECTOR: &'static str = r#"li[class*="dropdown-item"]"#;

    /// The first dropdown under `parent`, with the default locators
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// A dropdown whose trigger is found by `locator`, default container
    /// and option locators
    #[must_use]
    pub fn with_locator(parent: impl Into<Parent>, locator: Locator) -> Self {
        Self::with_locators(
            parent,
            locator,
            Locator::css(Self::DEFAULT_EXPANDED_SELECTOR),
            Locator::css(Self::DEFAULT_OPTIONS_SELECTOR),
        )
    }

    /// A dropdown with every locator given
    #[must_use]
    pub fn with_locators(
        parent: impl Into<Parent>,
        locator: Locator,
        expanded_locator: Locator,
        options_locator: Locator,
    ) -> Self {
        Self {
            dropdown: Dropdown::new(parent, locator, expanded_locator, options_locator),
        }
    }

    /// Wrap an already-found trigger node, default container and option
    /// locators
    #[must_use]
    pub fn from_node(parent: impl Into<Parent>, node: NodeRef) -> Self {
        Self {
            dropdown: Dropdown::from_trigger(
                Element::from_node(parent, node),
                Locator::css(Self::DEFAULT_EXPANDED_SELECTOR),
                Locator::css(Self::DEFAULT_OPTIONS_SELECTOR),
            ),
        }
    }

    /// Budget for options to populate after expanding
    #[must_use]
    pub fn with_options_wait(self, wait: WaitOptions) -> Self {
        Self {
            dropdown: self.dropdown.with_options_wait(wait),
        }
    }

    /// Select the option whose text equals `value`, ignoring case.
    ///
    /// Does nothing when the trigger already shows `value`.
    pub fn select_option(&self, value: &str) -> PomResult<()> {
        if MatchMode::Exact.matches(&self.dropdown.selected()?, value) {
            debug!(dropdown = %self.dropdown.describe(), option = value, "already selected");
            return Ok(());
        }
        self.dropdown.choose(value, MatchMode::Exact)
    }

    /// Displayed selection as a list: empty when nothing is shown
    pub fn selected_values(&self) -> PomResult<Vec<String>> {
        let shown = self.dropdown.selected()?;
        let shown = shown.trim();
        Ok(if shown.is_empty() {
            Vec::new()
        } else {
            vec![shown.to_string()]
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{Effect, MockNode, MockSession};
    use crate::result::PomError;
    use std::rc::Rc;

    struct Fixture {
        session: Rc<MockSession>,
        options: Vec<NodeRef>,
        dropdown: SingleSelectDropdown,
    }

    /// A country picker whose options write their label into the trigger
    fn countries(shown: &str) -> Fixture {
        let session = Rc::new(MockSession::new());
        let trigger = session.add_node(
            MockNode::new()
                .matching(Locator::css(SingleSelectDropdown::DEFAULT_SELECTOR))
                .attribute("aria-expanded", "false")
                .text(shown),
        );
        session.on_click(
            &trigger,
            Effect::SetAttribute {
                node: trigger.clone(),
                name: "aria-expanded".to_string(),
                value: "true".to_string(),
            },
        );
        let panel = session.add_node(
            MockNode::new().matching(Locator::css(SingleSelectDropdown::DEFAULT_EXPANDED_SELECTOR)),
        );

        let mut options = Vec::new();
        for label in ["Austria", "Belgium", "Croatia"] {
            let option = session.add_child(
                &panel,
                MockNode::new()
                    .matching(Locator::css(SingleSelectDropdown::DEFAULT_OPTIONS_SELECTOR))
                    .text(label),
            );
            session.on_click(
                &option,
                Effect::SetText {
                    node: trigger.clone(),
                    text: label.to_string(),
                },
            );
            session.on_click(
                &option,
                Effect::SetAttribute {
                    node: trigger.clone(),
                    name: "aria-expanded".to_string(),
                    value: "false".to_string(),
                },
            );
            options.push(option);
        }

        let fast = WaitOptions::new().with_timeout(100).with_poll_interval(5);
        let dropdown = SingleSelectDropdown::new(Parent::root(session.clone()).with_wait(fast))
            .with_options_wait(fast);
        Fixture {
            session,
            options,
            dropdown,
        }
    }

    #[test]
    fn test_select_twice_clicks_once() {
        let f = countries("Select a country");
        f.dropdown.select_option("Belgium").unwrap();
        f.dropdown.select_option("belgium").unwrap();

        assert_eq!(f.session.clicks_on(&f.options[1]), 1);
        assert_eq!(f.dropdown.selected().unwrap(), "Belgium");
        assert!(!f.dropdown.is_expanded().unwrap());
    }

    #[test]
    fn test_already_selected_skips_expand() {
        let f = countries("Croatia");
        f.dropdown.select_option("CROATIA").unwrap();
        assert!(!f.session.was_called("click"));
    }

    #[test]
    fn test_missing_value() {
        let f = countries("Select a country");
        assert!(matches!(
            f.dropdown.select_option("missing-value"),
            Err(PomError::OptionNotFound { .. })
        ));
        for option in &f.options {
            assert_eq!(f.session.clicks_on(option), 0);
        }
    }

    #[test]
    fn test_partial_text_is_not_a_match() {
        let f = countries("Select a country");
        assert!(f.dropdown.select_option("Belg").is_err());
    }

    #[test]
    fn test_selected_values() {
        assert_eq!(countries("Austria").dropdown.selected_values().unwrap(), vec!["Austria"]);
        assert!(countries("  ").dropdown.selected_values().unwrap().is_empty());
    }
}
