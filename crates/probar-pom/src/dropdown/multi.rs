use std::ops::Deref;

use tracing::{debug, info};

use super::{Dropdown, ExpandedContainer, MatchMode};
use crate::element::{Element, Parent};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::NodeRef;
use crate::wait::WaitOptions;

/// Separator between values in a multi-select trigger's text
const SELECTION_SEPARATOR: char = ',';

/// A dropdown holding several values, confirmed with an Apply button.
///
/// The trigger shows the current selection as comma-separated text.
#[derive(Debug, Clone)]
pub struct MultiSelectDropdown {
    dropdown: Dropdown,
    apply_locator: Locator,
    cancel_locator: Locator,
}

impl Deref for MultiSelectDropdown {
    type Target = Dropdown;

    fn deref(&self) -> &Self::Target {
        &self.dropdown
    }
}

impl From<&MultiSelectDropdown> for Parent {
    fn from(dropdown: &MultiSelectDropdown) -> Self {
        Self::from(&dropdown.dropdown)
    }
}

impl MultiSelectDropdown {
    /// Default trigger selector
    pub const DEFAULT_SELECTOR: &'static str = r#"button[class*="dropdown"]"#;
    /// Default expanded container selector
    pub const DEFAULT_EXPANDED_SELECTOR: &'static str = r#"div[class*="hoverable-content--visible"]"#;
    /// Default option selector
    pub const DEFAULT_OPTIONS_SELECTOR: &'static str = r#"li[class="collection-values-item"]"#;
    /// Default Apply button selector, inside the container
    pub const DEFAULT_APPLY_SELECTOR: &'static str = r#"button[aria-label*="Apply"]"#;
    /// Default Cancel button selector, inside the container
    pub const DEFAULT_CANCEL_SELECTOR: &'static str = r#"button[aria-label*="Cancel"]"#;

    /// The first dropdown under `parent`, with the default locators
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// A dropdown whose trigger is found by `locator`, default container,
    /// option and button locators
    #[must_use]
    pub fn with_locator(parent: impl Into<Parent>, locator: Locator) -> Self {
        Self::with_locators(
            parent,
            locator,
            Locator::css(Self::DEFAULT_EXPANDED_SELECTOR),
            Locator::css(Self::DEFAULT_OPTIONS_SELECTOR),
        )
    }

    /// A dropdown with trigger, container and option locators given
    #[must_use]
    pub fn with_locators(
        parent: impl Into<Parent>,
        locator: Locator,
        expanded_locator: Locator,
        options_locator: Locator,
    ) -> Self {
        Self::from_dropdown(Dropdown::new(parent, locator, expanded_locator, options_locator))
    }

    /// Wrap an already-found trigger node, default locators otherwise
    #[must_use]
    pub fn from_node(parent: impl Into<Parent>, node: NodeRef) -> Self {
        Self::from_dropdown(Dropdown::from_trigger(
            Element::from_node(parent, node),
            Locator::css(Self::DEFAULT_EXPANDED_SELECTOR),
            Locator::css(Self::DEFAULT_OPTIONS_SELECTOR),
        ))
    }

    fn from_dropdown(dropdown: Dropdown) -> Self {
        Self {
            dropdown,
            apply_locator: Locator::css(Self::DEFAULT_APPLY_SELECTOR),
            cancel_locator: Locator::css(Self::DEFAULT_CANCEL_SELECTOR),
        }
    }

    /// Override the Apply and Cancel button locators
    #[must_use]
    pub fn with_buttons(mut self, apply: Locator, cancel: Locator) -> Self {
        self.apply_locator = apply;
        self.cancel_locator = cancel;
        self
    }

    /// Budget for options to populate after expanding
    #[must_use]
    pub fn with_options_wait(mut self, wait: WaitOptions) -> Self {
        self.dropdown = self.dropdown.with_options_wait(wait);
        self
    }

    /// Open the dropdown; see [`Dropdown::expand`]
    pub fn expand(&self, via_hover: bool) -> PomResult<MultiSelectContainer> {
        Ok(self.wrap(self.dropdown.expand(via_hover)?))
    }

    /// Handle to the expanded container, without expanding
    #[must_use]
    pub fn container(&self) -> MultiSelectContainer {
        self.wrap(self.dropdown.container())
    }

    fn wrap(&self, container: ExpandedContainer) -> MultiSelectContainer {
        MultiSelectContainer {
            apply_button: Element::new(&container, self.apply_locator.clone()),
            cancel_button: Element::new(&container, self.cancel_locator.clone()),
            container,
        }
    }

    /// Values the trigger currently shows as selected
    pub fn selected_values(&self) -> PomResult<Vec<String>> {
        Ok(self
            .dropdown
            .selected()?
            .split(SELECTION_SEPARATOR)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Select every value in `values`, then apply.
    ///
    /// A value already shown on the trigger is skipped; any other is
    /// matched against option text by case-insensitive containment. The
    /// first value with no matching option fails the whole call with
    /// [`PomError::OptionNotFound`](crate::PomError::OptionNotFound) before
    /// Apply. Apply is clicked exactly once, even when every value was
    /// already selected; the trigger is not clicked again to reach it.
    pub fn select_options<S: AsRef<str>>(&self, values: &[S]) -> PomResult<()> {
        for value in values {
            let value = value.as_ref();
            let selected = self.selected_values()?;
            if selected.iter().any(|s| MatchMode::Exact.matches(s, value)) {
                debug!(dropdown = %self.dropdown.describe(), option = value, "already selected");
                continue;
            }
            self.dropdown.choose(value, MatchMode::Contains)?;
        }

        self.container().apply()?;
        info!(dropdown = %self.dropdown.describe(), count = values.len(), "applied selection");
        Ok(())
    }

    /// Click Apply in the open container
    pub fn apply(&self) -> PomResult<()> {
        self.container().apply()
    }

    /// Click Cancel in the open container
    pub fn cancel(&self) -> PomResult<()> {
        self.container().cancel()
    }
}

/// Expanded multi-select panel with its Apply and Cancel buttons
#[derive(Debug, Clone)]
pub struct MultiSelectContainer {
    container: ExpandedContainer,
    apply_button: Element,
    cancel_button: Element,
}

impl Deref for MultiSelectContainer {
    type Target = ExpandedContainer;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

impl MultiSelectContainer {
    /// The Apply button
    #[must_use]
    pub fn apply_button(&self) -> &Element {
        &self.apply_button
    }

    /// The Cancel button
    #[must_use]
    pub fn cancel_button(&self) -> &Element {
        &self.cancel_button
    }

    /// Confirm the selection
    pub fn apply(&self) -> PomResult<()> {
        self.apply_button.click()
    }

    /// Discard the selection
    pub fn cancel(&self) -> PomResult<()> {
        self.cancel_button.click()
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
        apply: NodeRef,
        cancel: NodeRef,
        dropdown: MultiSelectDropdown,
    }

    /// A tag filter showing `shown` on its trigger. Clicking an option
    /// does not update the trigger; only Apply would on a real page.
    fn tags(shown: &str) -> Fixture {
        let session = Rc::new(MockSession::new());
        let trigger = session.add_node(
            MockNode::new()
                .matching(Locator::css(MultiSelectDropdown::DEFAULT_SELECTOR))
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
            MockNode::new().matching(Locator::css(MultiSelectDropdown::DEFAULT_EXPANDED_SELECTOR)),
        );
        let options = ["Backend", "Frontend", "Infrastructure"]
            .into_iter()
            .map(|label| {
                session.add_child(
                    &panel,
                    MockNode::new()
                        .matching(Locator::css(MultiSelectDropdown::DEFAULT_OPTIONS_SELECTOR))
                        .text(label),
                )
            })
            .collect();
        let apply = session.add_child(
            &panel,
            MockNode::new().matching(Locator::css(MultiSelectDropdown::DEFAULT_APPLY_SELECTOR)),
        );
        let cancel = session.add_child(
            &panel,
            MockNode::new().matching(Locator::css(MultiSelectDropdown::DEFAULT_CANCEL_SELECTOR)),
        );

        let fast = WaitOptions::new().with_timeout(100).with_poll_interval(5);
        let dropdown = MultiSelectDropdown::new(Parent::root(session.clone()).with_wait(fast))
            .with_options_wait(fast);
        Fixture {
            session,
            options,
            apply,
            cancel,
            dropdown,
        }
    }

    #[test]
    fn test_selected_values_split() {
        let f = tags("Backend, Frontend");
        assert_eq!(f.dropdown.selected_values().unwrap(), vec!["Backend", "Frontend"]);
        assert!(tags("").dropdown.selected_values().unwrap().is_empty());
    }

    #[test]
    fn test_skips_selected_and_applies_once() {
        let f = tags("Backend");
        f.dropdown.select_options(&["backend", "front"]).unwrap();

        assert_eq!(f.session.clicks_on(&f.options[0]), 0);
        assert_eq!(f.session.clicks_on(&f.options[1]), 1);
        assert_eq!(f.session.clicks_on(&f.apply), 1);
        assert_eq!(f.session.clicks_on(&f.cancel), 0);
    }

    #[test]
    fn test_all_selected_still_applies() {
        let f = tags("Backend, Infrastructure");
        f.dropdown.select_options(&["Infrastructure", "BACKEND"]).unwrap();
        for option in &f.options {
            assert_eq!(f.session.clicks_on(option), 0);
        }
        assert_eq!(f.session.clicks_on(&f.apply), 1);
        assert_eq!(f.session.calls("click"), 1);
    }

    #[test]
    fn test_missing_value_aborts_before_apply() {
        let f = tags("");
        let err = f.dropdown.select_options(&["Backend", "Design"]).unwrap_err();
        assert!(matches!(err, PomError::OptionNotFound { ref option, .. } if option == "Design"));
        assert_eq!(f.session.clicks_on(&f.options[0]), 1);
        assert_eq!(f.session.clicks_on(&f.apply), 0);
    }

    #[test]
    fn test_cancel() {
        let f = tags("");
        f.dropdown.expand(true).unwrap().cancel().unwrap();
        assert_eq!(f.session.clicks_on(&f.cancel), 1);
        f.dropdown.cancel().unwrap();
        assert_eq!(f.session.clicks_on(&f.cancel), 2);
    }

    #[test]
    fn test_buttons_scoped_to_container() {
        let f = tags("");
        let container = f.dropdown.container();
        assert_eq!(container.apply_button().resolve().unwrap(), f.apply);
        assert_eq!(container.cancel_button().resolve().unwrap(), f.cancel);
    }
}
