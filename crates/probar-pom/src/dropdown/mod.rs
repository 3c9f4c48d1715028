//! Dropdowns: a trigger that expands a container of selectable options.
//!
//! ```text
//!   Collapsed ──expand(click | hover)──► Expanded
//!       ▲                                   │
//!       └────── collapse / option click ────┘
//! ```
//!
//! The state is never tracked locally. It is read from the trigger's live
//! `aria-expanded` attribute every time it is needed, so a dropdown closed
//! by the page itself is seen as closed.
//!
//! The expanded container is looked up from the document root rather than
//! under the trigger, since most component libraries portal it to the end
//! of `<body>`.

mod multi;
mod single;

pub use multi::{MultiSelectContainer, MultiSelectDropdown};
pub use single::SingleSelectDropdown;

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::collection::Collection;
use crate::element::{Element, Parent};
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::wait::{poll_until, WaitOptions, WaitOutcome};

/// Whether a dropdown is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropdownState {
    /// Options hidden
    Collapsed,
    /// Options shown
    Expanded,
}

impl fmt::Display for DropdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collapsed => f.write_str("collapsed"),
            Self::Expanded => f.write_str("expanded"),
        }
    }
}

/// How a requested value is matched against option text.
///
/// Both modes ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Option text equals the value
    Exact,
    /// Option text contains the value
    Contains,
}

impl MatchMode {
    /// Whether `option_text` satisfies `wanted`
    #[must_use]
    pub fn matches(&self, option_text: &str, wanted: &str) -> bool {
        let option_text = option_text.to_lowercase();
        let wanted = wanted.to_lowercase();
        match self {
            Self::Exact => option_text == wanted,
            Self::Contains => option_text.contains(&wanted),
        }
    }
}

// =============================================================================
// DROPDOWN
// =============================================================================

/// Trigger element plus the locators of its expanded container and options
#[derive(Debug, Clone)]
pub struct Dropdown {
    element: Element,
    expanded_locator: Locator,
    options_locator: Locator,
    options_wait: WaitOptions,
}

impl Deref for Dropdown {
    type Target = Element;

    fn deref(&self) -> &Self::Target {
        &self.element
    }
}

impl From<&Dropdown> for Parent {
    fn from(dropdown: &Dropdown) -> Self {
        Self::Element(dropdown.element.clone())
    }
}

impl Dropdown {
    /// Declare a dropdown whose trigger is found by `locator` under `parent`
    #[must_use]
    pub fn new(
        parent: impl Into<Parent>,
        locator: Locator,
        expanded_locator: Locator,
        options_locator: Locator,
    ) -> Self {
        Self::from_trigger(Element::new(parent, locator), expanded_locator, options_locator)
    }

    /// Build around an existing trigger element
    #[must_use]
    pub fn from_trigger(trigger: Element, expanded_locator: Locator, options_locator: Locator) -> Self {
        Self {
            expanded_locator,
            options_locator,
            options_wait: trigger.options_wait(),
            element: trigger,
        }
    }

    /// Budget for options to populate after expanding
    #[must_use]
    pub const fn with_options_wait(mut self, wait: WaitOptions) -> Self {
        self.options_wait = wait;
        self
    }

    /// Budget for options to populate
    #[must_use]
    pub const fn options_wait(&self) -> WaitOptions {
        self.options_wait
    }

    /// The trigger element
    #[must_use]
    pub fn trigger(&self) -> &Element {
        &self.element
    }

    /// Locator of the expanded container
    #[must_use]
    pub fn expanded_locator(&self) -> &Locator {
        &self.expanded_locator
    }

    /// Locator of the options inside the container
    #[must_use]
    pub fn options_locator(&self) -> &Locator {
        &self.options_locator
    }

    /// Current state, read from the trigger's `aria-expanded`
    pub fn state(&self) -> PomResult<DropdownState> {
        let expanded = self
            .element
            .attribute("aria-expanded")?
            .is_some_and(|value| value.to_lowercase().contains("true"));
        Ok(if expanded {
            DropdownState::Expanded
        } else {
            DropdownState::Collapsed
        })
    }

    /// Whether the dropdown is open
    pub fn is_expanded(&self) -> PomResult<bool> {
        Ok(self.state()? == DropdownState::Expanded)
    }

    /// Open the dropdown by clicking, or hovering with `via_hover`.
    ///
    /// Does nothing when already open. The returned container is not
    /// waited for; its first use waits for it.
    pub fn expand(&self, via_hover: bool) -> PomResult<ExpandedContainer> {
        if self.is_expanded()? {
            debug!(dropdown = %self.element.describe(), "already expanded");
        } else {
            if via_hover {
                self.element.hover()?;
            } else {
                self.element.click()?;
            }
            info!(dropdown = %self.element.describe(), via_hover, "expanded dropdown");
        }
        Ok(self.container())
    }

    /// Close the dropdown by clicking the trigger when it is open
    pub fn collapse(&self) -> PomResult<()> {
        if self.is_expanded()? {
            self.element.click()?;
            info!(dropdown = %self.element.describe(), "collapsed dropdown");
        }
        Ok(())
    }

    /// Handle to the expanded container, without expanding
    #[must_use]
    pub fn container(&self) -> ExpandedContainer {
        let root = Parent::root(Rc::clone(self.element.session()))
            .with_wait(self.element.wait_options())
            .with_options_wait(self.options_wait);
        ExpandedContainer {
            element: Element::new(root, self.expanded_locator.clone()),
            options_locator: self.options_locator.clone(),
            options_wait: self.options_wait,
        }
    }

    /// Text the trigger currently displays
    pub fn selected(&self) -> PomResult<String> {
        self.element.text()
    }

    /// Expand, then click the first option matching `wanted`.
    ///
    /// Fails with [`PomError::OptionNotFound`] without clicking anything
    /// when no option matches.
    pub fn choose(&self, wanted: &str, mode: MatchMode) -> PomResult<()> {
        let container = self.expand(false)?;
        let options = container.poll_options()?;
        let Some((option, text)) = options
            .into_iter()
            .find(|(_, text)| mode.matches(text, wanted))
        else {
            return Err(PomError::OptionNotFound {
                option: wanted.to_string(),
                dropdown: self.element.describe(),
            });
        };

        option.click()?;
        info!(dropdown = %self.element.describe(), option = %text, "selected option");
        Ok(())
    }
}

// =============================================================================
// EXPANDED CONTAINER
// =============================================================================

/// The open options panel of a dropdown
#[derive(Debug, Clone)]
pub struct ExpandedContainer {
    element: Element,
    options_locator: Locator,
    options_wait: WaitOptions,
}

impl Deref for ExpandedContainer {
    type Target = Element;

    fn deref(&self) -> &Self::Target {
        &self.element
    }
}

impl From<&ExpandedContainer> for Parent {
    fn from(container: &ExpandedContainer) -> Self {
        Self::Element(container.element.clone())
    }
}

impl ExpandedContainer {
    /// Option elements, in document order.
    ///
    /// Some pages render the option list before filling in its labels, so
    /// this polls until at least one option exists and every option has
    /// text. If that never happens within the options budget, whatever was
    /// seen last is returned.
    pub fn options(&self) -> PomResult<Vec<Element>> {
        Ok(self.poll_options()?.into_iter().map(|(option, _)| option).collect())
    }

    /// Option labels, in document order
    pub fn option_texts(&self) -> PomResult<Vec<String>> {
        Ok(self.poll_options()?.into_iter().map(|(_, text)| text).collect())
    }

    pub(crate) fn poll_options(&self) -> PomResult<Vec<(Element, String)>> {
        self.element.resolve()?;
        let options: Collection = Collection::new(&self.element, self.options_locator.clone());

        let mut last = Vec::new();
        let outcome = poll_until(&self.options_wait, || {
            let observed = read_options(&options)?;
            if !observed.is_empty() && observed.iter().all(|(_, text)| !text.is_empty()) {
                return Ok(Some(observed));
            }
            last = observed;
            Ok(None)
        })?;

        match outcome {
            WaitOutcome::Satisfied(result) => {
                info!(
                    container = %self.element.describe(),
                    count = result.value.len(),
                    "got dropdown options"
                );
                Ok(result.value)
            }
            WaitOutcome::TimedOut { elapsed, .. } => {
                warn!(
                    container = %self.element.describe(),
                    count = last.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "dropdown options never fully populated, using last observation"
                );
                Ok(last)
            }
        }
    }
}

/// Options paired with their text; an option that vanished mid-read counts
/// as having no text
fn read_options(options: &Collection) -> PomResult<Vec<(Element, String)>> {
    options
        .find_all()?
        .into_iter()
        .map(|option| match option.text() {
            Ok(text) => Ok((option, text)),
            Err(e) if e.is_transient() || matches!(e, PomError::StaleElement { .. }) => {
                Ok((option, String::new()))
            }
            Err(e) => Err(e),
        })
        .collect()
}
