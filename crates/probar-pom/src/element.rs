//! Lazily-resolved element handles.
//!
//! An [`Element`] is declared as a parent plus a [`Locator`] and resolved
//! against the session only when something needs the underlying node. The
//! found node is cached; every later access first probes that it is still
//! attached and re-resolves from the locator if it is not.
//!
//! Parents compose: an element's parent may itself be an unresolved
//! element, so resolving a button inside a modal inside a page resolves the
//! page, then the modal, then the button.
//!
//! ```ignore
//! let modal = Element::new(Parent::root(session), Locator::css("div.modal"));
//! let save = Element::new(&modal, Locator::css("button.save"));
//! save.click()?;
//! ```

use base64::Engine as _;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::{NodeRef, SearchRoot, Session};
use crate::wait::{WaitCondition, WaitOptions, Waiter};

// =============================================================================
// PARENT
// =============================================================================

/// What an element is looked up under
#[derive(Debug, Clone)]
pub enum Parent {
    /// The session's document root
    Root {
        /// Session to query
        session: Rc<dyn Session>,
        /// Wait budget inherited by children
        wait: WaitOptions,
        /// Budget for dropdown options inherited by children
        options_wait: WaitOptions,
    },
    /// A node the session has already found
    Node {
        /// Session to query
        session: Rc<dyn Session>,
        /// The raw node
        node: NodeRef,
        /// Wait budget inherited by children
        wait: WaitOptions,
        /// Budget for dropdown options inherited by children
        options_wait: WaitOptions,
    },
    /// Another, possibly unresolved, element
    Element(Element),
}

impl Parent {
    /// Document root of `session` with the default wait budget
    #[must_use]
    pub fn root(session: Rc<dyn Session>) -> Self {
        Self::Root {
            session,
            wait: WaitOptions::default(),
            options_wait: WaitOptions::for_options(),
        }
    }

    /// A raw node of `session`
    #[must_use]
    pub fn node(session: Rc<dyn Session>, node: NodeRef) -> Self {
        Self::Node {
            session,
            node,
            wait: WaitOptions::default(),
            options_wait: WaitOptions::for_options(),
        }
    }

    /// Override the wait budget children inherit.
    ///
    /// An element parent keeps its own budget.
    #[must_use]
    pub fn with_wait(mut self, options: WaitOptions) -> Self {
        match &mut self {
            Self::Root { wait, .. } | Self::Node { wait, .. } => *wait = options,
            Self::Element(_) => {}
        }
        self
    }

    /// Override the dropdown options budget children inherit.
    ///
    /// An element parent keeps its own budget.
    #[must_use]
    pub fn with_options_wait(mut self, options: WaitOptions) -> Self {
        match &mut self {
            Self::Root { options_wait, .. } | Self::Node { options_wait, .. } => {
                *options_wait = options;
            }
            Self::Element(_) => {}
        }
        self
    }

    /// Session the parent belongs to
    #[must_use]
    pub fn session(&self) -> &Rc<dyn Session> {
        match self {
            Self::Root { session, .. } | Self::Node { session, .. } => session,
            Self::Element(element) => element.session(),
        }
    }

    /// Wait budget children inherit
    #[must_use]
    pub fn wait(&self) -> WaitOptions {
        match self {
            Self::Root { wait, .. } | Self::Node { wait, .. } => *wait,
            Self::Element(element) => element.wait_options(),
        }
    }

    /// Dropdown options budget children inherit
    #[must_use]
    pub fn options_wait(&self) -> WaitOptions {
        match self {
            Self::Root { options_wait, .. } | Self::Node { options_wait, .. } => *options_wait,
            Self::Element(element) => element.options_wait(),
        }
    }

    /// Resolve into a query root.
    ///
    /// An element parent is resolved through its own [`Element::resolve`];
    /// its failures propagate unchanged.
    pub fn resolve(&self) -> PomResult<SearchRoot> {
        self.resolve_with(true)
    }

    /// Resolve into a query root, waiting for an element parent only when
    /// `wait_for_presence` is set
    pub fn resolve_with(&self, wait_for_presence: bool) -> PomResult<SearchRoot> {
        match self {
            Self::Root { .. } => Ok(SearchRoot::Document),
            Self::Node { node, .. } => Ok(SearchRoot::Node(node.clone())),
            Self::Element(element) => element
                .resolve_with(wait_for_presence)
                .map(SearchRoot::Node),
        }
    }

    /// Human-readable description for logs and errors
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Root { .. } => "document".to_string(),
            Self::Node { node, .. } => format!("node {node}"),
            Self::Element(element) => element.describe(),
        }
    }
}

impl From<Rc<dyn Session>> for Parent {
    fn from(session: Rc<dyn Session>) -> Self {
        Self::root(session)
    }
}

impl From<Element> for Parent {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&Element> for Parent {
    fn from(element: &Element) -> Self {
        Self::Element(element.clone())
    }
}

impl From<&Parent> for Parent {
    fn from(parent: &Parent) -> Self {
        parent.clone()
    }
}

// =============================================================================
// WIDGET
// =============================================================================

/// A typed wrapper around an [`Element`].
///
/// Every widget can be built from an element (so it can be a
/// [`crate::Collection`] child) and exposes its element (so it can be a
/// parent).
pub trait Widget {
    /// Wrap an element
    fn from_element(element: Element) -> Self
    where
        Self: Sized;

    /// The wrapped element
    fn element(&self) -> &Element;
}

// =============================================================================
// ELEMENT
// =============================================================================

struct Inner {
    parent: Parent,
    locator: Option<Locator>,
    cached: RefCell<Option<NodeRef>>,
    wait: Cell<WaitOptions>,
    options_wait: Cell<WaitOptions>,
}

/// A lazily-resolved handle to a single UI node.
///
/// Cloning is cheap and clones share the resolution cache.
#[derive(Clone)]
pub struct Element {
    inner: Rc<Inner>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("locator", &self.inner.locator)
            .field("parent", &self.inner.parent.describe())
            .field("cached", &self.inner.cached.borrow())
            .finish_non_exhaustive()
    }
}

impl Element {
    /// Declare an element found by `locator` under `parent`.
    ///
    /// Nothing is queried until the element is first used. The wait budget
    /// is inherited from the parent.
    #[must_use]
    pub fn new(parent: impl Into<Parent>, locator: Locator) -> Self {
        Self::build(parent.into(), Some(locator), None)
    }

    /// Wrap a node that was already found.
    ///
    /// Such an element has no locator, so once the node detaches every
    /// accessor fails with [`PomError::StaleElement`].
    #[must_use]
    pub fn from_node(parent: impl Into<Parent>, node: NodeRef) -> Self {
        Self::build(parent.into(), None, Some(node))
    }

    /// Wrap a node that was already found, keeping `locator` to recover
    /// from staleness
    #[must_use]
    pub fn with_node(parent: impl Into<Parent>, locator: Locator, node: NodeRef) -> Self {
        Self::build(parent.into(), Some(locator), Some(node))
    }

    fn build(parent: Parent, locator: Option<Locator>, cached: Option<NodeRef>) -> Self {
        let wait = Cell::new(parent.wait());
        let options_wait = Cell::new(parent.options_wait());
        Self {
            inner: Rc::new(Inner {
                parent,
                locator,
                cached: RefCell::new(cached),
                wait,
                options_wait,
            }),
        }
    }

    /// Set the wait budget for this element (shared by its clones)
    #[must_use]
    pub fn with_wait(self, options: WaitOptions) -> Self {
        self.inner.wait.set(options);
        self
    }

    /// Wait budget in effect
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        self.inner.wait.get()
    }

    /// Set the dropdown options budget this element and its children use
    #[must_use]
    pub fn with_options_wait(self, options: WaitOptions) -> Self {
        self.inner.options_wait.set(options);
        self
    }

    /// Dropdown options budget in effect
    #[must_use]
    pub fn options_wait(&self) -> WaitOptions {
        self.inner.options_wait.get()
    }

    /// The locator, if the element was declared with one
    #[must_use]
    pub fn locator(&self) -> Option<&Locator> {
        self.inner.locator.as_ref()
    }

    /// The unresolved parent
    #[must_use]
    pub fn parent_ref(&self) -> &Parent {
        &self.inner.parent
    }

    /// Session the element belongs to
    #[must_use]
    pub fn session(&self) -> &Rc<dyn Session> {
        self.inner.parent.session()
    }

    /// Currently cached node, without probing it
    #[must_use]
    pub fn cached(&self) -> Option<NodeRef> {
        self.inner.cached.borrow().clone()
    }

    /// Human-readable description for logs and errors
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.inner.locator, self.inner.cached.borrow().as_ref()) {
            (Some(locator), _) => format!("element {locator}"),
            (None, Some(node)) => format!("node {node}"),
            (None, None) => "element".to_string(),
        }
    }

    /// Resolve the parent into a query root
    pub fn parent(&self) -> PomResult<SearchRoot> {
        self.inner.parent.resolve()
    }

    /// Resolve, waiting for the element to be present
    pub fn resolve(&self) -> PomResult<NodeRef> {
        self.resolve_with(true)
    }

    /// Resolve the underlying node.
    ///
    /// A cached node is returned if it is still attached. A detached node is
    /// found again through the locator, or fails with
    /// [`PomError::StaleElement`] when there is none. Otherwise the locator
    /// is queried under the parent. With `wait_for_presence` the query is
    /// polled until it matches, the parent being resolved again before each
    /// poll so a re-rendered parent is followed; the wait fails with
    /// [`PomError::ElementNotFound`] when the budget runs out. Without it,
    /// neither the parent nor the element is waited for.
    pub fn resolve_with(&self, wait_for_presence: bool) -> PomResult<NodeRef> {
        let session = Rc::clone(self.session());

        if let Some(node) = self.cached() {
            if session.is_attached(&node)? {
                return Ok(node);
            }
            if self.inner.locator.is_none() {
                return Err(PomError::StaleElement {
                    node: node.to_string(),
                });
            }
            debug!(element = %self.describe(), %node, "cached node detached, re-resolving");
            *self.inner.cached.borrow_mut() = None;
        }

        let Some(locator) = self.inner.locator.as_ref() else {
            return Err(PomError::StaleElement {
                node: self.describe(),
            });
        };

        let parent = &self.inner.parent;
        let node = if wait_for_presence {
            info!(%locator, "waiting for element to be present");
            let start = Instant::now();
            let waiter = Waiter::with_options(self.wait_options());
            match waiter.wait_for_node_under(
                session.as_ref(),
                || parent.resolve(),
                locator,
                WaitCondition::Present,
            ) {
                Ok(result) => result.value,
                Err(PomError::WaitTimeout { .. }) => {
                    return Err(PomError::ElementNotFound {
                        locator: locator.clone(),
                        parent: parent.describe(),
                        elapsed: start.elapsed(),
                    });
                }
                Err(e) => return Err(e),
            }
        } else {
            session.query_one(&parent.resolve_with(false)?, locator)?
        };

        info!(%locator, %node, "got element");
        *self.inner.cached.borrow_mut() = Some(node.clone());
        Ok(node)
    }

    /// Whether the element can be found right now, without waiting
    pub fn is_present(&self) -> PomResult<bool> {
        match self.resolve_with(false) {
            Ok(_) => Ok(true),
            Err(e) if e.is_transient() || matches!(e, PomError::StaleElement { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Wait until the element is rendered visibly
    pub fn wait_until_displayed(&self) -> PomResult<&Self> {
        let waiter = Waiter::with_options(self.wait_options());
        match &self.inner.locator {
            Some(locator) => {
                let result = waiter.wait_for_node_under(
                    self.session().as_ref(),
                    || self.inner.parent.resolve(),
                    locator,
                    WaitCondition::Displayed,
                )?;
                *self.inner.cached.borrow_mut() = Some(result.value);
            }
            None => {
                let node = self.resolve()?;
                let waited_for = format!("{} to be displayed", self.describe());
                waiter.wait_for_function(&waited_for, || self.session().is_displayed(&node))?;
            }
        }
        Ok(self)
    }

    /// Click the element
    pub fn click(&self) -> PomResult<()> {
        let node = self.resolve()?;
        self.report("click", self.session().click(&node))
    }

    /// Double-click the element
    pub fn double_click(&self) -> PomResult<()> {
        let node = self.resolve()?;
        self.report("double_click", self.session().double_click(&node))
    }

    /// Move the pointer over the element
    pub fn hover(&self) -> PomResult<()> {
        let node = self.resolve()?;
        self.report("hover", self.session().hover(&node))
    }

    /// Type keys into the element
    pub fn send_keys(&self, keys: &str) -> PomResult<()> {
        let node = self.resolve()?;
        self.report("send_keys", self.session().send_keys(&node, keys))
    }

    /// Read an attribute; `None` when absent
    pub fn attribute(&self, name: &str) -> PomResult<Option<String>> {
        let node = self.resolve()?;
        self.session().attribute(&node, name)
    }

    /// Rendered text
    pub fn text(&self) -> PomResult<String> {
        let node = self.resolve()?;
        self.session().text(&node)
    }

    /// Whether the element accepts interaction
    pub fn is_enabled(&self) -> PomResult<bool> {
        let node = self.resolve()?;
        self.session().is_enabled(&node)
    }

    /// Whether the element is rendered visibly
    pub fn is_displayed(&self) -> PomResult<bool> {
        let node = self.resolve()?;
        self.session().is_displayed(&node)
    }

    /// Whether the element is selected (checkboxes, radios, options)
    pub fn is_selected(&self) -> PomResult<bool> {
        let node = self.resolve()?;
        self.session().is_selected(&node)
    }

    /// Screenshot of the element as a base64-encoded PNG
    pub fn screenshot_base64(&self) -> PomResult<String> {
        let node = self.resolve()?;
        info!(element = %self.describe(), "taking element screenshot");
        self.session().screenshot_base64(&node)
    }

    /// Screenshot of the element as PNG bytes
    pub fn screenshot_png(&self) -> PomResult<Vec<u8>> {
        let encoded = self.screenshot_base64()?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    fn report<T>(&self, action: &'static str, result: PomResult<T>) -> PomResult<T> {
        match &result {
            Ok(_) => info!(element = %self.describe(), action, "element action"),
            Err(e) => warn!(element = %self.describe(), action, error = %e, "element action failed"),
        }
        result
    }
}

impl Widget for Element {
    fn from_element(element: Element) -> Self {
        element
    }

    fn element(&self) -> &Element {
        self
    }
}

/// Implement [`Widget`], `Deref<Target = Element>` and `From<&T> for Parent`
/// for a struct with an `element: Element` field.
macro_rules! impl_widget {
    ($ty:ident) => {
        impl $crate::element::Widget for $ty {
            fn from_element(element: $crate::element::Element) -> Self {
                Self { element }
            }

            fn element(&self) -> &$crate::element::Element {
                &self.element
            }
        }

        impl std::ops::Deref for $ty {
            type Target = $crate::element::Element;

            fn deref(&self) -> &Self::Target {
                &self.element
            }
        }

        impl From<&$ty> for $crate::element::Parent {
            fn from(widget: &$ty) -> Self {
                Self::Element(widget.element.clone())
            }
        }
    };
}

pub(crate) use impl_widget;
