//! Session: the browser automation capability page objects call into.
//!
//! The session is supplied from outside (a WebDriver client, a CDP bridge,
//! or [`crate::mock::MockSession`] in tests). This crate never spawns
//! browsers or speaks a wire protocol; it only asks the session to query
//! nodes and act on them.
//!
//! ```text
//! ┌──────────────┐  resolve()   ┌──────────────┐  query_one()  ┌───────────┐
//! │ Element tree │─────────────►│ Wait engine  │──────────────►│  Session  │
//! └──────────────┘              └──────────────┘               └───────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Locator;
use crate::result::PomResult;

/// Opaque handle to a node the session has already found
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    id: String,
}

impl NodeRef {
    /// Create a node handle from a session-specific identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Session-specific identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Where a query starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    /// The whole document
    Document,
    /// Descendants of a resolved node
    Node(NodeRef),
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Node(node) => write!(f, "node {node}"),
        }
    }
}

/// Browser session capability.
///
/// Implementations report a failed single-node query as
/// [`crate::PomError::NoSuchElement`] and an operation on a detached node as
/// [`crate::PomError::NodeDetached`]; wait loops treat both as "not yet".
pub trait Session: fmt::Debug {
    /// Navigate to a URL
    fn open(&self, url: &str) -> PomResult<()>;

    /// End the session and close its windows
    fn quit(&self) -> PomResult<()>;

    /// Find the first node matching `locator` under `root`
    fn query_one(&self, root: &SearchRoot, locator: &Locator) -> PomResult<NodeRef>;

    /// Find every node matching `locator` under `root`, in document order
    fn query_many(&self, root: &SearchRoot, locator: &Locator) -> PomResult<Vec<NodeRef>>;

    /// Click a node
    fn click(&self, node: &NodeRef) -> PomResult<()>;

    /// Double-click a node
    fn double_click(&self, node: &NodeRef) -> PomResult<()>;

    /// Move the pointer over a node
    fn hover(&self, node: &NodeRef) -> PomResult<()>;

    /// Type keys into a node
    fn send_keys(&self, node: &NodeRef, keys: &str) -> PomResult<()>;

    /// Read an attribute; `None` when the node does not carry it
    fn attribute(&self, node: &NodeRef, name: &str) -> PomResult<Option<String>>;

    /// Rendered text of a node
    fn text(&self, node: &NodeRef) -> PomResult<String>;

    /// Whether the node accepts interaction
    fn is_enabled(&self, node: &NodeRef) -> PomResult<bool>;

    /// Whether the node is rendered visibly
    fn is_displayed(&self, node: &NodeRef) -> PomResult<bool>;

    /// Whether a checkbox, radio or option is selected
    fn is_selected(&self, node: &NodeRef) -> PomResult<bool>;

    /// Cheap liveness probe: is the node still in the document?
    fn is_attached(&self, node: &NodeRef) -> PomResult<bool>;

    /// PNG screenshot of a node, base64-encoded
    fn screenshot_base64(&self, node: &NodeRef) -> PomResult<String>;
}

/// WebDriver key codes accepted by [`Session::send_keys`]
pub mod keys {
    /// Backspace
    pub const BACKSPACE: &str = "\u{E003}";
    /// Tab
    pub const TAB: &str = "\u{E004}";
    /// Enter
    pub const ENTER: &str = "\u{E007}";
    /// Escape
    pub const ESCAPE: &str = "\u{E00C}";
}
