//! Probar POM: lazily-resolved page objects for browser UI tests
//!
//! Page objects describe the UI as a tree of element handles. A handle is
//! a parent plus a locator; nothing touches the browser until the handle is
//! used, and the node it finds is cached and re-found when the page
//! re-renders it.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                       PROBAR POM Architecture                     │
//! ├───────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐   ┌────────────┐   ┌────────────┐                │
//! │   │ Page       │   │ Widgets    │   │ Element    │                │
//! │   │ Objects    │──►│ Dropdown   │──►│ (lazy,     │                │
//! │   │            │   │ Table ...  │   │  cached)   │                │
//! │   └────────────┘   └────────────┘   └─────┬──────┘                │
//! │                                           │ resolve               │
//! │                    ┌────────────┐   ┌─────▼──────┐                │
//! │                    │ Wait       │◄──│ Parent     │                │
//! │                    │ Engine     │   │ chain      │                │
//! │                    └─────┬──────┘   └────────────┘                │
//! │                          │ query                                  │
//! │                    ┌─────▼──────┐                                 │
//! │                    │ Session    │  (WebDriver, CDP, MockSession)  │
//! │                    └────────────┘                                 │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use probar_pom::prelude::*;
//!
//! let session = Rc::new(MockSession::new());
//! let node = session.add_node(MockNode::new().matching(Locator::css("button")).text("Save"));
//!
//! let root = Parent::root(session.clone());
//! let save = Button::new(root);
//! assert_eq!(save.text().unwrap(), "Save");
//! save.click().unwrap();
//! assert_eq!(session.clicks_on(&node), 1);
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod browser;
mod collection;
mod config;
mod dropdown;
mod element;
mod locator;
mod result;
mod session;
mod table;
mod wait;
mod widgets;

/// Tracing subscriber setup
pub mod logging;

/// In-memory session for unit tests
///
/// Drives page objects without a browser.
#[allow(clippy::expect_used)]
pub mod mock;

/// Page Object Model support
pub mod page_object;

pub use browser::{
    Browser, BrowserArgument, BrowserKind, BrowserOptions, Launcher, DEFAULT_WINDOW_HEIGHT,
    DEFAULT_WINDOW_WIDTH,
};
pub use collection::Collection;
pub use config::{LogLevel, PomConfig, WaitSettings};
pub use dropdown::{
    Dropdown, DropdownState, ExpandedContainer, MatchMode, MultiSelectContainer,
    MultiSelectDropdown, SingleSelectDropdown,
};
pub use element::{Element, Parent, Widget};
pub use locator::{Locator, Strategy};
pub use mock::{Effect, MockNode, MockSession};
pub use page_object::{PageObject, UrlMatcher};
pub use result::{PomError, PomResult};
pub use session::{keys, NodeRef, SearchRoot, Session};
pub use table::{Table, TableColumn};
pub use wait::{
    poll_until, wait_until, WaitCondition, WaitOptions, WaitOutcome, WaitResult, Waiter,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS, OPTIONS_POLL_INTERVAL_MS,
    OPTIONS_WAIT_TIMEOUT_MS,
};
pub use widgets::{Button, Checkbox, Input, Link};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::browser::*;
    pub use super::collection::*;
    pub use super::config::*;
    pub use super::dropdown::*;
    pub use super::element::{Element, Parent, Widget};
    pub use super::locator::*;
    pub use super::mock::{Effect, MockNode, MockSession};
    pub use super::page_object::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::table::*;
    pub use super::wait::*;
    pub use super::widgets::*;
}
