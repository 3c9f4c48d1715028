//! Result and error types for probar-pom.

use std::time::Duration;

use thiserror::Error;

use crate::locator::Locator;

/// Result type for page-object operations
pub type PomResult<T> = Result<T, PomError>;

/// Errors that can occur while resolving or driving page objects
#[derive(Debug, Error)]
pub enum PomError {
    /// The presence wait ran out before the locator matched anything
    #[error(
        "Element {locator} not found under {parent} after {}ms",
        elapsed.as_millis()
    )]
    ElementNotFound {
        /// Locator that never matched
        locator: Locator,
        /// Description of the parent the query ran under
        parent: String,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// A cached node was detached and there is no locator to find it again
    #[error("Element {node} is stale and unrecoverable: no locator to retry with")]
    StaleElement {
        /// Identifier of the detached node
        node: String,
    },

    /// A wait on a node condition ran out
    #[error(
        "Timed out after {}ms waiting for {locator} to be {condition} under {parent}",
        timeout.as_millis()
    )]
    WaitTimeout {
        /// Locator being waited on
        locator: Locator,
        /// The condition that never held
        condition: String,
        /// Description of the parent the query ran under
        parent: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// A wait on an arbitrary predicate ran out
    #[error("Timed out after {}ms waiting for {waited_for}", timeout.as_millis())]
    Timeout {
        /// Description of what was waited for
        waited_for: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// A dropdown value was not among the enumerated options
    #[error("Option {option:?} not found in dropdown {dropdown}")]
    OptionNotFound {
        /// Requested option value
        option: String,
        /// Description of the dropdown trigger
        dropdown: String,
    },

    /// No table column has the requested title
    #[error("A column with title {title:?} was not found")]
    ColumnNotFound {
        /// Requested column title
        title: String,
    },

    /// A 1-based row index fell outside a table column
    #[error("Column {column:?} has no cell at row {row}")]
    CellNotFound {
        /// Column title
        column: String,
        /// Requested 1-based row index
        row: usize,
    },

    /// The session found no node for a single-node query
    #[error("No such element: {locator}")]
    NoSuchElement {
        /// Locator that matched nothing
        locator: Locator,
    },

    /// The session was asked to operate on a node that is no longer attached
    #[error("Node {node} is no longer attached to the document")]
    NodeDetached {
        /// Identifier of the detached node
        node: String,
    },

    /// Any other failure reported by the browser session
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Screenshot payload was not valid base64
    #[error("Screenshot decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl PomError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the session reported "not there yet" rather than a hard failure.
    ///
    /// Wait loops keep polling on these and propagate everything else.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. } | Self::NodeDetached { .. })
    }
}
