//! Resolution/wait engine.
//!
//! Every wait in the crate is a synchronous poll: run a probe, sleep for the
//! poll interval, try again, until the probe yields or the timeout elapses.
//! The calling thread blocks for the whole wait and there is no abort signal
//! other than the timeout itself.
//!
//! [`poll_until`] is the primitive. [`Waiter::wait_for_node`] builds the two
//! node policies on top of it: [`WaitCondition::Present`] and
//! [`WaitCondition::Displayed`].

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::{NodeRef, SearchRoot, Session};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element waits (60 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 60_000;

/// Default polling interval for element waits (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default timeout for dropdown options to populate (10 seconds)
pub const OPTIONS_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval for dropdown options (1 second)
pub const OPTIONS_POLL_INTERVAL_MS: u64 = 1_000;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Timeout and polling interval for a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with the element defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used while waiting for dropdown options to populate
    #[must_use]
    pub const fn for_options() -> Self {
        Self {
            timeout_ms: OPTIONS_WAIT_TIMEOUT_MS,
            poll_interval_ms: OPTIONS_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT CONDITION
// =============================================================================

/// What a node wait requires of the located node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitCondition {
    /// At least one node matches
    Present,
    /// The first matching node is rendered visibly
    Displayed,
}

impl WaitCondition {
    /// Name used in logs and errors
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Displayed => "displayed",
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// A satisfied wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the satisfying probe
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probes run, including the satisfying one
    pub attempts: u32,
}

/// Outcome of [`poll_until`]
#[derive(Debug, Clone)]
pub enum WaitOutcome<T> {
    /// The probe yielded a value
    Satisfied(WaitResult<T>),
    /// The timeout elapsed first
    TimedOut {
        /// Time spent waiting, never less than the timeout
        elapsed: Duration,
        /// Number of probes run
        attempts: u32,
    },
}

impl<T> WaitOutcome<T> {
    /// Whether the wait was satisfied
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }
}

/// Poll `probe` until it yields a value or the timeout elapses.
///
/// The probe always runs at least once, and once more at the deadline.
/// Errors from the probe end the wait immediately.
pub fn poll_until<T, F>(options: &WaitOptions, mut probe: F) -> PomResult<WaitOutcome<T>>
where
    F: FnMut() -> PomResult<Option<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut attempts = 0_u32;

    loop {
        attempts = attempts.saturating_add(1);
        if let Some(value) = probe()? {
            return Ok(WaitOutcome::Satisfied(WaitResult {
                value,
                elapsed: start.elapsed(),
                attempts,
            }));
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitOutcome::TimedOut { elapsed, attempts });
        }
        std::thread::sleep(options.poll_interval().min(timeout - elapsed));
    }
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Waiter for node and predicate synchronization
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a new waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait until `locator` under `root` satisfies `condition`.
    ///
    /// Returns the node found by the satisfying probe. Fails with
    /// [`PomError::WaitTimeout`] when the timeout elapses.
    pub fn wait_for_node(
        &self,
        session: &dyn Session,
        root: &SearchRoot,
        locator: &Locator,
        condition: WaitCondition,
    ) -> PomResult<WaitResult<NodeRef>> {
        self.wait_for_node_under(session, || Ok(root.clone()), locator, condition)
    }

    /// Like [`Waiter::wait_for_node`], but asks `resolve_root` for the
    /// search root before every probe.
    ///
    /// A root that re-renders mid-wait is picked up by the next probe.
    /// Failures of `resolve_root`, and a root that detaches during a query,
    /// end the wait with that error.
    pub fn wait_for_node_under<R>(
        &self,
        session: &dyn Session,
        mut resolve_root: R,
        locator: &Locator,
        condition: WaitCondition,
    ) -> PomResult<WaitResult<NodeRef>>
    where
        R: FnMut() -> PomResult<SearchRoot>,
    {
        let mut last_root = SearchRoot::Document;
        let outcome = poll_until(&self.options, || {
            last_root = resolve_root()?;
            probe_node(session, &last_root, locator, condition)
        })?;

        match outcome {
            WaitOutcome::Satisfied(result) => {
                debug!(
                    %locator,
                    %condition,
                    attempts = result.attempts,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "wait satisfied"
                );
                Ok(result)
            }
            WaitOutcome::TimedOut { elapsed, attempts } => {
                debug!(
                    %locator,
                    %condition,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "wait timed out"
                );
                Err(PomError::WaitTimeout {
                    locator: locator.clone(),
                    condition: condition.to_string(),
                    parent: last_root.to_string(),
                    timeout: self.options.timeout(),
                })
            }
        }
    }

    /// Wait for a predicate to return true
    pub fn wait_for_function<F>(
        &self,
        waited_for: &str,
        mut predicate: F,
    ) -> PomResult<WaitResult<()>>
    where
        F: FnMut() -> PomResult<bool>,
    {
        match poll_until(&self.options, || Ok(predicate()?.then_some(())))? {
            WaitOutcome::Satisfied(result) => Ok(result),
            WaitOutcome::TimedOut { .. } => Err(PomError::Timeout {
                waited_for: waited_for.to_string(),
                timeout: self.options.timeout(),
            }),
        }
    }
}

fn probe_node(
    session: &dyn Session,
    root: &SearchRoot,
    locator: &Locator,
    condition: WaitCondition,
) -> PomResult<Option<NodeRef>> {
    let node = match session.query_one(root, locator) {
        Ok(node) => node,
        Err(e) if is_root_detached(root, &e) => return Err(e),
        Err(e) if e.is_transient() => return Ok(None),
        Err(e) => return Err(e),
    };

    match condition {
        WaitCondition::Present => Ok(Some(node)),
        WaitCondition::Displayed => match session.is_displayed(&node) {
            Ok(true) => Ok(Some(node)),
            Ok(false) => Ok(None),
            Err(e) if e.is_transient() => Ok(None),
            Err(e) => Err(e),
        },
    }
}

/// Whether `error` reports the search root itself as detached
fn is_root_detached(root: &SearchRoot, error: &PomError) -> bool {
    match (root, error) {
        (SearchRoot::Node(root), PomError::NodeDetached { node }) => root.id() == node,
        _ => false,
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait for a predicate with the default poll interval
pub fn wait_until<F>(predicate: F, timeout_ms: u64) -> PomResult<()>
where
    F: FnMut() -> PomResult<bool>,
{
    let waiter = Waiter::with_options(WaitOptions::new().with_timeout(timeout_ms));
    waiter.wait_for_function("custom predicate", predicate)?;
    Ok(())
}
