//! Process-wide configuration: log verbosity and default wait budgets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::result::{PomError, PomResult};
use crate::wait::{
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS, OPTIONS_POLL_INTERVAL_MS,
    OPTIONS_WAIT_TIMEOUT_MS,
};

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Resolutions, clicks and selections
    #[default]
    Info,
    /// Wait attempts and cache hits
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Default wait budgets, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    /// How long an element waits to be present
    pub element_timeout_ms: u64,
    /// Poll interval for element waits
    pub poll_interval_ms: u64,
    /// How long a dropdown waits for its options to populate
    pub options_timeout_ms: u64,
    /// Poll interval for dropdown options
    pub options_poll_interval_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            element_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            options_timeout_ms: OPTIONS_WAIT_TIMEOUT_MS,
            options_poll_interval_ms: OPTIONS_POLL_INTERVAL_MS,
        }
    }
}

/// probar-pom configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PomConfig {
    /// Log verbosity
    pub log_level: LogLevel,
    /// Wait budgets
    pub wait: WaitSettings,
}

impl PomConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log level
    #[must_use]
    pub const fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set wait settings
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitSettings) -> Self {
        self.wait = wait;
        self
    }

    /// Parse YAML and validate
    pub fn from_yaml_str(yaml: &str) -> PomResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON and validate
    pub fn from_json_str(json: &str) -> PomResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> PomResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(PomError::config(format!(
                "unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Reject poll intervals that are zero or longer than their timeout
    pub fn validate(&self) -> PomResult<()> {
        let w = &self.wait;
        check_interval("poll_interval_ms", w.poll_interval_ms, w.element_timeout_ms)?;
        check_interval(
            "options_poll_interval_ms",
            w.options_poll_interval_ms,
            w.options_timeout_ms,
        )
    }

    /// Wait options for element resolution
    #[must_use]
    pub const fn element_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.wait.element_timeout_ms,
            poll_interval_ms: self.wait.poll_interval_ms,
        }
    }

    /// Wait options for dropdown option polling
    #[must_use]
    pub const fn options_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.wait.options_timeout_ms,
            poll_interval_ms: self.wait.options_poll_interval_ms,
        }
    }
}

fn check_interval(name: &str, interval_ms: u64, timeout_ms: u64) -> PomResult<()> {
    if interval_ms == 0 {
        return Err(PomError::config(format!("{name} must be greater than zero")));
    }
    if interval_ms > timeout_ms {
        return Err(PomError::config(format!(
            "{name} ({interval_ms}ms) exceeds its timeout ({timeout_ms}ms)"
        )));
    }
    Ok(())
}
