//! Log output for page-object activity.
//!
//! Page objects emit `tracing` events for every resolution, click, hover and
//! selection. Nothing is printed until a subscriber is installed; [`init`]
//! installs a formatted one filtered by the configured [`LogLevel`].

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, PomConfig};

/// Environment variable that overrides the configured level
pub const LOG_ENV: &str = "PROBAR_POM_LOG";

/// Install a fmt subscriber at the configured level.
///
/// `PROBAR_POM_LOG` takes precedence when set. Returns `false` if another
/// global subscriber was already installed, which is not an error: test
/// binaries commonly call this from several tests.
pub fn init(config: &PomConfig) -> bool {
    init_with_level(config.log_level)
}

/// Install a fmt subscriber at `level`
pub fn init_with_level(level: LogLevel) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init()
        .is_ok()
}
