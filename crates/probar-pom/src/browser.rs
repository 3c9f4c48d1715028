//! Browser sessions.
//!
//! A [`Browser`] owns the session every page object in a test resolves
//! against. Starting the actual browser process is delegated to a
//! [`Launcher`], so the crate itself has no driver dependency: tests hand
//! in a closure returning a [`MockSession`](crate::MockSession), real suites
//! one that connects to WebDriver or CDP.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use tracing::info;

use crate::config::PomConfig;
use crate::element::Parent;
use crate::result::PomResult;
use crate::session::Session;
use crate::wait::WaitOptions;

/// Default window width
pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;

/// Default window height
pub const DEFAULT_WINDOW_HEIGHT: u32 = 720;

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome / Chromium
    #[default]
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
}

impl BrowserKind {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command-line argument for the browser process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserArgument {
    /// `--window-size=W,H`
    WindowSize {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// `--disable-infobars`
    DisableInfoBars,
    /// `--ignore-certificate-errors`
    IgnoreCertificateErrors,
    /// Any other flag; `--` is prepended when missing
    Custom(String),
}

impl BrowserArgument {
    /// The flag as passed to the browser
    #[must_use]
    pub fn to_flag(&self) -> String {
        match self {
            Self::WindowSize { width, height } => format!("--window-size={width},{height}"),
            Self::DisableInfoBars => "--disable-infobars".to_string(),
            Self::IgnoreCertificateErrors => "--ignore-certificate-errors".to_string(),
            Self::Custom(flag) if flag.starts_with("--") => flag.clone(),
            Self::Custom(flag) => format!("--{flag}"),
        }
    }
}

/// How to start the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    /// Which browser
    pub kind: BrowserKind,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Extra arguments, after the window size
    pub arguments: Vec<BrowserArgument>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            kind: BrowserKind::default(),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            arguments: Vec::new(),
        }
    }
}

impl BrowserOptions {
    /// Defaults for `kind`
    #[must_use]
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Append an argument
    #[must_use]
    pub fn with_argument(mut self, argument: BrowserArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// All flags, window size first
    #[must_use]
    pub fn flags(&self) -> Vec<String> {
        let window = BrowserArgument::WindowSize {
            width: self.window_width,
            height: self.window_height,
        };
        std::iter::once(window.to_flag())
            .chain(self.arguments.iter().map(BrowserArgument::to_flag))
            .collect()
    }
}

/// Starts a browser and connects a session to it
pub trait Launcher {
    /// Start a browser configured by `options`
    fn launch(&self, options: &BrowserOptions) -> PomResult<Rc<dyn Session>>;
}

impl<F> Launcher for F
where
    F: Fn(&BrowserOptions) -> PomResult<Rc<dyn Session>>,
{
    fn launch(&self, options: &BrowserOptions) -> PomResult<Rc<dyn Session>> {
        self(options)
    }
}

/// A running browser and its session
#[derive(Debug)]
pub struct Browser {
    session: Rc<dyn Session>,
    options: BrowserOptions,
    config: PomConfig,
}

impl Browser {
    /// Start a browser through `launcher`
    pub fn launch(
        launcher: &impl Launcher,
        options: BrowserOptions,
        config: PomConfig,
    ) -> PomResult<Self> {
        config.validate()?;
        let session = launcher.launch(&options)?;
        info!(browser = %options.kind, flags = ?options.flags(), "launched browser");
        Ok(Self {
            session,
            options,
            config,
        })
    }

    /// Wrap a session that is already running
    #[must_use]
    pub fn from_session(session: Rc<dyn Session>, config: PomConfig) -> Self {
        Self {
            session,
            options: BrowserOptions::default(),
            config,
        }
    }

    /// Navigate to `url`
    pub fn open_url(&self, url: &str) -> PomResult<()> {
        self.session.open(url)?;
        info!(url, "opened url");
        Ok(())
    }

    /// End the session and close every window
    pub fn quit(self) -> PomResult<()> {
        self.session.quit()?;
        info!(browser = %self.options.kind, "quit browser");
        Ok(())
    }

    /// The session page objects resolve against
    #[must_use]
    pub fn session(&self) -> &Rc<dyn Session> {
        &self.session
    }

    /// Options the browser was started with
    #[must_use]
    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &PomConfig {
        &self.config
    }

    /// Document root, carrying the configured element and options waits
    #[must_use]
    pub fn root(&self) -> Parent {
        Parent::root(Rc::clone(&self.session))
            .with_wait(self.config.element_wait())
            .with_options_wait(self.config.options_wait())
    }

    /// Configured budget for dropdown options
    #[must_use]
    pub const fn options_wait(&self) -> WaitOptions {
        self.config.options_wait()
    }
}

impl From<&Browser> for Parent {
    fn from(browser: &Browser) -> Self {
        browser.root()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::WaitSettings;
    use crate::dropdown::Dropdown;
    use crate::element::Element;
    use crate::locator::Locator;
    use crate::mock::MockSession;
    use crate::result::PomError;
    use std::cell::RefCell;

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = BrowserOptions::default();
            assert_eq!(options.kind, BrowserKind::Chrome);
            assert_eq!(options.flags(), vec!["--window-size=1280,720"]);
        }

        #[test]
        fn test_flags_in_order() {
            let options = BrowserOptions::new(BrowserKind::Edge)
                .with_window_size(1920, 1080)
                .with_argument(BrowserArgument::DisableInfoBars)
                .with_argument(BrowserArgument::IgnoreCertificateErrors)
                .with_argument(BrowserArgument::Custom("headless".to_string()))
                .with_argument(BrowserArgument::Custom("--no-sandbox".to_string()));
            assert_eq!(
                options.flags(),
                vec![
                    "--window-size=1920,1080",
                    "--disable-infobars",
                    "--ignore-certificate-errors",
                    "--headless",
                    "--no-sandbox",
                ]
            );
        }

        #[test]
        fn test_deserialize_yaml() {
            let options: BrowserOptions =
                serde_yaml_ng::from_str("kind: firefox\narguments: [disable_info_bars]\n").unwrap();
            assert_eq!(options.kind, BrowserKind::Firefox);
            assert_eq!(options.window_width, DEFAULT_WINDOW_WIDTH);
            assert_eq!(options.arguments, vec![BrowserArgument::DisableInfoBars]);
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_launch_passes_options() {
            let mock = Rc::new(MockSession::new());
            let seen = RefCell::new(Vec::new());
            let session: Rc<dyn Session> = mock.clone();
            let launcher = |options: &BrowserOptions| -> PomResult<Rc<dyn Session>> {
                seen.borrow_mut().extend(options.flags());
                Ok(Rc::clone(&session))
            };

            let browser =
                Browser::launch(&launcher, BrowserOptions::default(), PomConfig::default()).unwrap();
            browser.open_url("https://example.test/").unwrap();
            browser.quit().unwrap();

            assert_eq!(*seen.borrow(), vec!["--window-size=1280,720"]);
            assert_eq!(mock.current_url().as_deref(), Some("https://example.test/"));
            assert!(mock.is_closed());
        }

        #[test]
        fn test_launch_failure() {
            let launcher =
                |_: &BrowserOptions| -> PomResult<Rc<dyn Session>> { Err(PomError::session("no driver")) };
            assert!(matches!(
                Browser::launch(&launcher, BrowserOptions::default(), PomConfig::default()),
                Err(PomError::Session { .. })
            ));
        }

        #[test]
        fn test_invalid_config_rejected_before_launch() {
            let launcher = |_: &BrowserOptions| -> PomResult<Rc<dyn Session>> {
                panic!("launcher must not run");
            };
            let config = PomConfig::new().with_wait(WaitSettings {
                poll_interval_ms: 0,
                ..WaitSettings::default()
            });
            assert!(matches!(
                Browser::launch(&launcher, BrowserOptions::default(), config),
                Err(PomError::Config { .. })
            ));
        }

        #[test]
        fn test_root_carries_configured_wait() {
            let config = PomConfig::new().with_wait(WaitSettings {
                element_timeout_ms: 2_000,
                poll_interval_ms: 50,
                ..WaitSettings::default()
            });
            let browser = Browser::from_session(Rc::new(MockSession::new()), config);
            assert_eq!(
                browser.root().wait(),
                WaitOptions::new().with_timeout(2_000).with_poll_interval(50)
            );
            assert_eq!(Parent::from(&browser).describe(), "document");
            assert_eq!(browser.options_wait(), WaitOptions::for_options());
        }

        #[test]
        fn test_root_carries_configured_options_wait() {
            let config = PomConfig::new().with_wait(WaitSettings {
                options_timeout_ms: 300,
                options_poll_interval_ms: 20,
                ..WaitSettings::default()
            });
            let browser = Browser::from_session(Rc::new(MockSession::new()), config);
            let expected = WaitOptions::new().with_timeout(300).with_poll_interval(20);
            assert_eq!(browser.root().options_wait(), expected);

            let trigger = Element::new(&browser, Locator::css("button.menu"));
            let menu = Dropdown::from_trigger(trigger, Locator::css(".menu"), Locator::css("li"));
            assert_eq!(menu.options_wait(), expected);
            assert_eq!(menu.container().options_wait(), expected);
        }
    }
}
