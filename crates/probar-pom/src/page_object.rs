//! Page objects.
//!
//! A page object groups the elements of one page (or one reusable
//! component) behind methods named after what a user does with it:
//!
//! ```ignore
//! struct LoginPage {
//!     email: Input,
//!     password: Input,
//!     submit: Button,
//! }
//!
//! impl LoginPage {
//!     fn new(browser: &Browser) -> Self {
//!         let form = Element::new(browser, Locator::css("form#login"));
//!         Self {
//!             email: Input::with_locator(&form, Locator::name("email")),
//!             password: Input::with_locator(&form, Locator::name("password")),
//!             submit: Button::new(&form),
//!         }
//!     }
//!
//!     fn login(&self, email: &str, password: &str) -> PomResult<()> {
//!         self.email.enter_value(email, true)?;
//!         self.password.enter_value(password, true)?;
//!         self.submit.click()
//!     }
//! }
//!
//! impl PageObject for LoginPage {
//!     fn url_pattern(&self) -> &str {
//!         "/login"
//!     }
//!
//!     fn is_loaded(&self) -> PomResult<bool> {
//!         self.submit.is_displayed()
//!     }
//! }
//! ```

use std::collections::HashMap;

use tracing::info;

use crate::result::{PomError, PomResult};
use crate::wait::{WaitOptions, Waiter};

/// Default page load budget (30 seconds)
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;

/// A page or component of the UI under test
pub trait PageObject {
    /// URL path pattern of the page (e.g. `/login`, `/users/:id`)
    fn url_pattern(&self) -> &str;

    /// Whether the page is ready for interaction
    fn is_loaded(&self) -> PomResult<bool> {
        Ok(true)
    }

    /// Budget for [`PageObject::wait_until_loaded`]
    fn load_timeout(&self) -> WaitOptions {
        WaitOptions::new().with_timeout(DEFAULT_LOAD_TIMEOUT_MS)
    }

    /// Name for logs
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether `url` belongs to this page
    fn matches_url(&self, url: &str) -> bool {
        UrlMatcher::new(self.url_pattern()).matches(url)
    }

    /// Poll [`PageObject::is_loaded`] until it holds.
    ///
    /// An element that is missing or detached while the page renders counts
    /// as not loaded yet. Fails with [`PomError::Timeout`] when the load
    /// budget runs out.
    fn wait_until_loaded(&self) -> PomResult<()> {
        let waited_for = format!("{} to load", self.page_name());
        let result = Waiter::with_options(self.load_timeout()).wait_for_function(&waited_for, || {
            match self.is_loaded() {
                Ok(loaded) => Ok(loaded),
                Err(e) if e.is_transient() || matches!(e, PomError::StaleElement { .. }) => {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })?;
        info!(
            page = self.page_name(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "page loaded"
        );
        Ok(())
    }
}

/// Matches URL paths against a page pattern
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Compile a pattern.
    ///
    /// Patterns are made of `/`-separated segments:
    /// - literals: `/login`
    /// - wildcards: `/users/*`
    /// - named parameters: `/users/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = path_segments(pattern)
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Whether `url` matches.
    ///
    /// `url` may be a bare path or an absolute URL; scheme, host, query and
    /// fragment are ignored. Every pattern segment consumes exactly one path
    /// segment.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path: Vec<&str> = path_segments(url_path(url)).collect();
        path.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&path)
                .all(|(segment, actual)| match segment {
                    UrlSegment::Literal(literal) => literal == actual,
                    UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
                })
    }

    /// Values of the named parameters in `url`; empty when it does not match
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        if !self.matches(url) {
            return HashMap::new();
        }
        self.segments
            .iter()
            .zip(path_segments(url_path(url)))
            .filter_map(|(segment, actual)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), actual.to_string())),
                UrlSegment::Literal(_) | UrlSegment::Wildcard => None,
            })
            .collect()
    }

    /// The pattern as written
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Path part of `url`, without scheme, host, query or fragment
fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if without_scheme.len() == url.len() {
        without_scheme
    } else {
        without_scheme
            .find('/')
            .map_or("", |slash| &without_scheme[slash..])
    };
    path.split(['?', '#']).next().unwrap_or_default()
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Dashboard {
        checks: Cell<u32>,
        ready_after: u32,
    }

    impl PageObject for Dashboard {
        fn url_pattern(&self) -> &str {
            "/dashboard/:team"
        }

        fn is_loaded(&self) -> PomResult<bool> {
            self.checks.set(self.checks.get() + 1);
            if self.checks.get() == 1 {
                return Err(PomError::NodeDetached {
                    node: "mock-0".to_string(),
                });
            }
            Ok(self.checks.get() > self.ready_after)
        }

        fn load_timeout(&self) -> WaitOptions {
            WaitOptions::new().with_timeout(100).with_poll_interval(5)
        }

        fn page_name(&self) -> &str {
            "dashboard"
        }
    }

    mod page_object_tests {
        use super::*;

        #[test]
        fn test_wait_until_loaded() {
            let page = Dashboard {
                checks: Cell::new(0),
                ready_after: 3,
            };
            page.wait_until_loaded().unwrap();
            assert_eq!(page.checks.get(), 4);
        }

        #[test]
        fn test_wait_until_loaded_times_out() {
            let page = Dashboard {
                checks: Cell::new(0),
                ready_after: u32::MAX,
            };
            match page.wait_until_loaded().unwrap_err() {
                PomError::Timeout { waited_for, .. } => assert_eq!(waited_for, "dashboard to load"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_hard_failure_propagates() {
            struct Broken;
            impl PageObject for Broken {
                fn url_pattern(&self) -> &str {
                    "/"
                }
                fn is_loaded(&self) -> PomResult<bool> {
                    Err(PomError::session("browser gone"))
                }
            }
            assert!(matches!(
                Broken.wait_until_loaded(),
                Err(PomError::Session { .. })
            ));
        }

        #[test]
        fn test_defaults() {
            struct Plain;
            impl PageObject for Plain {
                fn url_pattern(&self) -> &str {
                    "/plain"
                }
            }
            assert!(Plain.is_loaded().unwrap());
            assert_eq!(Plain.load_timeout().timeout_ms, DEFAULT_LOAD_TIMEOUT_MS);
            assert!(Plain.page_name().ends_with("Plain"));
            assert!(Plain.matches_url("https://example.test/plain?tab=1"));
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal() {
            let matcher = UrlMatcher::new("/login");
            assert!(matcher.matches("/login"));
            assert!(matcher.matches("/login/"));
            assert!(!matcher.matches("/logout"));
            assert!(!matcher.matches("/login/extra"));
        }

        #[test]
        fn test_wildcard_consumes_one_segment() {
            let matcher = UrlMatcher::new("/users/*");
            assert!(matcher.matches("/users/42"));
            assert!(!matcher.matches("/users"));
            assert!(!matcher.matches("/users/42/edit"));
        }

        #[test]
        fn test_absolute_url() {
            let matcher = UrlMatcher::new("/orders/:id");
            assert!(matcher.matches("https://shop.example.test/orders/7#summary"));
            assert!(!matcher.matches("https://shop.example.test/"));
            assert_eq!(matcher.pattern(), "/orders/:id");
        }

        #[test]
        fn test_extract_params() {
            let matcher = UrlMatcher::new("/teams/:team/members/:member");
            let params = matcher.extract_params("http://localhost:8080/teams/core/members/ann?x=1");
            assert_eq!(params.get("team").map(String::as_str), Some("core"));
            assert_eq!(params.get("member").map(String::as_str), Some("ann"));
            assert!(matcher.extract_params("/teams/core").is_empty());
        }
    }
}
