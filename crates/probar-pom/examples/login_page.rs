//! Login page object driven against the in-memory session.
//!
//! Run with: `cargo run --example login_page`
//! Set `PROBAR_POM_LOG=debug` to see every query and wait.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::print_stdout)]

use std::rc::Rc;

use probar_pom::prelude::*;
use probar_pom::logging;

struct LoginPage {
    email: Input,
    password: Input,
    remember: Checkbox,
    submit: Button,
    region: SingleSelectDropdown,
}

impl LoginPage {
    fn new(browser: &Browser) -> Self {
        let form = Element::new(browser, Locator::css("form#login"));
        Self {
            email: Input::with_locator(&form, Locator::name("email")),
            password: Input::with_locator(&form, Locator::name("password")),
            remember: Checkbox::new(&form),
            submit: Button::with_locator(&form, Locator::css("button[type=submit]")),
            region: SingleSelectDropdown::new(&form),
        }
    }

    fn login(&self, email: &str, password: &str, region: &str) -> PomResult<()> {
        self.region.select_option(region)?;
        self.email.enter_value(email, true)?;
        self.password.enter_value(password, true)?;
        self.remember.check()?;
        self.submit.click()
    }
}

impl PageObject for LoginPage {
    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn is_loaded(&self) -> PomResult<bool> {
        self.submit.is_enabled()
    }

    fn page_name(&self) -> &str {
        "login"
    }
}

/// Lay out a login form in the mock session
fn login_form(session: &MockSession) -> NodeRef {
    let form = session.add_node(
        MockNode::new()
            .matching(Locator::css("form#login"))
            .appears_after(1),
    );
    session.add_child(&form, MockNode::new().matching(Locator::name("email")));
    session.add_child(&form, MockNode::new().matching(Locator::name("password")));
    let remember = session.add_child(
        &form,
        MockNode::new().matching(Locator::css(Checkbox::DEFAULT_SELECTOR)),
    );
    session.on_click(&remember, Effect::ToggleSelected(remember.clone()));

    let trigger = session.add_child(
        &form,
        MockNode::new()
            .matching(Locator::css(SingleSelectDropdown::DEFAULT_SELECTOR))
            .attribute("aria-expanded", "false")
            .text("Region"),
    );
    session.on_click(
        &trigger,
        Effect::SetAttribute {
            node: trigger.clone(),
            name: "aria-expanded".to_string(),
            value: "true".to_string(),
        },
    );
    let panel = session.add_node(
        MockNode::new().matching(Locator::css(SingleSelectDropdown::DEFAULT_EXPANDED_SELECTOR)),
    );
    for region in ["Europe", "Americas", "Asia Pacific"] {
        let option = session.add_child(
            &panel,
            MockNode::new()
                .matching(Locator::css(SingleSelectDropdown::DEFAULT_OPTIONS_SELECTOR))
                .text(region),
        );
        session.on_click(
            &option,
            Effect::SetText {
                node: trigger.clone(),
                text: region.to_string(),
            },
        );
    }

    session.add_child(
        &form,
        MockNode::new().matching(Locator::css("button[type=submit]")),
    )
}

fn main() -> PomResult<()> {
    let config = PomConfig::from_yaml_str(
        "log_level: info\nwait:\n  element_timeout_ms: 2000\n  poll_interval_ms: 50\n  options_timeout_ms: 1000\n  options_poll_interval_ms: 50\n",
    )?;
    let _ = logging::init(&config);

    let mock = Rc::new(MockSession::new());
    let submit = login_form(&mock);
    let session: Rc<dyn Session> = mock.clone();
    let launcher = move |_: &BrowserOptions| -> PomResult<Rc<dyn Session>> { Ok(Rc::clone(&session)) };

    let options = BrowserOptions::new(BrowserKind::Chrome)
        .with_argument(BrowserArgument::DisableInfoBars)
        .with_argument(BrowserArgument::IgnoreCertificateErrors);
    let browser = Browser::launch(&launcher, options, config)?;
    browser.open_url("https://app.example.test/login")?;

    let page = LoginPage::new(&browser);
    page.wait_until_loaded()?;
    page.login("ann@example.test", "hunter2", "asia pacific")?;

    println!("region:   {}", page.region.selected()?);
    println!("email:    {}", page.email.current_value()?);
    println!("remember: {}", page.remember.is_checked()?);
    println!("submits:  {}", mock.clicks_on(&submit));
    println!("queries:  {}", mock.calls("query_one") + mock.calls("query_many"));

    browser.quit()
}
