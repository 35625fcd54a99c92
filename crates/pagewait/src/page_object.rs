//! Page Object Model Support
//!
//! A page object is a plain struct that embeds a [`PageBase`] and declares its
//! elements as fields. Tagging those fields with `#[existence]`, `#[visible]`
//! or `#[clickable]` and deriving [`PageObject`](crate::PageObject) gives the
//! struct a [`PageObject::wait_until_loaded`] that blocks until every tagged
//! field reaches its state.
//!
//! # Example
//!
//! ```ignore
//! #[derive(PageObject)]
//! struct LoginPage {
//!     base: PageBase,
//!     #[visible]
//!     username: ElementHandle,
//!     #[clickable]
//!     submit: ElementHandle,
//!     #[existence]
//!     #[visible]
//!     banners: FindBy,
//! }
//!
//! impl LoginPage {
//!     fn open(base: PageBase) -> PageResult<Self> {
//!         Self {
//!             username: base.find_element(&By::name("username"))?,
//!             submit: base.find_element(&By::css("button[type=submit]"))?,
//!             banners: FindBy::css(".banner"),
//!             base,
//!         }
//!         .loaded()
//!     }
//!
//!     fn login(&self, user: &str) -> PageResult<&Self> {
//!         self.send_keys(&self.username, user, "username")?
//!             .click_button(&self.submit, "submit")
//!     }
//! }
//! ```

use crate::conditions::{self, ElementState};
use crate::config::{FieldPolicy, PageConfig};
use crate::driver::{ElementHandle, WebDriver};
use crate::field::{ElementField, FieldRequirement};
use crate::locator::By;
use crate::result::{PageError, PageResult};
use crate::wait::{WaitResult, Waiter};
use std::fmt;
use std::sync::Arc;

/// Driver handle plus wait settings shared by a page object's operations
#[derive(Clone)]
pub struct PageBase {
    driver: Arc<dyn WebDriver>,
    waiter: Waiter,
    field_policy: FieldPolicy,
}

impl fmt::Debug for PageBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBase")
            .field("waiter", &self.waiter)
            .field("field_policy", &self.field_policy)
            .finish_non_exhaustive()
    }
}

impl PageBase {
    /// Wrap a driver with the default 30 second wait
    #[must_use]
    pub fn new(driver: Arc<dyn WebDriver>) -> Self {
        Self::with_config(driver, &PageConfig::default())
    }

    /// Wrap a driver with explicit settings
    #[must_use]
    pub fn with_config(driver: Arc<dyn WebDriver>, config: &PageConfig) -> Self {
        Self {
            driver,
            waiter: Waiter::with_options(config.wait_options()),
            field_policy: config.field_policy,
        }
    }

    /// The wrapped driver
    #[must_use]
    pub fn driver(&self) -> &dyn WebDriver {
        self.driver.as_ref()
    }

    /// Shared handle to the wrapped driver, for building further pages
    #[must_use]
    pub fn driver_handle(&self) -> Arc<dyn WebDriver> {
        Arc::clone(&self.driver)
    }

    /// Waiter used for every explicit wait on this page
    #[must_use]
    pub const fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    /// Policy for unreadable tagged fields
    #[must_use]
    pub const fn field_policy(&self) -> FieldPolicy {
        self.field_policy
    }

    // ------------------------------------------------------------------
    // Location pass-throughs
    // ------------------------------------------------------------------

    /// Pass-through to the driver
    pub fn find_element(&self, by: &By) -> PageResult<ElementHandle> {
        self.driver.find_element(by)
    }

    /// Pass-through to the driver
    pub fn find_elements(&self, by: &By) -> PageResult<Vec<ElementHandle>> {
        self.driver.find_elements(by)
    }

    /// Find the first element under `root`
    pub fn find_element_in(&self, by: &By, root: &ElementHandle) -> PageResult<ElementHandle> {
        self.driver.find_element_in(root, by)
    }

    /// Find all elements under `root`
    pub fn find_elements_in(&self, by: &By, root: &ElementHandle) -> PageResult<Vec<ElementHandle>> {
        self.driver.find_elements_in(root, by)
    }

    // ------------------------------------------------------------------
    // Waits
    // ------------------------------------------------------------------

    /// Block until `element` is visible and enabled; `name` labels the wait
    pub fn wait_for_clickable(&self, element: &ElementHandle, name: &str) -> PageResult<WaitResult> {
        let driver = self.driver();
        self.waiter
            .until(&format!("{name} to be clickable"), || {
                conditions::element_clickable(driver, element)
            })
    }

    /// Block until every requirement holds, in order.
    ///
    /// Requirements whose field cannot be read are logged and skipped under
    /// [`FieldPolicy::Lenient`].
    pub fn wait_for_requirements(&self, requirements: &[FieldRequirement<'_>]) -> PageResult<()> {
        for req in requirements {
            self.wait_for_field(req.name, req.state, req.field)?;
        }
        Ok(())
    }

    /// Block until one field reaches `state`
    pub fn wait_for_field(
        &self,
        name: &str,
        state: ElementState,
        field: &dyn ElementField,
    ) -> PageResult<()> {
        let Some(target) = field.target() else {
            return match self.field_policy {
                FieldPolicy::Lenient => {
                    tracing::info!(field = name, %state, "Could not determine field value");
                    Ok(())
                }
                FieldPolicy::Strict => Err(PageError::FieldUnavailable {
                    field: name.to_string(),
                }),
            };
        };

        let driver = self.driver();
        let result = self
            .waiter
            .until(&format!("{name} to be {state}"), || {
                conditions::check(driver, state, &target)
            })?;
        tracing::debug!(
            field = name,
            %state,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "field ready"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Wait for `element` to be clickable, then click it
    pub fn click_button(&self, element: &ElementHandle, name: &str) -> PageResult<()> {
        tracing::info!(element = name, "Clicking element {name}");
        self.wait_for_clickable(element, name)?;
        self.driver.click(element)?;
        tracing::info!(element = name, "Done clicking element {name}");
        Ok(())
    }

    /// Wait for `element` to be clickable, clear it, then type `keys`
    pub fn send_keys(&self, element: &ElementHandle, keys: &str, name: &str) -> PageResult<()> {
        tracing::info!(element = name, "Sending text \"{keys}\" to {name}");
        self.wait_for_clickable(element, name)?;
        self.driver.clear(element)?;
        self.driver.send_keys(element, keys)?;
        tracing::info!(element = name, "Done sending text \"{keys}\" to {name}");
        Ok(())
    }
}

/// Trait for page objects representing a page or component in the UI.
///
/// Usually derived. A manual implementation supplies [`PageObject::page`]
/// and, if it has tagged fields, [`PageObject::load_requirements`].
pub trait PageObject {
    /// The embedded page base
    fn page(&self) -> &PageBase;

    /// Tagged fields in evaluation order
    fn load_requirements(&self) -> Vec<FieldRequirement<'_>> {
        Vec::new()
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Pass-through to the driver
    fn find_element(&self, by: &By) -> PageResult<ElementHandle> {
        self.page().find_element(by)
    }

    /// Pass-through to the driver
    fn find_elements(&self, by: &By) -> PageResult<Vec<ElementHandle>> {
        self.page().find_elements(by)
    }

    /// Find the first element under `root`
    fn find_element_in(&self, by: &By, root: &ElementHandle) -> PageResult<ElementHandle> {
        self.page().find_element_in(by, root)
    }

    /// Find all elements under `root`
    fn find_elements_in(&self, by: &By, root: &ElementHandle) -> PageResult<Vec<ElementHandle>> {
        self.page().find_elements_in(by, root)
    }

    /// Wait for every tagged field to reach its state.
    ///
    /// When all of them have, the page counts as loaded.
    fn wait_until_loaded(&self) -> PageResult<&Self>
    where
        Self: Sized,
    {
        let requirements = self.load_requirements();
        tracing::debug!(
            page = self.page_name(),
            fields = requirements.len(),
            "waiting for page to load"
        );
        self.page().wait_for_requirements(&requirements)?;
        Ok(self)
    }

    /// Consuming form of [`PageObject::wait_until_loaded`] for constructors
    fn loaded(self) -> PageResult<Self>
    where
        Self: Sized,
    {
        self.wait_until_loaded()?;
        Ok(self)
    }

    /// Wait for `element` to be clickable, then click it
    fn click_button(&self, element: &ElementHandle, name: &str) -> PageResult<&Self>
    where
        Self: Sized,
    {
        self.page().click_button(element, name)?;
        Ok(self)
    }

    /// Wait for `element` to be clickable, clear it, then type `keys`
    fn send_keys(&self, element: &ElementHandle, keys: &str, name: &str) -> PageResult<&Self>
    where
        Self: Sized,
    {
        self.page().send_keys(element, keys, name)?;
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::field::FindBy;

    fn fast_config() -> PageConfig {
        PageConfig::new().with_timeout(100).with_poll_interval(5)
    }

    fn base(driver: &Arc<MockDriver>, config: &PageConfig) -> PageBase {
        let driver: Arc<dyn WebDriver> = driver.clone();
        PageBase::with_config(driver, config)
    }

    mod page_base_tests {
        use super::*;

        #[test]
        fn test_default_timeout_is_thirty_seconds() {
            let page = PageBase::new(Arc::new(MockDriver::new()));
            assert_eq!(page.waiter().options().timeout_ms, 30_000);
            assert_eq!(page.field_policy(), FieldPolicy::Lenient);
        }

        #[test]
        fn test_find_pass_through() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element(MockElement::new("list", "ul").matching(By::id("list")));
            driver.add_element(MockElement::new("a", "li").matching(By::tag_name("li")).within("list"));
            driver.add_element(MockElement::new("b", "li").matching(By::tag_name("li")).within("list"));
            let page = base(&driver, &fast_config());

            let list = page.find_element(&By::id("list")).unwrap();
            let items = page.find_elements_in(&By::tag_name("li"), &list).unwrap();
            assert_eq!(items.len(), 2);
            assert_eq!(page.find_element_in(&By::tag_name("li"), &list).unwrap().id, "a");
            assert!(page.find_elements(&By::css("table")).unwrap().is_empty());
        }

        #[test]
        fn test_click_waits_then_clicks() {
            let driver = Arc::new(MockDriver::new());
            let button = driver.add_element(MockElement::new("go", "button").visible_after(2));
            let page = base(&driver, &fast_config());

            page.click_button(&button, "Go").unwrap();
            let history = driver.history();
            let first_click = history.iter().position(|c| c == "click:go").unwrap();
            let last_check = history.iter().rposition(|c| c == "is_displayed:go").unwrap();
            assert!(last_check < first_click);
        }

        #[test]
        fn test_click_times_out_on_disabled() {
            let driver = Arc::new(MockDriver::new());
            let button = driver.add_element(MockElement::new("go", "button").enabled(false));
            let page = base(&driver, &fast_config());

            let err = page.click_button(&button, "Go").unwrap_err();
            assert!(matches!(err, PageError::Timeout { ref waited_for, .. } if waited_for == "Go to be clickable"));
            assert!(!driver.was_called("click:"));
        }

        #[test]
        fn test_click_error_propagates() {
            let driver = Arc::new(MockDriver::new());
            let button = driver.add_element(MockElement::new("go", "button").not_interactable("overlay"));
            let page = base(&driver, &fast_config());

            let err = page.click_button(&button, "Go").unwrap_err();
            assert!(matches!(err, PageError::ElementNotInteractable { .. }));
        }

        #[test]
        fn test_send_keys_clears_first() {
            let driver = Arc::new(MockDriver::new());
            let input = driver.add_element(MockElement::new("q", "input"));
            let page = base(&driver, &fast_config());

            page.send_keys(&input, "first", "Search").unwrap();
            page.send_keys(&input, "second", "Search").unwrap();
            assert_eq!(driver.value_of("q"), Some("second".to_string()));
            assert_eq!(driver.call_count("clear:q"), 2);
        }
    }

    mod log_tests {
        use super::*;
        use std::sync::Mutex;
        use tracing::field::{Field, Visit};
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        /// (message, element or field name, driver calls so far)
        type Seen = Arc<Mutex<Vec<(String, Option<String>, usize)>>>;

        struct Capture {
            driver: Arc<MockDriver>,
            seen: Seen,
        }

        #[derive(Default)]
        struct Fields {
            message: String,
            element: Option<String>,
        }

        impl Visit for Fields {
            fn record_str(&mut self, field: &Field, value: &str) {
                match field.name() {
                    "element" | "field" => self.element = Some(value.to_string()),
                    "message" => self.message = value.to_string(),
                    _ => {}
                }
            }

            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{value:?}");
                }
            }
        }

        impl<S: tracing::Subscriber> Layer<S> for Capture {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                let mut fields = Fields::default();
                event.record(&mut fields);
                let calls = self.driver.history().len();
                self.seen
                    .lock()
                    .unwrap()
                    .push((fields.message, fields.element, calls));
            }
        }

        fn capture<R>(driver: &Arc<MockDriver>, f: impl FnOnce() -> R) -> (R, Vec<(String, Option<String>, usize)>) {
            let seen = Seen::default();
            let subscriber = tracing_subscriber::registry().with(Capture {
                driver: driver.clone(),
                seen: seen.clone(),
            });
            let out = tracing::subscriber::with_default(subscriber, f);
            let events = seen.lock().unwrap().clone();
            (out, events)
        }

        fn position(events: &[(String, Option<String>, usize)], message: &str) -> usize {
            events
                .iter()
                .position(|(m, _, _)| m == message)
                .unwrap_or_else(|| panic!("no event {message:?} in {events:?}"))
        }

        #[test]
        fn test_click_logged_around_click() {
            let driver = Arc::new(MockDriver::new());
            let button = driver.add_element(MockElement::new("go", "button"));
            let page = base(&driver, &fast_config());

            let (result, events) = capture(&driver, || page.click_button(&button, "Go"));
            result.unwrap();

            let click = driver.history().iter().position(|c| c == "click:go").unwrap();
            let before = &events[position(&events, "Clicking element Go")];
            let after = &events[position(&events, "Done clicking element Go")];
            assert_eq!(before.1.as_deref(), Some("Go"));
            assert_eq!(after.1.as_deref(), Some("Go"));
            assert!(before.2 <= click);
            assert!(after.2 > click);
        }

        #[test]
        fn test_send_keys_logged_around_typing() {
            let driver = Arc::new(MockDriver::new());
            let input = driver.add_element(MockElement::new("q", "input"));
            let page = base(&driver, &fast_config());

            let (result, events) = capture(&driver, || page.send_keys(&input, "rust", "Search"));
            result.unwrap();

            let typed = driver
                .history()
                .iter()
                .position(|c| c == "send_keys:q:rust")
                .unwrap();
            let before = position(&events, "Sending text \"rust\" to Search");
            let after = position(&events, "Done sending text \"rust\" to Search");
            assert!(before < after);
            assert_eq!(events[before].1.as_deref(), Some("Search"));
            assert!(events[before].2 <= typed);
            assert!(events[after].2 > typed);
        }

        #[test]
        fn test_failed_click_has_no_done_line() {
            let driver = Arc::new(MockDriver::new());
            let button = driver.add_element(MockElement::new("go", "button").not_interactable("overlay"));
            let page = base(&driver, &fast_config());

            let (result, events) = capture(&driver, || page.click_button(&button, "Go"));
            assert!(result.is_err());
            position(&events, "Clicking element Go");
            assert!(!events.iter().any(|(m, _, _)| m == "Done clicking element Go"));
        }

        #[test]
        fn test_unreadable_field_logged_under_lenient_policy() {
            let driver = Arc::new(MockDriver::new());
            let page = base(&driver, &fast_config());
            let missing: Option<ElementHandle> = None;

            let (result, events) = capture(&driver, || {
                page.wait_for_field("sidebar", ElementState::Visible, &missing)
            });
            result.unwrap();
            let event = &events[position(&events, "Could not determine field value")];
            assert_eq!(event.1.as_deref(), Some("sidebar"));
        }
    }

    mod requirement_tests {
        use super::*;

        #[test]
        fn test_unreadable_field_lenient() {
            let driver = Arc::new(MockDriver::new());
            let page = base(&driver, &fast_config());
            let missing: Option<ElementHandle> = None;

            page.wait_for_field("missing", ElementState::Clickable, &missing)
                .unwrap();
            assert!(driver.history().is_empty());
        }

        #[test]
        fn test_unreadable_field_strict() {
            let driver = Arc::new(MockDriver::new());
            let page = base(&driver, &fast_config().with_field_policy(FieldPolicy::Strict));
            let missing: Option<ElementHandle> = None;

            let err = page
                .wait_for_field("missing", ElementState::Existence, &missing)
                .unwrap_err();
            assert!(matches!(err, PageError::FieldUnavailable { ref field } if field == "missing"));
        }

        #[test]
        fn test_requirements_stop_at_first_failure() {
            let driver = Arc::new(MockDriver::new());
            let hidden = driver.add_element(MockElement::new("h", "div").displayed(false));
            let shown = driver.add_element(MockElement::new("s", "div"));
            let page = base(&driver, &fast_config());

            let reqs = [
                FieldRequirement::new("hidden", ElementState::Visible, &hidden),
                FieldRequirement::new("shown", ElementState::Visible, &shown),
            ];
            let err = page.wait_for_requirements(&reqs).unwrap_err();
            assert!(
                matches!(err, PageError::Timeout { ref waited_for, .. } if waited_for == "hidden to be visible")
            );
            assert!(!driver.was_called("is_displayed:s"));
        }

        #[test]
        fn test_lazy_field_waits_for_element_to_appear() {
            let driver = Arc::new(MockDriver::new());
            let page = base(&driver, &PageConfig::new().with_timeout(2_000).with_poll_interval(5));
            let rows = FindBy::css("tr");

            std::thread::scope(|s| {
                s.spawn(|| {
                    std::thread::sleep(std::time::Duration::from_millis(30));
                    driver.add_element(MockElement::new("r1", "tr").matching(By::css("tr")));
                });
                page.wait_for_field("rows", ElementState::Existence, &rows)
                    .unwrap();
            });
            assert!(driver.call_count("find_elements:css=tr") >= 1);
        }
    }

    mod manual_impl_tests {
        use super::*;

        struct Banner {
            base: PageBase,
            text: ElementHandle,
        }

        impl PageObject for Banner {
            fn page(&self) -> &PageBase {
                &self.base
            }

            fn load_requirements(&self) -> Vec<FieldRequirement<'_>> {
                vec![FieldRequirement::new("text", ElementState::Visible, &self.text)]
            }
        }

        #[test]
        fn test_manual_page_object_loads() {
            let driver = Arc::new(MockDriver::new());
            let text = driver.add_element(MockElement::new("t", "p").visible_after(1));
            let page = Banner {
                base: base(&driver, &fast_config()),
                text,
            }
            .loaded()
            .unwrap();
            assert!(page.page_name().contains("Banner"));
        }

        #[test]
        fn test_fluent_actions() {
            let driver = Arc::new(MockDriver::new());
            let text = driver.add_element(MockElement::new("t", "input"));
            let page = Banner {
                base: base(&driver, &fast_config()),
                text: text.clone(),
            };
            page.send_keys(&text, "hi", "text")
                .unwrap()
                .click_button(&text, "text")
                .unwrap();
            assert!(driver.was_called("click:t"));
        }
    }
}
