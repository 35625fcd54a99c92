//! pagewait: page objects that wait for themselves to load
//!
//! A page object embeds a [`PageBase`] (driver handle plus wait settings) and
//! declares its elements as fields. Field tags say what "loaded" means:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  #[derive(PageObject)]                                       │
//! │  struct SearchPage {                                         │
//! │      base: PageBase,          ──► driver + Waiter (30s)      │
//! │      #[visible]   query,      ──► is_displayed               │
//! │      #[clickable] submit,     ──► is_displayed && is_enabled │
//! │      #[existence] results,    ──► located (ANY for lists)    │
//! │  }                                                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `wait_until_loaded()` walks the tagged fields in declaration order and
//! polls each one until it holds or the wait times out. Actions
//! (`click_button`, `send_keys`) wait for clickability and log before and
//! after acting.
//!
//! Browsers are reached through the [`WebDriver`] trait. [`MockDriver`] is an
//! in-memory implementation for tests; `CdpDriver` (feature `browser`) drives
//! Chromium over the `DevTools` protocol.

#![warn(missing_docs)]

extern crate self as pagewait;

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
mod cdp;
#[allow(clippy::missing_errors_doc)]
mod conditions;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod config;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod driver;
mod field;
mod locator;
pub mod logging;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod page_object;
mod result;
mod wait;

#[cfg(feature = "browser")]
pub use cdp::{BrowserConfig, CdpDriver};
pub use conditions::{
    any_clickable, any_visible, check, element_clickable, element_visible, locator_present,
    ElementState,
};
pub use config::{
    FieldPolicy, PageConfig, ENV_FIELD_POLICY, ENV_POLL_INTERVAL_MS, ENV_TIMEOUT_MS,
};
pub use driver::{ElementHandle, MockDriver, MockElement, WebDriver};
pub use field::{ElementField, FieldRequirement, FieldTarget, FindBy};
pub use locator::By;
pub use page_object::{PageBase, PageObject};
pub use result::{PageError, PageResult};
pub use wait::{WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Derive macro generating [`PageObject`] from tagged fields
#[cfg(feature = "derive")]
pub use pagewait_derive::PageObject;

/// Everything a page-object module usually needs
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use crate::{BrowserConfig, CdpDriver};
    pub use crate::{
        By, ElementHandle, ElementState, FieldPolicy, FindBy, PageBase, PageConfig, PageError,
        PageObject, PageResult, WebDriver,
    };
}
