//! Expected conditions evaluated by explicit waits.
//!
//! Single elements are checked directly. Collections and lazy locators use an
//! ANY policy: the condition holds once at least one member satisfies it, so
//! an empty collection never becomes visible or clickable.

use crate::driver::{ElementHandle, WebDriver};
use crate::field::FieldTarget;
use crate::locator::By;
use crate::result::PageResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State a tagged field must reach before the page counts as loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    /// The field holds an element (or its locator matches one)
    Existence,
    /// Driver-reported visibility
    Visible,
    /// Visible and enabled
    Clickable,
}

impl ElementState {
    /// Adjective used in wait descriptions
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Existence => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `element` is displayed
pub fn element_visible(driver: &dyn WebDriver, element: &ElementHandle) -> PageResult<bool> {
    driver.is_displayed(element)
}

/// Whether `element` is displayed and enabled
pub fn element_clickable(driver: &dyn WebDriver, element: &ElementHandle) -> PageResult<bool> {
    Ok(driver.is_displayed(element)? && driver.is_enabled(element)?)
}

/// Whether any of `elements` is displayed
pub fn any_visible(driver: &dyn WebDriver, elements: &[ElementHandle]) -> PageResult<bool> {
    any_member(elements, |element| element_visible(driver, element))
}

/// Whether any of `elements` is displayed and enabled
pub fn any_clickable(driver: &dyn WebDriver, elements: &[ElementHandle]) -> PageResult<bool> {
    any_member(elements, |element| element_clickable(driver, element))
}

/// First member satisfying `predicate` wins. A member that went stale or
/// vanished counts as unsatisfied; other errors abort.
fn any_member<F>(elements: &[ElementHandle], mut predicate: F) -> PageResult<bool>
where
    F: FnMut(&ElementHandle) -> PageResult<bool>,
{
    for element in elements {
        match predicate(element) {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) if e.is_transient() => {
                tracing::trace!(element = %element.id, error = %e, "skipping member");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

/// Whether `by` currently matches at least one element
pub fn locator_present(driver: &dyn WebDriver, by: &By) -> PageResult<bool> {
    Ok(!driver.find_elements(by)?.is_empty())
}

/// Evaluate `state` against a field target once.
///
/// A held element or collection already exists; only lazy locators need the
/// driver to answer an existence check.
pub fn check(driver: &dyn WebDriver, state: ElementState, target: &FieldTarget<'_>) -> PageResult<bool> {
    match (state, target) {
        (ElementState::Existence, FieldTarget::Single(_) | FieldTarget::Many(_)) => Ok(true),
        (ElementState::Existence, FieldTarget::Lazy(by)) => locator_present(driver, by),
        (ElementState::Visible, FieldTarget::Single(el)) => element_visible(driver, el),
        (ElementState::Visible, FieldTarget::Many(els)) => any_visible(driver, els),
        (ElementState::Visible, FieldTarget::Lazy(by)) => any_visible(driver, &driver.find_elements(by)?),
        (ElementState::Clickable, FieldTarget::Single(el)) => element_clickable(driver, el),
        (ElementState::Clickable, FieldTarget::Many(els)) => any_clickable(driver, els),
        (ElementState::Clickable, FieldTarget::Lazy(by)) => {
            any_clickable(driver, &driver.find_elements(by)?)
        }
    }
}
