//! WebDriver - Abstract Browser Automation Trait
//!
//! Everything that touches a real browser goes through [`WebDriver`]. Page
//! objects never talk to a browser directly, which lets the same page object
//! run against the CDP driver (feature `browser`) or the in-memory
//! [`MockDriver`] in unit tests.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  WebDriver (blocking trait)                              │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐        ┌────────────────────┐    │
//! │  │  CdpDriver         │        │  MockDriver        │    │
//! │  │  chromiumoxide     │        │  scripted elements │    │
//! │  └────────────────────┘        └────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

use crate::locator::By;
use crate::result::{PageError, PageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Handle to an element located by a driver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: String,
    /// Element tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

/// Abstract driver trait for browser automation.
///
/// All calls block until the browser answers. Matching rules, error kinds and
/// timing are the implementation's; callers add no semantics on top.
pub trait WebDriver: Send + Sync {
    /// Find all elements in the document matching `by`
    fn find_elements(&self, by: &By) -> PageResult<Vec<ElementHandle>>;

    /// Find all elements under `root` matching `by`
    fn find_elements_in(&self, root: &ElementHandle, by: &By) -> PageResult<Vec<ElementHandle>>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: &ElementHandle) -> PageResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&self, element: &ElementHandle) -> PageResult<bool>;

    /// Click the element
    fn click(&self, element: &ElementHandle) -> PageResult<()>;

    /// Clear the element's editable value
    fn clear(&self, element: &ElementHandle) -> PageResult<()>;

    /// Type text into the element
    fn send_keys(&self, element: &ElementHandle, text: &str) -> PageResult<()>;

    /// Find the first element in the document matching `by`
    fn find_element(&self, by: &By) -> PageResult<ElementHandle> {
        self.find_elements(by)?
            .into_iter()
            .next()
            .ok_or_else(|| PageError::NoSuchElement {
                locator: by.to_string(),
            })
    }

    /// Find the first element under `root` matching `by`
    fn find_element_in(&self, root: &ElementHandle, by: &By) -> PageResult<ElementHandle> {
        self.find_elements_in(root, by)?
            .into_iter()
            .next()
            .ok_or_else(|| PageError::NoSuchElement {
                locator: by.to_string(),
            })
    }
}

// ============================================================================
// Mock driver
// ============================================================================

/// Scripted element for [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockElement {
    handle: ElementHandle,
    locators: Vec<By>,
    parent: Option<String>,
    displayed: bool,
    enabled: bool,
    hidden_checks: u32,
    interactable_error: Option<String>,
}

impl MockElement {
    /// Create a displayed, enabled element
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            handle: ElementHandle::new(id, tag_name),
            locators: Vec::new(),
            parent: None,
            displayed: true,
            enabled: true,
            hidden_checks: 0,
            interactable_error: None,
        }
    }

    /// Make the element match a locator
    #[must_use]
    pub fn matching(mut self, by: By) -> Self {
        self.locators.push(by);
        self
    }

    /// Nest the element under another element
    #[must_use]
    pub fn within(mut self, parent_id: impl Into<String>) -> Self {
        self.parent = Some(parent_id.into());
        self
    }

    /// Set initial visibility
    #[must_use]
    pub const fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    /// Set initial enabled state
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Report the element as hidden for the first `checks` visibility queries
    #[must_use]
    pub const fn visible_after(mut self, checks: u32) -> Self {
        self.hidden_checks = checks;
        self
    }

    /// Make click, clear and send-keys fail with `ElementNotInteractable`
    #[must_use]
    pub fn not_interactable(mut self, message: impl Into<String>) -> Self {
        self.interactable_error = Some(message.into());
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    elements: Vec<MockElement>,
    values: HashMap<String, String>,
    call_history: Vec<String>,
}

/// In-memory driver for unit testing.
///
/// Elements are registered up front with [`MockElement`]; the driver answers
/// lookups from that registry and records every call for later verification.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register an element and return its handle
    pub fn add_element(&self, element: MockElement) -> ElementHandle {
        let handle = element.handle.clone();
        self.state().elements.push(element);
        handle
    }

    /// Change an element's visibility
    pub fn set_displayed(&self, id: &str, displayed: bool) {
        if let Some(el) = self.state().elements.iter_mut().find(|e| e.handle.id == id) {
            el.displayed = displayed;
            el.hidden_checks = 0;
        }
    }

    /// Change an element's enabled state
    pub fn set_enabled(&self, id: &str, enabled: bool) {
        if let Some(el) = self.state().elements.iter_mut().find(|e| e.handle.id == id) {
            el.enabled = enabled;
        }
    }

    /// Detach an element; later calls on its handle report a stale reference
    pub fn remove_element(&self, id: &str) {
        self.state().elements.retain(|e| e.handle.id != id);
    }

    /// Current editable value of an element
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.state().values.get(id).cloned()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn live<'a>(state: &'a mut MockState, element: &ElementHandle) -> PageResult<&'a mut MockElement> {
        state
            .elements
            .iter_mut()
            .find(|e| e.handle.id == element.id)
            .ok_or_else(|| PageError::StaleElement {
                id: element.id.clone(),
            })
    }

    fn interact(&self, element: &ElementHandle, call: String) -> PageResult<()> {
        let mut state = self.state();
        state.call_history.push(call);
        let el = Self::live(&mut state, element)?;
        match &el.interactable_error {
            Some(message) => Err(PageError::ElementNotInteractable {
                id: element.id.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl WebDriver for MockDriver {
    fn find_elements(&self, by: &By) -> PageResult<Vec<ElementHandle>> {
        let mut state = self.state();
        state.call_history.push(format!("find_elements:{by}"));
        Ok(state
            .elements
            .iter()
            .filter(|e| e.locators.contains(by))
            .map(|e| e.handle.clone())
            .collect())
    }

    fn find_elements_in(&self, root: &ElementHandle, by: &By) -> PageResult<Vec<ElementHandle>> {
        let mut state = self.state();
        state
            .call_history
            .push(format!("find_elements_in:{}:{by}", root.id));
        Self::live(&mut state, root)?;
        Ok(state
            .elements
            .iter()
            .filter(|e| e.parent.as_deref() == Some(root.id.as_str()) && e.locators.contains(by))
            .map(|e| e.handle.clone())
            .collect())
    }

    fn is_displayed(&self, element: &ElementHandle) -> PageResult<bool> {
        let mut state = self.state();
        state.call_history.push(format!("is_displayed:{}", element.id));
        let el = Self::live(&mut state, element)?;
        if el.hidden_checks > 0 {
            el.hidden_checks -= 1;
            return Ok(false);
        }
        Ok(el.displayed)
    }

    fn is_enabled(&self, element: &ElementHandle) -> PageResult<bool> {
        let mut state = self.state();
        state.call_history.push(format!("is_enabled:{}", element.id));
        Ok(Self::live(&mut state, element)?.enabled)
    }

    fn click(&self, element: &ElementHandle) -> PageResult<()> {
        self.interact(element, format!("click:{}", element.id))
    }

    fn clear(&self, element: &ElementHandle) -> PageResult<()> {
        self.interact(element, format!("clear:{}", element.id))?;
        let _ = self.state().values.remove(&element.id);
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> PageResult<()> {
        self.interact(element, format!("send_keys:{}:{text}", element.id))?;
        self.state()
            .values
            .entry(element.id.clone())
            .or_default()
            .push_str(text);
        Ok(())
    }
}
