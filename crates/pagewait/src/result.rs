//! Result and error types for pagewait.

use thiserror::Error;

/// Result type for pagewait operations
pub type PageResult<T> = Result<T, PageError>;

/// Errors that can occur while locating, waiting on, or acting on elements
#[derive(Debug, Error)]
pub enum PageError {
    /// No element matched the locator
    #[error("No element found for {locator}")]
    NoSuchElement {
        /// Locator that failed to match
        locator: String,
    },

    /// Element handle no longer refers to a live DOM node
    #[error("Stale element reference: {id}")]
    StaleElement {
        /// Handle id
        id: String,
    },

    /// Element exists but cannot receive the action
    #[error("Element {id} is not interactable: {message}")]
    ElementNotInteractable {
        /// Handle id
        id: String,
        /// Error message
        message: String,
    },

    /// Explicit wait gave up
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition
        waited_for: String,
    },

    /// A tagged page field held no value under the strict field policy
    #[error("Field `{field}` could not be read")]
    FieldUnavailable {
        /// Field name
        field: String,
    },

    /// Any other driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageError {
    /// Create a driver error from any displayable message
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether an explicit wait should keep polling after this error.
    ///
    /// Missing and stale elements are expected while a page is still rendering.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. } | Self::StaleElement { .. })
    }
}
