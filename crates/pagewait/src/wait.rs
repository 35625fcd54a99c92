//! Explicit waits.
//!
//! A [`Waiter`] polls a fallible predicate at a fixed interval until it holds
//! or the timeout elapses. The predicate always runs at least once, so a zero
//! timeout means "check now".
//!
//! Missing and stale elements (see [`PageError::is_transient`]) are treated as
//! "not yet" while polling; any other error ends the wait immediately.

use crate::result::{PageError, PageResult};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the predicate ran
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Blocking poll-until-true helper
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `predicate` until it returns `Ok(true)`.
    ///
    /// # Errors
    ///
    /// `PageError::Timeout` when the timeout elapses, or the first
    /// non-transient error the predicate returns.
    pub fn until<F>(&self, waited_for: &str, mut predicate: F) -> PageResult<WaitResult>
    where
        F: FnMut() -> PageResult<bool>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut polls = 0_u32;

        loop {
            polls += 1;
            match predicate() {
                Ok(true) => {
                    let elapsed = start.elapsed();
                    tracing::debug!(
                        waited_for,
                        polls,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "wait satisfied"
                    );
                    return Ok(WaitResult {
                        elapsed,
                        polls,
                        waited_for: waited_for.to_string(),
                    });
                }
                Ok(false) => {}
                Err(e) if e.is_transient() => {
                    tracing::trace!(waited_for, error = %e, "ignoring transient error");
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                tracing::warn!(
                    waited_for,
                    polls,
                    timeout_ms = self.options.timeout_ms,
                    "wait timed out"
                );
                return Err(PageError::Timeout {
                    ms: self.options.timeout_ms,
                    waited_for: waited_for.to_string(),
                });
            }
            std::thread::sleep(self.options.poll_interval().min(timeout - elapsed));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
