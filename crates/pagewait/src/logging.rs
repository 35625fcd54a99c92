//! Log output for page actions and waits.
//!
//! The library only emits `tracing` events. Test binaries that want to see
//! them call [`init_tracing`] once; `RUST_LOG` takes precedence over the
//! filter passed in.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "pagewait=info";

/// Install a fmt subscriber writing to the test-captured stdout.
///
/// Returns `false` if a global subscriber was already installed, which makes
/// it safe to call from every test.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_test_writer()
        .try_init()
        .is_ok()
}
