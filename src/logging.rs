//! Logging setup for binaries and tests.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the caller's job. This helper installs a stderr subscriber filtered through
//! `RUST_LOG`, and is what the integration tests and downstream binaries use.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once; subsequent calls are no-ops.
///
/// Defaults to `info` when `RUST_LOG` is unset. Safe to call from every test.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
