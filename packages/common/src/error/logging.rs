//! Logging bootstrap
//!
//! The hashgate crates emit `tracing` events. `tracing` is built with its `log`
//! feature, so without a `tracing` subscriber those events are forwarded to the
//! `log` facade and printed by the `env_logger` installed here.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// `env_logger` based logging setup
pub struct Logging;

impl Logging {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels are taken from the `RUST_LOG` environment variable:
    /// - `RUST_LOG=debug` - handle acquisition and release
    /// - `RUST_LOG=trace` - every accumulated chunk
    /// - `RUST_LOG=hashgate_csp=debug,hashgate_hashing=info` - per crate levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            log::info!("hashgate logging initialized");
        });
    }

    /// Initialize logging for tests
    ///
    /// Safe to call from every test; only the first call installs the logger.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Report a release failure that could not be returned to a caller
    ///
    /// Used from `Drop` implementations, where the error has nowhere else to go.
    pub fn log_release_failure(resource: &str, error: &dyn std::error::Error) {
        tracing::error!(resource, %error, "releasing backend resource failed");
    }
}
