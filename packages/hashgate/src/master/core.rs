//! Core Master Builder
//!
//! Main entry point for all hashgate operations

use super::HashMasterBuilder;
use hashgate_common::Logging;
use hashgate_hashing::HashMethodFactory;

/// Master builder providing unified entry point for all hashgate operations
pub struct Hashgate;

impl Hashgate {
    /// Entry point for hashing operations
    /// Example: `Hashgate::hash().gost3411_2012_256().compute_bytes(data)`
    #[must_use]
    pub fn hash() -> HashMasterBuilder {
        HashMasterBuilder
    }

    /// Factory over a fresh emulated provider, for callers managing methods
    /// and sessions themselves
    #[must_use]
    pub fn factory() -> HashMethodFactory {
        HashMethodFactory::emulated()
    }

    /// Install the `env_logger` backend once (see [`Logging::init`])
    pub fn init_logging() {
        Logging::init();
    }
}
