//! Master builder for all hashgate operations
//!
//! Unified entry point, decomposed by operation type.

pub mod core;
pub mod hash;

// Re-export main types
pub use self::core::Hashgate;
pub use hash::{HashBuilder, HashMasterBuilder};
