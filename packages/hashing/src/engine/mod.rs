//! Hash engines
//!
//! A [`HashEngine`] is one in-progress digest computation. Provider-backed
//! algorithms run in a [`BackendEngine`]; the rest run in a [`SoftwareEngine`].
//! The streaming code only sees the trait.

mod backend;
mod software;

pub use backend::{BackendEngine, SharedContext};
pub use software::SoftwareEngine;

use crate::registry::Algorithm;
use crate::Result;

/// One in-progress digest computation
pub trait HashEngine: Send {
    /// Algorithm being computed
    fn algorithm(&self) -> Algorithm;

    /// Feed the next chunk of input
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the data; the computation cannot
    /// continue afterwards.
    fn accumulate(&mut self, chunk: &[u8]) -> Result<()>;

    /// Finish the computation and return the digest
    ///
    /// # Errors
    ///
    /// Returns an error if the digest cannot be produced or was already taken.
    fn finalize(&mut self) -> Result<Vec<u8>>;

    /// Free every resource held by the engine
    ///
    /// Idempotent. Engines without external resources do nothing.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if a provider resource could not be released.
    fn release(&mut self) -> Result<()>;
}
