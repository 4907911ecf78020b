//! # Hashgate - Uniform Hashing over GOST Providers and Software Digests
//!
//! One compute protocol for digests that need a cryptographic service provider
//! context (GOST R 34.11-94, GOST R 34.11-2012) and for self-contained ones
//! (MD5, SHA-2). Provider resources are acquired per computation and released
//! deterministically, on error paths too.
//!
//! ## Features
//!
//! - `gost` - GOST3411, GOST3411-2012-256 and GOST3411-2012-512 builders
//! - `software` - MD5, SHA-256, SHA-384 and SHA-512 builders
//!
//! Both are enabled by default.
//!
//! ## Example
//!
//! ```rust
//! use hashgate::Hashgate;
//!
//! # fn main() -> hashgate::Result<()> {
//! let digest = Hashgate::hash()
//!     .gost3411_2012_256()
//!     .with_chunk_size(4096)
//!     .compute_bytes(b"Hello world")?;
//!
//! assert_eq!(
//!     digest.to_hex(),
//!     "6960df2aa2b21015836a81446662b55e4c11c8f5289ea8ac9ed01cb172975dbf"
//! );
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

// === Core Modules ===

mod master;

pub use master::{HashBuilder, HashMasterBuilder, Hashgate};

// === Core Re-exports ===

pub use hashgate_common::{Classify, ErrorKind, Logging};

// === Provider Re-exports ===

pub use hashgate_csp as csp;
pub use hashgate_csp::{BackendError, CallCategory, EmulatedCsp, Gateway, NativeBackend, ProviderFamily};

// === Hashing Re-exports ===

pub use hashgate_hashing::{
    describe, Algorithm, BackendSession, ComputeConfig, ComputeState, Descriptor, DigestEncoding,
    HashDigest, HashError, HashMethod, HashMethodFactory, Result,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Algorithm, Classify, ComputeConfig, DigestEncoding, HashDigest, HashError, HashMethod,
        HashMethodFactory, Hashgate,
    };
}
