//! Uniform digests over provider-backed GOST algorithms and software hashes
//!
//! ```no_run
//! use hashgate_hashing::{Algorithm, HashMethodFactory};
//!
//! # fn main() -> hashgate_hashing::Result<()> {
//! let factory = HashMethodFactory::default();
//! let mut method = factory.create(Algorithm::Gost3411_2012_256)?;
//! let digest = method.compute(&mut std::io::stdin())?;
//! method.release()?;
//! println!("{digest}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod hash_result;
pub mod registry;
pub mod streaming;

// Re-export error types
pub use error::{HashError, Result};

pub use config::ComputeConfig;
pub use factory::{BackendSession, HashMethod, HashMethodFactory};
pub use hash_result::{DigestEncoding, HashDigest};
pub use registry::{describe, Algorithm, BackendBinding, Descriptor};
pub use streaming::{ComputeState, DigestStream};

pub use hashgate_common::{Classify, ErrorKind};
pub use hashgate_csp::{BackendError, CallCategory, Gateway, ProviderFamily};
