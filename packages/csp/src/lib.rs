//! Handle gateway over a CryptoPro-style cryptographic service provider
//!
//! The provider itself is reached through the [`NativeBackend`] trait, which
//! mirrors the CryptoAPI call shapes (`CryptAcquireContext`, `CryptCreateHash`,
//! `CryptHashData`, `CryptGetHashParam`, `CryptDestroyHash`,
//! `CryptReleaseContext`). [`Gateway`] wraps those calls, turns failure
//! sentinels into [`BackendError`]s and enforces handle idempotence.
//!
//! [`EmulatedCsp`] is an in-process provider computing the GOST digests in
//! software; it is the default backend and the one used by the tests.

#![forbid(unsafe_code)]

pub mod backend;
pub mod constants;
pub mod emulated;
pub mod error;
pub mod gateway;
pub mod status;

pub use backend::{NativeBackend, NativeBool, RawHandle, NULL_HANDLE};
pub use constants::{AlgId, ProviderFamily};
pub use emulated::{EmulatedCsp, JournalEntry, NativeCall};
pub use error::{BackendError, CallCategory, Result};
pub use gateway::{ContextHandle, EngineHandle, Gateway};
