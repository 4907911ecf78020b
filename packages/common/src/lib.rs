//! Common infrastructure shared by the hashgate crates
//!
//! This crate provides:
//! - Error severity classification (recoverable, terminal, fatal)
//! - `env_logger` bootstrap for the `tracing`/`log` events emitted by the other crates

pub mod error;

pub use error::{Classify, ErrorKind, Logging};
