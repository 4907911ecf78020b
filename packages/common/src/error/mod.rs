//! Error classification and logging
//!
//! Every hashgate error type reports how far the damage reaches:
//! - recoverable errors leave nothing acquired and may be retried
//! - terminal errors end one computation but its resources can still be released
//! - fatal errors mean the backend state can no longer be trusted

pub mod logging;
pub mod types;

pub use logging::Logging;
pub use types::{Classify, ErrorKind};
