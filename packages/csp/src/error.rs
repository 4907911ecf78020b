//! Structured errors for native provider calls

use crate::status;
use hashgate_common::{Classify, ErrorKind};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Operation category a native status code is reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallCategory {
    /// Acquiring a provider context
    ContextAcquisition,
    /// Creating a hash object
    EngineCreation,
    /// Feeding data into a hash object
    DataAccumulation,
    /// Reading a hash parameter (including the digest)
    ParameterRetrieval,
    /// Destroying a hash object
    EngineRelease,
    /// Releasing a provider context
    ContextRelease,
}

impl CallCategory {
    /// Human readable category name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContextAcquisition => "context acquisition",
            Self::EngineCreation => "hash engine creation",
            Self::DataAccumulation => "data accumulation",
            Self::ParameterRetrieval => "parameter retrieval",
            Self::EngineRelease => "hash engine release",
            Self::ContextRelease => "context release",
        }
    }

    /// Check if the category belongs to the release phase
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, Self::EngineRelease | Self::ContextRelease)
    }

    /// Severity of a failure in this category
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::ContextAcquisition | Self::EngineCreation => ErrorKind::Recoverable,
            Self::DataAccumulation | Self::ParameterRetrieval => ErrorKind::Terminal,
            Self::EngineRelease | Self::ContextRelease => ErrorKind::Fatal,
        }
    }
}

impl fmt::Display for CallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A native call failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} failed (status {status:#010x}): {message}")]
pub struct BackendError {
    category: CallCategory,
    status: u32,
    message: Cow<'static, str>,
}

impl BackendError {
    /// Create an error for `status` reported in `category`
    ///
    /// The message is looked up in the category's code table.
    #[must_use]
    pub fn new(category: CallCategory, status: u32) -> Self {
        Self {
            category,
            status,
            message: status::describe(category, status),
        }
    }

    /// Operation category that failed
    #[must_use]
    pub fn category(&self) -> CallCategory {
        self.category
    }

    /// Native status code
    #[must_use]
    pub fn status(&self) -> u32 {
        self.status
    }

    /// Explanation of the status code
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Classify for BackendError {
    fn kind(&self) -> ErrorKind {
        self.category.kind()
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, BackendError>;
