//! Error handling for hash methods and streaming computation

use hashgate_common::{Classify, ErrorKind};
use hashgate_csp::BackendError;
use thiserror::Error;

/// Hashing-specific errors
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Reading input failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hash computation was already finalized")]
    AlreadyFinalized,

    #[error("Hash engine is unusable after a failed computation")]
    EngineUnusable,

    #[error("Hash method was released")]
    Released,

    #[error("Invalid digest size: expected {expected}, got {actual}")]
    DigestSize { expected: usize, actual: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HashError {
    /// Create an internal error
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an `invalid_parameters` error
    #[must_use]
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Underlying backend error, if any
    #[must_use]
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(error) => Some(error),
            _ => None,
        }
    }
}

impl Classify for HashError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Backend(error) => error.kind(),
            Self::UnknownAlgorithm(_) | Self::InvalidParameters(_) | Self::Released => {
                ErrorKind::Recoverable
            }
            Self::Io(_)
            | Self::AlreadyFinalized
            | Self::EngineUnusable
            | Self::DigestSize { .. }
            | Self::Internal(_) => ErrorKind::Terminal,
        }
    }
}

/// Result type for hashing operations
pub type Result<T> = std::result::Result<T, HashError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hashgate_csp::constants::codes;
    use hashgate_csp::CallCategory;

    #[test]
    fn backend_errors_keep_their_severity() {
        let error = HashError::from(BackendError::new(CallCategory::EngineRelease, codes::ERROR_BUSY));
        assert!(error.is_fatal());
        assert_eq!(error.backend().map(BackendError::status), Some(codes::ERROR_BUSY));

        let error = HashError::from(BackendError::new(
            CallCategory::ContextAcquisition,
            codes::NTE_KEYSET_NOT_DEF,
        ));
        assert!(error.kind().is_recoverable());
    }

    #[test]
    fn read_errors_are_terminal() {
        let error = HashError::from(std::io::Error::other("disk gone"));
        assert_eq!(error.kind(), ErrorKind::Terminal);
        assert!(error.to_string().contains("disk gone"));
    }
}
