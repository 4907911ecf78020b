//! Severity classification shared by all error types

use thiserror::Error;

/// How an error affects the resources and computation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// Nothing was acquired or everything was cleaned up; the caller may retry
    #[error("recoverable")]
    Recoverable,

    /// The current computation cannot continue, but its resources must still be released
    #[error("terminal")]
    Terminal,

    /// Releasing a backend resource failed; derived handles must not be used again
    #[error("fatal")]
    Fatal,
}

impl ErrorKind {
    /// Check if the caller may retry the failed operation
    #[must_use]
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Check if the error leaves the backend in an untrustworthy state
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Pick the more severe of two classifications
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Recoverable => 0,
            Self::Terminal => 1,
            Self::Fatal => 2,
        }
    }
}

/// Errors that know their own severity
pub trait Classify {
    /// Severity of this error
    fn kind(&self) -> ErrorKind;

    /// Shorthand for `self.kind().is_fatal()`
    fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_prefers_the_more_severe_kind() {
        assert_eq!(ErrorKind::Recoverable.max(ErrorKind::Terminal), ErrorKind::Terminal);
        assert_eq!(ErrorKind::Fatal.max(ErrorKind::Terminal), ErrorKind::Fatal);
        assert_eq!(ErrorKind::Terminal.max(ErrorKind::Terminal), ErrorKind::Terminal);
    }

    #[test]
    fn only_fatal_is_fatal() {
        assert!(ErrorKind::Fatal.is_fatal());
        assert!(!ErrorKind::Terminal.is_fatal());
        assert!(ErrorKind::Recoverable.is_recoverable());
        assert!(!ErrorKind::Terminal.is_recoverable());
    }
}
