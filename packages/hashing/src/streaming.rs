//! Streaming hash computation
//!
//! Drives a [`HashEngine`] through `Idle → Accumulating → Finalized`. Input is
//! either pushed chunk by chunk ([`DigestStream::update`]) or pulled from a
//! reader in fixed-size chunks ([`DigestStream::consume`]). A failed
//! accumulation poisons the stream: it can still be released, never reused.

use crate::engine::HashEngine;
use crate::hash_result::HashDigest;
use crate::registry::Algorithm;
use crate::{HashError, Result};
use std::io::{ErrorKind as IoErrorKind, Read};

/// Lifecycle state of a computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeState {
    /// No input seen yet
    Idle,
    /// At least one chunk accumulated
    Accumulating,
    /// Digest produced
    Finalized,
    /// An accumulation or read failed; only release is allowed
    Poisoned,
}

/// Incremental digest computation over a hash engine
pub struct DigestStream {
    engine: Box<dyn HashEngine>,
    state: ComputeState,
    total_bytes: u64,
}

impl DigestStream {
    /// Wrap a fresh engine
    #[must_use]
    pub fn new(engine: Box<dyn HashEngine>) -> Self {
        Self {
            engine,
            state: ComputeState::Idle,
            total_bytes: 0,
        }
    }

    /// Algorithm being computed
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.engine.algorithm()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ComputeState {
        self.state
    }

    /// Get the total number of bytes processed so far
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            ComputeState::Idle | ComputeState::Accumulating => Ok(()),
            ComputeState::Finalized => Err(HashError::AlreadyFinalized),
            ComputeState::Poisoned => Err(HashError::EngineUnusable),
        }
    }

    /// Accumulate one chunk
    ///
    /// Empty chunks are accepted and do not change the state.
    ///
    /// # Errors
    ///
    /// Fails if the stream is finalized or poisoned, or the engine rejects the
    /// chunk (which poisons the stream).
    pub fn update(&mut self, chunk: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if chunk.is_empty() {
            return Ok(());
        }

        if let Err(error) = self.engine.accumulate(chunk) {
            self.state = ComputeState::Poisoned;
            return Err(error);
        }
        self.total_bytes += chunk.len() as u64;
        self.state = ComputeState::Accumulating;
        Ok(())
    }

    /// Finalize and return the digest
    ///
    /// # Errors
    ///
    /// Fails if the stream was already finalized or is poisoned, or the engine
    /// cannot produce the digest (which poisons the stream).
    pub fn finish(&mut self) -> Result<HashDigest> {
        self.ensure_open()?;

        let expected = self.algorithm().digest_size();
        let bytes = match self.engine.finalize() {
            Ok(bytes) => bytes,
            Err(error) => {
                self.state = ComputeState::Poisoned;
                return Err(error);
            }
        };
        if bytes.len() != expected {
            self.state = ComputeState::Poisoned;
            return Err(HashError::DigestSize {
                expected,
                actual: bytes.len(),
            });
        }

        self.state = ComputeState::Finalized;
        tracing::debug!(
            algorithm = %self.algorithm(),
            total_bytes = self.total_bytes,
            "digest computed"
        );
        Ok(HashDigest::new(self.algorithm(), bytes))
    }

    /// Read `reader` to its end in chunks of `chunk_size` bytes, then finalize
    ///
    /// Interrupted reads are retried.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameters`] for a zero chunk size,
    /// [`HashError::Io`] if reading fails and any accumulation or finalization
    /// error. Read and accumulation failures poison the stream.
    pub fn consume<R: Read + ?Sized>(&mut self, reader: &mut R, chunk_size: usize) -> Result<HashDigest> {
        if chunk_size == 0 {
            return Err(HashError::invalid_parameters("chunk size must be positive"));
        }
        self.ensure_open()?;

        let mut buffer = vec![0u8; chunk_size];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == IoErrorKind::Interrupted => continue,
                Err(error) => {
                    self.state = ComputeState::Poisoned;
                    return Err(error.into());
                }
            };
            self.update(&buffer[..read])?;
            tracing::trace!(algorithm = %self.algorithm(), len = read, "chunk hashed");
        }

        self.finish()
    }

    /// Release the engine's resources
    ///
    /// # Errors
    ///
    /// Returns a fatal error if provider resources could not be released.
    pub fn release(&mut self) -> Result<()> {
        self.engine.release()
    }
}
