//! Hash method factory
//!
//! Turns an algorithm into a [`HashMethod`]: a value owning whatever the
//! computation needs (a provider context and engine, or an in-process hasher)
//! with `compute` and `release` operations. Software algorithms acquire
//! nothing, so their release is a no-op.

use crate::config::ComputeConfig;
use crate::engine::{BackendEngine, HashEngine, SharedContext, SoftwareEngine};
use crate::hash_result::HashDigest;
use crate::registry::{Algorithm, Descriptor};
use crate::streaming::{ComputeState, DigestStream};
use crate::{HashError, Result};
use hashgate_common::{Classify, Logging};
use hashgate_csp::{Gateway, ProviderFamily};
use std::io::Read;
use std::sync::Arc;

/// Creates hash methods over one provider gateway
#[derive(Clone, Debug)]
pub struct HashMethodFactory {
    gateway: Gateway,
    config: ComputeConfig,
}

impl Default for HashMethodFactory {
    fn default() -> Self {
        Self::emulated()
    }
}

impl HashMethodFactory {
    /// Create a factory over `gateway` with the default configuration
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            config: ComputeConfig::default(),
        }
    }

    /// Create a factory over a fresh emulated provider
    #[must_use]
    pub fn emulated() -> Self {
        Self::new(Gateway::emulated())
    }

    /// Replace the compute configuration
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameters`] if the configuration is invalid.
    pub fn with_config(mut self, config: ComputeConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Compute configuration in use
    #[must_use]
    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// Gateway the factory acquires provider resources through
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Create a hash method for `algorithm`
    ///
    /// Provider-backed algorithms acquire a context and create an engine in it;
    /// if engine creation fails the context is released again.
    ///
    /// # Errors
    ///
    /// Returns the provider's acquisition or creation error.
    pub fn create(&self, algorithm: Algorithm) -> Result<HashMethod> {
        let descriptor = algorithm.descriptor();
        let engine: Box<dyn HashEngine> = if descriptor.requires_backend() {
            Box::new(BackendEngine::open(&self.gateway, descriptor)?)
        } else {
            Box::new(SoftwareEngine::new(algorithm)?)
        };

        tracing::debug!(%algorithm, "hash method created");
        Ok(HashMethod::new(descriptor, engine, self.config.chunk_size))
    }

    /// Create a hash method from an algorithm identifier
    ///
    /// # Errors
    ///
    /// Returns [`HashError::UnknownAlgorithm`] without touching the provider if
    /// the identifier is not recognized.
    pub fn create_by_name(&self, identifier: &str) -> Result<HashMethod> {
        let algorithm: Algorithm = identifier.parse()?;
        self.create(algorithm)
    }

    /// Acquire a context that can serve several hash methods of one family
    ///
    /// # Errors
    ///
    /// Returns the provider's acquisition error.
    pub fn open_session(&self, family: ProviderFamily) -> Result<BackendSession> {
        let context = SharedContext::acquire(&self.gateway, family)?;
        Ok(BackendSession {
            context: Some(context),
            chunk_size: self.config.chunk_size,
        })
    }

    /// Digest `data` in one call, releasing everything before returning
    ///
    /// # Errors
    ///
    /// Returns the first error of creation, computation or release.
    pub fn digest_bytes(&self, algorithm: Algorithm, data: &[u8]) -> Result<HashDigest> {
        self.digest_reader(algorithm, &mut &data[..])
    }

    /// Digest everything `reader` yields, releasing everything before returning
    ///
    /// # Errors
    ///
    /// Returns the creation error, or the computation or release error. When
    /// both of the latter fail, the more severe one is returned; on equal
    /// severity, the release error.
    pub fn digest_reader<R: Read + ?Sized>(&self, algorithm: Algorithm, reader: &mut R) -> Result<HashDigest> {
        let mut method = self.create(algorithm)?;
        method.compute_and_release(reader)
    }
}

/// A hash computation together with the resources it holds
///
/// Release happens exactly once: through [`HashMethod::release`] or, if the
/// caller never released, when the value is dropped. A failed release in
/// `Drop` is logged and then panics unless the thread is already unwinding.
/// A failed explicit release is reported to the caller only; the handles are
/// consumed by the attempt and never retried.
pub struct HashMethod {
    descriptor: &'static Descriptor,
    stream: DigestStream,
    chunk_size: usize,
    released: bool,
}

impl HashMethod {
    fn new(descriptor: &'static Descriptor, engine: Box<dyn HashEngine>, chunk_size: usize) -> Self {
        Self {
            descriptor,
            stream: DigestStream::new(engine),
            chunk_size,
            released: false,
        }
    }

    /// Algorithm this method computes
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.descriptor.algorithm
    }

    /// Static descriptor of the algorithm
    #[must_use]
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Lifecycle state of the computation
    #[must_use]
    pub fn state(&self) -> ComputeState {
        self.stream.state()
    }

    /// Check if the method was released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_unreleased(&self) -> Result<()> {
        if self.released {
            Err(HashError::Released)
        } else {
            Ok(())
        }
    }

    /// Digest everything `reader` yields
    ///
    /// Does not release the method.
    ///
    /// # Errors
    ///
    /// Fails on read, accumulation or finalization errors, if the method was
    /// already used to produce a digest, or if it was released.
    pub fn compute<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<HashDigest> {
        self.ensure_unreleased()?;
        self.stream.consume(reader, self.chunk_size)
    }

    /// Accumulate one chunk pushed by the caller
    ///
    /// # Errors
    ///
    /// Fails if the engine rejects the chunk or the method is finalized or
    /// released.
    pub fn update(&mut self, chunk: &[u8]) -> Result<()> {
        self.ensure_unreleased()?;
        self.stream.update(chunk)
    }

    /// Finalize the chunks pushed with [`HashMethod::update`]
    ///
    /// # Errors
    ///
    /// Fails if the digest cannot be produced or was already produced, or the
    /// method was released.
    pub fn finish(&mut self) -> Result<HashDigest> {
        self.ensure_unreleased()?;
        self.stream.finish()
    }

    /// Release the engine, then the context
    ///
    /// Idempotent: once attempted, later calls return `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the provider refuses a release; the backend
    /// state is then no longer trustworthy.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        if let Err(error) = self.stream.release() {
            tracing::error!(algorithm = %self.algorithm(), %error, "hash method release failed");
            return Err(error);
        }
        tracing::debug!(algorithm = %self.algorithm(), "hash method released");
        Ok(())
    }

    fn compute_and_release<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<HashDigest> {
        let computed = self.compute(reader);
        match (computed, self.release()) {
            (Ok(digest), Ok(())) => Ok(digest),
            (Err(error), Ok(())) => Err(error),
            (Ok(_), Err(release_error)) => Err(release_error),
            (Err(error), Err(release_error)) => Err(more_severe(error, release_error)),
        }
    }
}

/// Pick the error to report when both computation and release failed;
/// release wins ties
fn more_severe(computed: HashError, released: HashError) -> HashError {
    if released.kind().max(computed.kind()) == released.kind() {
        released
    } else {
        computed
    }
}

impl std::fmt::Debug for HashMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashMethod")
            .field("descriptor", &self.descriptor)
            .field("chunk_size", &self.chunk_size)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for HashMethod {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            Logging::log_release_failure("hash method", &error);
            if !std::thread::panicking() {
                panic!("hash method release failed: {error}");
            }
        }
    }
}

/// A provider context serving several hash methods
///
/// Each hash method created here holds the context until it is released (or
/// dropped); the context is released by the last of the session and its
/// methods to let go.
pub struct BackendSession {
    context: Option<Arc<SharedContext>>,
    chunk_size: usize,
}

impl BackendSession {
    /// Family the session's context serves
    #[must_use]
    pub fn family(&self) -> Option<ProviderFamily> {
        self.context.as_ref().map(|context| context.family())
    }

    fn context(&self) -> Result<&Arc<SharedContext>> {
        self.context.as_ref().ok_or(HashError::Released)
    }

    /// Create a hash method in the session's context
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameters`] for software algorithms,
    /// [`HashError::Released`] after release, or the provider's creation error
    /// for algorithms the context's family does not serve.
    pub fn create(&self, algorithm: Algorithm) -> Result<HashMethod> {
        let descriptor = algorithm.descriptor();
        let engine = BackendEngine::open_in(self.context()?, descriptor)?;
        Ok(HashMethod::new(descriptor, Box::new(engine), self.chunk_size))
    }

    /// Digest everything `reader` yields with a method from this session
    ///
    /// # Errors
    ///
    /// Returns the first error of creation, computation or engine release.
    pub fn digest_reader<R: Read + ?Sized>(&self, algorithm: Algorithm, reader: &mut R) -> Result<HashDigest> {
        let mut method = self.create(algorithm)?;
        method.compute_and_release(reader)
    }

    /// Digest `data` with a method from this session
    ///
    /// # Errors
    ///
    /// Returns the first error of creation, computation or engine release.
    pub fn digest_bytes(&self, algorithm: Algorithm, data: &[u8]) -> Result<HashDigest> {
        self.digest_reader(algorithm, &mut &data[..])
    }

    /// Give up the session's hold on the context
    ///
    /// Releases the context right away unless hash methods created from the
    /// session are still unreleased; releasing the last of them releases it
    /// then. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the provider refuses the release.
    pub fn release(&mut self) -> Result<()> {
        match self.context.take() {
            Some(context) => SharedContext::relinquish(context),
            None => Ok(()),
        }
    }
}
