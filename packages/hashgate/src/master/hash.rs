//! Hash Master Builder
//!
//! Master builder for hashing operations (GOST, MD5, SHA-2)

use hashgate_csp::{Gateway, NativeBackend};
use hashgate_hashing::{
    Algorithm, ComputeConfig, HashDigest, HashMethod, HashMethodFactory, Result,
};
use std::io::Read;
use std::sync::Arc;

/// Master builder for hashing operations
pub struct HashMasterBuilder;

impl HashMasterBuilder {
    /// Use GOST R 34.11-94 hashing
    #[cfg(feature = "gost")]
    #[must_use]
    pub fn gost3411(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Gost3411)
    }

    /// Use GOST R 34.11-2012 256-bit hashing
    #[cfg(feature = "gost")]
    #[must_use]
    pub fn gost3411_2012_256(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Gost3411_2012_256)
    }

    /// Use GOST R 34.11-2012 512-bit hashing
    #[cfg(feature = "gost")]
    #[must_use]
    pub fn gost3411_2012_512(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Gost3411_2012_512)
    }

    /// Use MD5 hashing
    #[cfg(feature = "software")]
    #[must_use]
    pub fn md5(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Md5)
    }

    /// Use SHA-256 hashing
    #[cfg(feature = "software")]
    #[must_use]
    pub fn sha256(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Sha256)
    }

    /// Use SHA-384 hashing
    #[cfg(feature = "software")]
    #[must_use]
    pub fn sha384(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Sha384)
    }

    /// Use SHA-512 hashing
    #[cfg(feature = "software")]
    #[must_use]
    pub fn sha512(self) -> HashBuilder {
        HashBuilder::new(Algorithm::Sha512)
    }

    /// Use the algorithm named by `identifier`, e.g. `"GOST3411-2012-256"`
    ///
    /// # Errors
    ///
    /// Returns `HashError::UnknownAlgorithm` for unrecognized identifiers.
    pub fn named(self, identifier: &str) -> Result<HashBuilder> {
        Ok(HashBuilder::new(identifier.parse()?))
    }
}

/// Builder for one digest computation
///
/// Runs against a fresh emulated provider unless a backend is supplied.
pub struct HashBuilder {
    algorithm: Algorithm,
    gateway: Option<Gateway>,
    config: ComputeConfig,
}

impl HashBuilder {
    /// Create a builder for `algorithm`
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            gateway: None,
            config: ComputeConfig::default(),
        }
    }

    /// Run provider-backed algorithms on `backend`
    #[must_use]
    pub fn with_backend(self, backend: Arc<dyn NativeBackend>) -> Self {
        self.with_gateway(Gateway::new(backend))
    }

    /// Run provider-backed algorithms through `gateway`
    #[must_use]
    pub fn with_gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Read input in chunks of `chunk_size` bytes
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Replace the compute configuration
    #[must_use]
    pub fn with_config(mut self, config: ComputeConfig) -> Self {
        self.config = config;
        self
    }

    /// Algorithm the builder computes
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn factory(self) -> Result<(Algorithm, HashMethodFactory)> {
        let gateway = self.gateway.unwrap_or_else(Gateway::emulated);
        let factory = HashMethodFactory::new(gateway).with_config(self.config)?;
        Ok((self.algorithm, factory))
    }

    /// Digest everything `reader` yields; all resources are released on return
    ///
    /// # Errors
    ///
    /// Returns the first error of configuration, creation, computation or
    /// release.
    pub fn compute<R: Read>(self, mut reader: R) -> Result<HashDigest> {
        let (algorithm, factory) = self.factory()?;
        factory.digest_reader(algorithm, &mut reader)
    }

    /// Digest `data`; all resources are released on return
    ///
    /// # Errors
    ///
    /// Returns the first error of configuration, creation, computation or
    /// release.
    pub fn compute_bytes<D: AsRef<[u8]>>(self, data: D) -> Result<HashDigest> {
        let (algorithm, factory) = self.factory()?;
        factory.digest_bytes(algorithm, data.as_ref())
    }

    /// Create a hash method the caller drives and releases
    ///
    /// # Errors
    ///
    /// Returns the configuration error or the provider's acquisition or
    /// creation error.
    pub fn open(self) -> Result<HashMethod> {
        let (algorithm, factory) = self.factory()?;
        factory.create(algorithm)
    }
}
