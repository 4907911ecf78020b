//! In-process digests

use super::HashEngine;
use crate::registry::Algorithm;
use crate::{HashError, Result};
use digest::Digest;
use md5::Md5;
use sha2::{Sha256, Sha384, Sha512};

/// Internal hasher state for the software algorithms
enum HasherState {
    Md5(Md5),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

/// Hash engine computing a digest without a provider
pub struct SoftwareEngine {
    algorithm: Algorithm,
    hasher_state: Option<HasherState>,
}

impl SoftwareEngine {
    /// Create an engine for a software algorithm
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameters`] for provider-backed algorithms.
    pub fn new(algorithm: Algorithm) -> Result<Self> {
        let hasher_state = match algorithm {
            Algorithm::Md5 => HasherState::Md5(Md5::new()),
            Algorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            Algorithm::Sha384 => HasherState::Sha384(Sha384::new()),
            Algorithm::Sha512 => HasherState::Sha512(Sha512::new()),
            Algorithm::Gost3411 | Algorithm::Gost3411_2012_256 | Algorithm::Gost3411_2012_512 => {
                return Err(HashError::invalid_parameters(format!(
                    "{algorithm} needs a provider context"
                )));
            }
        };

        Ok(Self {
            algorithm,
            hasher_state: Some(hasher_state),
        })
    }
}

impl HashEngine for SoftwareEngine {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn accumulate(&mut self, chunk: &[u8]) -> Result<()> {
        match self.hasher_state.as_mut() {
            Some(HasherState::Md5(hasher)) => hasher.update(chunk),
            Some(HasherState::Sha256(hasher)) => hasher.update(chunk),
            Some(HasherState::Sha384(hasher)) => hasher.update(chunk),
            Some(HasherState::Sha512(hasher)) => hasher.update(chunk),
            None => return Err(HashError::AlreadyFinalized),
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        let digest = match self.hasher_state.take() {
            Some(HasherState::Md5(hasher)) => hasher.finalize().to_vec(),
            Some(HasherState::Sha256(hasher)) => hasher.finalize().to_vec(),
            Some(HasherState::Sha384(hasher)) => hasher.finalize().to_vec(),
            Some(HasherState::Sha512(hasher)) => hasher.finalize().to_vec(),
            None => return Err(HashError::AlreadyFinalized),
        };
        Ok(digest)
    }

    fn release(&mut self) -> Result<()> {
        self.hasher_state = None;
        Ok(())
    }
}
