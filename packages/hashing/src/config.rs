//! Compute configuration

use crate::{HashError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding the read chunk size
pub const CHUNK_SIZE_ENV: &str = "HASHGATE_CHUNK_SIZE";

/// Settings for streaming computation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeConfig {
    /// Bytes read from the input per chunk. Any positive value produces the
    /// same digest; it only bounds memory.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    256
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

impl ComputeConfig {
    /// Small reads, matching the provider's native buffer
    #[must_use]
    pub fn small() -> Self {
        Self::default()
    }

    /// 64 KiB reads for large files
    #[must_use]
    pub fn large() -> Self {
        Self {
            chunk_size: 64 * 1024,
        }
    }

    /// Set the chunk size
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check the settings
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameters`] if the chunk size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(HashError::invalid_parameters("chunk size must be positive"));
        }
        Ok(())
    }

    /// Defaults, with the chunk size taken from `HASHGATE_CHUNK_SIZE` if set
    ///
    /// Unparsable or zero values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(CHUNK_SIZE_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        match value.trim().parse::<usize>() {
            Ok(chunk_size) if chunk_size > 0 => Self { chunk_size },
            _ => {
                warn!(
                    variable = CHUNK_SIZE_ENV,
                    value, "ignoring invalid chunk size"
                );
                Self::default()
            }
        }
    }
}
