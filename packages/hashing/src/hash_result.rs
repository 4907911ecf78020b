//! Finished digests and their text renderings

use crate::registry::Algorithm;
use crate::{HashError, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text rendering of digest bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    /// Lowercase hexadecimal
    #[default]
    Hex,
    /// Standard base64 with padding
    Base64,
    /// URL-safe base64 without padding
    Base64Url,
}

impl DigestEncoding {
    /// Render `bytes`
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(bytes),
            Self::Base64 => general_purpose::STANDARD.encode(bytes),
            Self::Base64Url => base64_url::encode(bytes),
        }
    }
}

impl FromStr for DigestEncoding {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" | "base64-url" => Ok(Self::Base64Url),
            other => Err(HashError::invalid_parameters(format!(
                "unknown digest encoding {other:?}"
            ))),
        }
    }
}

/// Finished digest together with the algorithm that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashDigest {
    algorithm: Algorithm,
    bytes: Vec<u8>,
}

impl HashDigest {
    pub(crate) fn new(algorithm: Algorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Algorithm that produced the digest
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Render the digest as text
    #[must_use]
    pub fn encode(&self, encoding: DigestEncoding) -> String {
        encoding.encode(&self.bytes)
    }

    /// Shorthand for `encode(DigestEncoding::Hex)`
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.encode(DigestEncoding::Hex)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<HashDigest> for Vec<u8> {
    fn from(digest: HashDigest) -> Self {
        digest.bytes
    }
}

impl AsRef<[u8]> for HashDigest {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
