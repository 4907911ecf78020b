//! Algorithm registry
//!
//! Compiled-in table of the supported digests: identifier, fixed digest size
//! and, for provider-backed algorithms, the provider family and native
//! algorithm code.

use crate::{HashError, Result};
use hashgate_csp::constants::{CALG_GR3411, CALG_GR3411_2012_256, CALG_GR3411_2012_512};
use hashgate_csp::{AlgId, ProviderFamily};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// GOST R 34.11-94, CryptoPro parameters
    #[serde(rename = "GOST3411")]
    Gost3411,
    /// GOST R 34.11-2012 (Streebog), 256-bit
    #[serde(rename = "GOST3411-2012-256")]
    Gost3411_2012_256,
    /// GOST R 34.11-2012 (Streebog), 512-bit
    #[serde(rename = "GOST3411-2012-512")]
    Gost3411_2012_512,
    /// MD5
    #[serde(rename = "MD5")]
    Md5,
    /// SHA-256
    #[serde(rename = "SHA-256")]
    Sha256,
    /// SHA-384
    #[serde(rename = "SHA-384")]
    Sha384,
    /// SHA-512
    #[serde(rename = "SHA-512")]
    Sha512,
}

/// Provider binding of a backend algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendBinding {
    /// Family the context must be acquired for
    pub family: ProviderFamily,
    /// Native algorithm code passed to engine creation
    pub alg_id: AlgId,
}

/// Static description of an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// The algorithm
    pub algorithm: Algorithm,
    /// Canonical identifier
    pub identifier: &'static str,
    /// Digest size in bytes
    pub digest_size: usize,
    /// Provider binding, `None` for software digests
    pub backend: Option<BackendBinding>,
}

impl Descriptor {
    /// Check if the algorithm needs a provider context
    #[must_use]
    pub fn requires_backend(&self) -> bool {
        self.backend.is_some()
    }
}

static DESCRIPTORS: [Descriptor; 7] = [
    Descriptor {
        algorithm: Algorithm::Gost3411,
        identifier: "GOST3411",
        digest_size: 32,
        backend: Some(BackendBinding {
            family: ProviderFamily::Gost2012_512,
            alg_id: CALG_GR3411,
        }),
    },
    Descriptor {
        algorithm: Algorithm::Gost3411_2012_256,
        identifier: "GOST3411-2012-256",
        digest_size: 32,
        backend: Some(BackendBinding {
            family: ProviderFamily::Gost2012_512,
            alg_id: CALG_GR3411_2012_256,
        }),
    },
    Descriptor {
        algorithm: Algorithm::Gost3411_2012_512,
        identifier: "GOST3411-2012-512",
        digest_size: 64,
        backend: Some(BackendBinding {
            family: ProviderFamily::Gost2012_512,
            alg_id: CALG_GR3411_2012_512,
        }),
    },
    Descriptor {
        algorithm: Algorithm::Md5,
        identifier: "MD5",
        digest_size: 16,
        backend: None,
    },
    Descriptor {
        algorithm: Algorithm::Sha256,
        identifier: "SHA-256",
        digest_size: 32,
        backend: None,
    },
    Descriptor {
        algorithm: Algorithm::Sha384,
        identifier: "SHA-384",
        digest_size: 48,
        backend: None,
    },
    Descriptor {
        algorithm: Algorithm::Sha512,
        identifier: "SHA-512",
        digest_size: 64,
        backend: None,
    },
];

impl Algorithm {
    /// Every supported algorithm
    pub const ALL: [Self; 7] = [
        Self::Gost3411,
        Self::Gost3411_2012_256,
        Self::Gost3411_2012_512,
        Self::Md5,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Static descriptor of the algorithm
    #[must_use]
    pub fn descriptor(self) -> &'static Descriptor {
        let index = match self {
            Self::Gost3411 => 0,
            Self::Gost3411_2012_256 => 1,
            Self::Gost3411_2012_512 => 2,
            Self::Md5 => 3,
            Self::Sha256 => 4,
            Self::Sha384 => 5,
            Self::Sha512 => 6,
        };
        &DESCRIPTORS[index]
    }

    /// Canonical identifier
    #[must_use]
    pub fn identifier(self) -> &'static str {
        self.descriptor().identifier
    }

    /// Digest size in bytes
    #[must_use]
    pub fn digest_size(self) -> usize {
        self.descriptor().digest_size
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Algorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let algorithm = match normalized.as_str() {
            "GOST3411" | "GOST341194" => Self::Gost3411,
            "GOST34112012256" | "STREEBOG256" => Self::Gost3411_2012_256,
            "GOST34112012512" | "STREEBOG512" => Self::Gost3411_2012_512,
            "MD5" => Self::Md5,
            "SHA256" => Self::Sha256,
            "SHA384" => Self::Sha384,
            "SHA512" => Self::Sha512,
            _ => return Err(HashError::UnknownAlgorithm(s.to_string())),
        };
        Ok(algorithm)
    }
}

/// Look up the descriptor for an identifier
///
/// # Errors
///
/// Returns [`HashError::UnknownAlgorithm`] for unrecognized identifiers.
pub fn describe(identifier: &str) -> Result<&'static Descriptor> {
    identifier.parse::<Algorithm>().map(Algorithm::descriptor)
}
