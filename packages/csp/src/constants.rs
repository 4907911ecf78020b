//! Provider types, algorithm identifiers, parameters and status codes

use std::fmt;

/// Native algorithm identifier (`ALG_ID`)
pub type AlgId = u32;

/// GOST R 34.11-94 with CryptoPro parameters
pub const CALG_GR3411: AlgId = 0x801E;
/// GOST R 34.11-2012, 256-bit output
pub const CALG_GR3411_2012_256: AlgId = 0x8021;
/// GOST R 34.11-2012, 512-bit output
pub const CALG_GR3411_2012_512: AlgId = 0x8022;

/// Hash parameter: algorithm identifier (`DWORD`)
pub const HP_ALGID: u32 = 0x0001;
/// Hash parameter: hash value
pub const HP_HASHVAL: u32 = 0x0002;
/// Hash parameter: hash size in bytes (`DWORD`)
pub const HP_HASHSIZE: u32 = 0x0004;

/// Acquire a context without access to private keys
pub const CRYPT_VERIFYCONTEXT: u32 = 0xF000_0000;

/// Provider family a context is acquired for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// `PROV_GOST_2001_DH`
    Gost2001Dh,
    /// `PROV_GOST_2012_256`
    Gost2012_256,
    /// `PROV_GOST_2012_512`
    Gost2012_512,
}

impl ProviderFamily {
    /// All known families
    pub const ALL: [Self; 3] = [Self::Gost2001Dh, Self::Gost2012_256, Self::Gost2012_512];

    /// Native provider type code
    #[must_use]
    pub const fn provider_type(self) -> u32 {
        match self {
            Self::Gost2001Dh => 75,
            Self::Gost2012_256 => 80,
            Self::Gost2012_512 => 81,
        }
    }

    /// Family for a native provider type code
    #[must_use]
    pub fn from_provider_type(provider_type: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.provider_type() == provider_type)
    }

    /// Native name of the provider type
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gost2001Dh => "PROV_GOST_2001_DH",
            Self::Gost2012_256 => "PROV_GOST_2012_256",
            Self::Gost2012_512 => "PROV_GOST_2012_512",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Native status codes reported through `last_error`
#[allow(missing_docs)]
pub mod codes {
    pub const ERROR_FILE_NOT_FOUND: u32 = 0x0000_0002;
    pub const ERROR_INVALID_HANDLE: u32 = 0x0000_0006;
    pub const ERROR_NOT_ENOUGH_MEMORY: u32 = 0x0000_0008;
    pub const ERROR_INVALID_PARAMETER: u32 = 0x0000_0057;
    pub const ERROR_BUSY: u32 = 0x0000_00AA;
    pub const ERROR_MORE_DATA: u32 = 0x0000_00EA;

    pub const NTE_BAD_UID: u32 = 0x8009_0001;
    pub const NTE_BAD_HASH: u32 = 0x8009_0002;
    pub const NTE_BAD_KEY: u32 = 0x8009_0003;
    pub const NTE_BAD_LEN: u32 = 0x8009_0004;
    pub const NTE_BAD_SIGNATURE: u32 = 0x8009_0006;
    pub const NTE_BAD_ALGID: u32 = 0x8009_0008;
    pub const NTE_BAD_FLAGS: u32 = 0x8009_0009;
    pub const NTE_BAD_TYPE: u32 = 0x8009_000A;
    pub const NTE_BAD_KEY_STATE: u32 = 0x8009_000B;
    pub const NTE_BAD_HASH_STATE: u32 = 0x8009_000C;
    pub const NTE_NO_MEMORY: u32 = 0x8009_000E;
    pub const NTE_EXISTS: u32 = 0x8009_000F;
    pub const NTE_BAD_PROV_TYPE: u32 = 0x8009_0014;
    pub const NTE_BAD_KEYSET: u32 = 0x8009_0016;
    pub const NTE_PROV_TYPE_NOT_DEF: u32 = 0x8009_0017;
    pub const NTE_PROV_TYPE_ENTRY_BAD: u32 = 0x8009_0018;
    pub const NTE_KEYSET_NOT_DEF: u32 = 0x8009_0019;
    pub const NTE_KEYSET_ENTRY_BAD: u32 = 0x8009_001A;
    pub const NTE_PROV_TYPE_NO_MATCH: u32 = 0x8009_001B;
    pub const NTE_SIGNATURE_FILE_BAD: u32 = 0x8009_001C;
    pub const NTE_PROVIDER_DLL_FAIL: u32 = 0x8009_001D;
    pub const NTE_PROV_DLL_NOT_FOUND: u32 = 0x8009_001E;
    pub const NTE_BAD_KEYSET_PARAM: u32 = 0x8009_001F;
    pub const NTE_FAIL: u32 = 0x8009_0020;
}
