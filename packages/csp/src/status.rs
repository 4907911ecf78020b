//! Status code tables
//!
//! Each operation category has its own table: the same code can mean different
//! things depending on the call that reported it. A code missing from the table
//! falls back to a generic message so that reporting an error never fails.

use crate::constants::codes::*;
use crate::error::CallCategory;
use std::borrow::Cow;

/// Explain `code` as reported by a call in `category`
#[must_use]
pub fn describe(category: CallCategory, code: u32) -> Cow<'static, str> {
    let known = match category {
        CallCategory::ContextAcquisition | CallCategory::ContextRelease => context_message(code),
        CallCategory::EngineCreation | CallCategory::EngineRelease => engine_message(code),
        CallCategory::DataAccumulation => accumulation_message(code),
        CallCategory::ParameterRetrieval => parameter_message(code),
    };

    match known {
        Some(text) => Cow::Borrowed(text),
        None => Cow::Owned(format!("undefined error in category {category}")),
    }
}

fn context_message(code: u32) -> Option<&'static str> {
    let text = match code {
        ERROR_BUSY => "ERROR_BUSY. Another thread or process is using this key container.",
        ERROR_FILE_NOT_FOUND => "ERROR_FILE_NOT_FOUND. The profile of the user is not loaded and cannot be found.",
        ERROR_INVALID_PARAMETER => "ERROR_INVALID_PARAMETER. One of the parameters contains a value that is not valid.",
        ERROR_NOT_ENOUGH_MEMORY => "ERROR_NOT_ENOUGH_MEMORY. The operating system ran out of memory during the operation.",
        NTE_BAD_FLAGS => "NTE_BAD_FLAGS. The flags parameter has a value that is not valid.",
        NTE_BAD_KEY_STATE => "NTE_BAD_KEY_STATE. The user password has changed since the private keys were encrypted.",
        NTE_BAD_KEYSET => "NTE_BAD_KEYSET. The key container could not be opened or access to it is denied.",
        NTE_BAD_KEYSET_PARAM => "NTE_BAD_KEYSET_PARAM. The container or provider name is not valid.",
        NTE_BAD_PROV_TYPE => "NTE_BAD_PROV_TYPE. The provider type is out of range; valid types are 1 through 999.",
        NTE_BAD_SIGNATURE => "NTE_BAD_SIGNATURE. The provider library signature could not be verified.",
        NTE_EXISTS => "NTE_EXISTS. The key container already exists.",
        NTE_KEYSET_ENTRY_BAD => "NTE_KEYSET_ENTRY_BAD. The key container was found but is corrupt.",
        NTE_KEYSET_NOT_DEF => "NTE_KEYSET_NOT_DEF. The requested provider does not exist.",
        NTE_NO_MEMORY => "NTE_NO_MEMORY. The provider ran out of memory during the operation.",
        NTE_PROV_DLL_NOT_FOUND => "NTE_PROV_DLL_NOT_FOUND. The provider library does not exist or is not on the current path.",
        NTE_PROV_TYPE_ENTRY_BAD => "NTE_PROV_TYPE_ENTRY_BAD. The registered entry for the provider type is corrupt.",
        NTE_PROV_TYPE_NO_MATCH => "NTE_PROV_TYPE_NO_MATCH. The provider type does not match the provider type found.",
        NTE_PROV_TYPE_NOT_DEF => "NTE_PROV_TYPE_NOT_DEF. No entry exists for the provider type.",
        NTE_PROVIDER_DLL_FAIL => "NTE_PROVIDER_DLL_FAIL. The provider library could not be loaded or failed to initialize.",
        NTE_SIGNATURE_FILE_BAD => "NTE_SIGNATURE_FILE_BAD. Loading the provider library image failed before its signature was verified.",
        ERROR_INVALID_HANDLE => "ERROR_INVALID_HANDLE. One of the parameters specifies a handle that is not valid.",
        NTE_BAD_UID => "NTE_BAD_UID. The context parameter does not contain a valid context handle.",
        _ => return None,
    };
    Some(text)
}

fn engine_message(code: u32) -> Option<&'static str> {
    let text = match code {
        ERROR_INVALID_HANDLE => "ERROR_INVALID_HANDLE. One of the parameters specifies a handle that is not valid.",
        ERROR_INVALID_PARAMETER => "ERROR_INVALID_PARAMETER. One of the parameters contains a value that is not valid.",
        ERROR_NOT_ENOUGH_MEMORY => "ERROR_NOT_ENOUGH_MEMORY. The operating system ran out of memory during the operation.",
        NTE_BAD_ALGID => "NTE_BAD_ALGID. The provider does not support the requested algorithm.",
        NTE_BAD_FLAGS => "NTE_BAD_FLAGS. The flags parameter is nonzero.",
        NTE_BAD_KEY => "NTE_BAD_KEY. A keyed hash algorithm was requested without a valid key.",
        NTE_NO_MEMORY => "NTE_NO_MEMORY. The provider ran out of memory during the operation.",
        ERROR_BUSY => "ERROR_BUSY. The hash object is currently being used and cannot be destroyed.",
        NTE_BAD_HASH => "NTE_BAD_HASH. The hash object is not valid.",
        NTE_BAD_UID => "NTE_BAD_UID. The provider context the hash object was created with cannot be found.",
        _ => return None,
    };
    Some(text)
}

fn accumulation_message(code: u32) -> Option<&'static str> {
    let text = match code {
        ERROR_INVALID_HANDLE => "ERROR_INVALID_HANDLE. One of the parameters specifies a handle that is not valid.",
        ERROR_INVALID_PARAMETER => "ERROR_INVALID_PARAMETER. One of the parameters contains a value that is not valid.",
        NTE_BAD_ALGID => "NTE_BAD_ALGID. The hash object uses an algorithm the provider does not support.",
        NTE_BAD_FLAGS => "NTE_BAD_FLAGS. The flags parameter contains a value that is not valid.",
        NTE_BAD_HASH => "NTE_BAD_HASH. The hash object is not valid.",
        NTE_BAD_HASH_STATE => "NTE_BAD_HASH_STATE. Data was added to a hash object that is already marked finished.",
        NTE_BAD_KEY => "NTE_BAD_KEY. The session key of a keyed hash is no longer valid.",
        NTE_BAD_LEN => "NTE_BAD_LEN. A data length was passed together with the user data flag.",
        NTE_BAD_UID => "NTE_BAD_UID. The provider context the hash object was created with cannot be found.",
        NTE_FAIL => "NTE_FAIL. The function failed in some unexpected way.",
        NTE_NO_MEMORY => "NTE_NO_MEMORY. The provider ran out of memory during the operation.",
        _ => return None,
    };
    Some(text)
}

fn parameter_message(code: u32) -> Option<&'static str> {
    let text = match code {
        ERROR_INVALID_HANDLE => "ERROR_INVALID_HANDLE. One of the parameters specifies a handle that is not valid.",
        ERROR_INVALID_PARAMETER => "ERROR_INVALID_PARAMETER. One of the parameters contains a value that is not valid.",
        ERROR_MORE_DATA => "ERROR_MORE_DATA. The output buffer is too small; the required size was returned.",
        NTE_BAD_FLAGS => "NTE_BAD_FLAGS. The flags parameter is nonzero.",
        NTE_BAD_HASH => "NTE_BAD_HASH. The hash object is not valid.",
        NTE_BAD_TYPE => "NTE_BAD_TYPE. The parameter number is unknown.",
        NTE_BAD_UID => "NTE_BAD_UID. The provider context the hash object was created with cannot be found.",
        _ => return None,
    };
    Some(text)
}
