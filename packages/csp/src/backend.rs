//! Raw call surface of a native provider
//!
//! Implementations follow CryptoAPI conventions: every call returns a `BOOL`
//! and, on failure, leaves a status code behind that [`NativeBackend::last_error`]
//! reports. Handles are plain integers and `0` is the null handle.

/// Opaque provider or hash handle value
pub type RawHandle = usize;

/// The null handle
pub const NULL_HANDLE: RawHandle = 0;

/// `BOOL` as returned by every native call
pub type NativeBool = i32;

/// Value returned by a call that succeeded
pub const TRUE: NativeBool = 1;

/// Value returned by a call that failed
pub const FALSE: NativeBool = 0;

/// Native provider capabilities used by the gateway
///
/// The methods take `&self`; providers that keep state behind the handles use
/// interior mutability. `last_error` must report the status left by the most
/// recent failed call on the calling thread of control.
pub trait NativeBackend: Send + Sync {
    /// `CryptAcquireContext`: open a provider session of `provider_type`
    fn acquire_context(&self, provider_type: u32, flags: u32, context: &mut RawHandle)
        -> NativeBool;

    /// `CryptReleaseContext`: close a provider session
    fn release_context(&self, context: RawHandle, flags: u32) -> NativeBool;

    /// `CryptCreateHash`: create a hash object bound to `context`
    fn create_hash(&self, context: RawHandle, alg_id: u32, hash: &mut RawHandle) -> NativeBool;

    /// `CryptDestroyHash`: destroy a hash object
    fn destroy_hash(&self, hash: RawHandle) -> NativeBool;

    /// `CryptHashData`: feed bytes into a hash object
    fn hash_data(&self, hash: RawHandle, data: &[u8], flags: u32) -> NativeBool;

    /// `CryptGetHashParam`: read a parameter of a hash object
    ///
    /// `data_len` holds the capacity on input and the written (or required)
    /// length on output.
    fn get_hash_param(
        &self,
        hash: RawHandle,
        param: u32,
        data: &mut [u8],
        data_len: &mut u32,
        flags: u32,
    ) -> NativeBool;

    /// `GetLastError`: status code of the last failed call
    fn last_error(&self) -> u32;
}
