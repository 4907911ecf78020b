//! In-process provider with CryptoAPI semantics
//!
//! Computes GOST R 34.11-94 (CryptoPro parameters) and GOST R 34.11-2012 in
//! software and keeps its contexts and hash objects in handle tables, so that
//! stale or foreign handles are rejected the way a real provider rejects them.
//!
//! Tests can inject one-shot failures with [`EmulatedCsp::fail_next`]. A
//! provider built with [`EmulatedCsp::with_journal`] also records every call
//! for [`EmulatedCsp::journal`]; the default one only counts them.

use crate::backend::{NativeBackend, NativeBool, RawHandle, FALSE, NULL_HANDLE, TRUE};
use crate::constants::{
    codes, AlgId, ProviderFamily, CALG_GR3411, CALG_GR3411_2012_256, CALG_GR3411_2012_512,
    CRYPT_VERIFYCONTEXT, HP_ALGID, HP_HASHSIZE, HP_HASHVAL,
};
use digest::Digest;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

thread_local! {
    static LAST_ERROR: Cell<u32> = const { Cell::new(0) };
}

/// Native call kinds, used for fault injection and the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeCall {
    /// `CryptAcquireContext`
    AcquireContext,
    /// `CryptReleaseContext`
    ReleaseContext,
    /// `CryptCreateHash`
    CreateHash,
    /// `CryptDestroyHash`
    DestroyHash,
    /// `CryptHashData`
    HashData,
    /// `CryptGetHashParam`
    GetHashParam,
}

/// One recorded native call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalEntry {
    /// Call kind
    pub call: NativeCall,
    /// Handle the call produced or operated on (`0` if none)
    pub handle: RawHandle,
    /// Whether the call succeeded
    pub ok: bool,
}

enum GostHasher {
    Gost94(gost94::Gost94CryptoPro),
    Streebog256(streebog::Streebog256),
    Streebog512(streebog::Streebog512),
}

impl GostHasher {
    fn for_alg(alg_id: AlgId) -> Option<Self> {
        match alg_id {
            CALG_GR3411 => Some(Self::Gost94(gost94::Gost94CryptoPro::new())),
            CALG_GR3411_2012_256 => Some(Self::Streebog256(streebog::Streebog256::new())),
            CALG_GR3411_2012_512 => Some(Self::Streebog512(streebog::Streebog512::new())),
            _ => None,
        }
    }

    fn output_size(alg_id: AlgId) -> usize {
        match alg_id {
            CALG_GR3411_2012_512 => 64,
            _ => 32,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Gost94(h) => h.update(data),
            Self::Streebog256(h) => h.update(data),
            Self::Streebog512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Gost94(h) => h.finalize().to_vec(),
            Self::Streebog256(h) => h.finalize().to_vec(),
            Self::Streebog512(h) => h.finalize().to_vec(),
        }
    }
}

enum HashState {
    Open(GostHasher),
    Finished(Vec<u8>),
}

struct HashObject {
    context: RawHandle,
    alg_id: AlgId,
    state: HashState,
}

impl HashObject {
    fn value(&mut self) -> &[u8] {
        let state = std::mem::replace(&mut self.state, HashState::Finished(Vec::new()));
        self.state = match state {
            HashState::Open(hasher) => HashState::Finished(hasher.finalize()),
            finished => finished,
        };
        match &self.state {
            HashState::Finished(value) => value.as_slice(),
            HashState::Open(_) => &[],
        }
    }
}

#[derive(Default)]
struct CspState {
    next_handle: RawHandle,
    contexts: HashMap<RawHandle, ProviderFamily>,
    hashes: HashMap<RawHandle, HashObject>,
    faults: HashMap<NativeCall, u32>,
    calls: HashMap<NativeCall, usize>,
    journal: Option<Vec<JournalEntry>>,
}

impl CspState {
    fn allocate(&mut self) -> RawHandle {
        self.next_handle += 1;
        self.next_handle
    }

    fn record(&mut self, call: NativeCall, handle: RawHandle, ok: bool) {
        *self.calls.entry(call).or_default() += 1;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(JournalEntry { call, handle, ok });
        }
    }

    fn fail(&mut self, call: NativeCall, handle: RawHandle, code: u32) -> NativeBool {
        LAST_ERROR.with(|last| last.set(code));
        self.record(call, handle, false);
        FALSE
    }

    fn succeed(&mut self, call: NativeCall, handle: RawHandle) -> NativeBool {
        self.record(call, handle, true);
        TRUE
    }

    fn injected(&mut self, call: NativeCall) -> Option<u32> {
        self.faults.remove(&call)
    }
}

/// Software provider supporting the GOST provider families
#[derive(Default)]
pub struct EmulatedCsp {
    state: Mutex<CspState>,
}

impl EmulatedCsp {
    /// Create a provider with no open handles
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that records every call in its journal
    ///
    /// The journal grows with each call, chunk by chunk; meant for tests.
    pub fn with_journal() -> Self {
        let csp = Self::default();
        csp.lock().journal = Some(Vec::new());
        csp
    }

    fn lock(&self) -> MutexGuard<'_, CspState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of kind `call` fail with `code`
    ///
    /// The failure is reported before any validation and leaves every handle
    /// untouched, so a failed release keeps its handle open.
    pub fn fail_next(&self, call: NativeCall, code: u32) {
        self.lock().faults.insert(call, code);
    }

    /// Every call made so far, in order; empty unless built with
    /// [`EmulatedCsp::with_journal`]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.lock().journal.clone().unwrap_or_default()
    }

    /// Number of calls of kind `call` made so far, failed ones included
    pub fn count(&self, call: NativeCall) -> usize {
        self.lock().calls.get(&call).copied().unwrap_or(0)
    }

    /// Number of contexts not yet released
    pub fn live_contexts(&self) -> usize {
        self.lock().contexts.len()
    }

    /// Number of hash objects not yet destroyed
    pub fn live_hashes(&self) -> usize {
        self.lock().hashes.len()
    }

    fn supports(family: ProviderFamily, alg_id: AlgId) -> bool {
        match family {
            ProviderFamily::Gost2001Dh => alg_id == CALG_GR3411,
            ProviderFamily::Gost2012_256 => {
                matches!(alg_id, CALG_GR3411 | CALG_GR3411_2012_256)
            }
            ProviderFamily::Gost2012_512 => matches!(
                alg_id,
                CALG_GR3411 | CALG_GR3411_2012_256 | CALG_GR3411_2012_512
            ),
        }
    }
}

impl NativeBackend for EmulatedCsp {
    fn acquire_context(
        &self,
        provider_type: u32,
        flags: u32,
        context: &mut RawHandle,
    ) -> NativeBool {
        let call = NativeCall::AcquireContext;
        let mut state = self.lock();
        *context = NULL_HANDLE;

        if let Some(code) = state.injected(call) {
            return state.fail(call, NULL_HANDLE, code);
        }
        if flags != CRYPT_VERIFYCONTEXT {
            return state.fail(call, NULL_HANDLE, codes::NTE_BAD_FLAGS);
        }
        let Some(family) = ProviderFamily::from_provider_type(provider_type) else {
            let code = if (1..=999).contains(&provider_type) {
                codes::NTE_PROV_TYPE_NOT_DEF
            } else {
                codes::NTE_BAD_PROV_TYPE
            };
            return state.fail(call, NULL_HANDLE, code);
        };

        let handle = state.allocate();
        state.contexts.insert(handle, family);
        *context = handle;
        state.succeed(call, handle)
    }

    fn release_context(&self, context: RawHandle, flags: u32) -> NativeBool {
        let call = NativeCall::ReleaseContext;
        let mut state = self.lock();

        if let Some(code) = state.injected(call) {
            return state.fail(call, context, code);
        }
        if flags != 0 {
            return state.fail(call, context, codes::NTE_BAD_FLAGS);
        }
        if !state.contexts.contains_key(&context) {
            return state.fail(call, context, codes::NTE_BAD_UID);
        }
        if state.hashes.values().any(|hash| hash.context == context) {
            return state.fail(call, context, codes::ERROR_BUSY);
        }

        state.contexts.remove(&context);
        state.succeed(call, context)
    }

    fn create_hash(&self, context: RawHandle, alg_id: u32, hash: &mut RawHandle) -> NativeBool {
        let call = NativeCall::CreateHash;
        let mut state = self.lock();
        *hash = NULL_HANDLE;

        if let Some(code) = state.injected(call) {
            return state.fail(call, context, code);
        }
        let Some(&family) = state.contexts.get(&context) else {
            return state.fail(call, context, codes::NTE_BAD_UID);
        };
        if !Self::supports(family, alg_id) {
            return state.fail(call, context, codes::NTE_BAD_ALGID);
        }
        let Some(hasher) = GostHasher::for_alg(alg_id) else {
            return state.fail(call, context, codes::NTE_BAD_ALGID);
        };

        let handle = state.allocate();
        state.hashes.insert(
            handle,
            HashObject {
                context,
                alg_id,
                state: HashState::Open(hasher),
            },
        );
        *hash = handle;
        state.succeed(call, handle)
    }

    fn destroy_hash(&self, hash: RawHandle) -> NativeBool {
        let call = NativeCall::DestroyHash;
        let mut state = self.lock();

        if let Some(code) = state.injected(call) {
            return state.fail(call, hash, code);
        }
        if state.hashes.remove(&hash).is_none() {
            return state.fail(call, hash, codes::NTE_BAD_HASH);
        }
        state.succeed(call, hash)
    }

    fn hash_data(&self, hash: RawHandle, data: &[u8], flags: u32) -> NativeBool {
        let call = NativeCall::HashData;
        let mut state = self.lock();

        if let Some(code) = state.injected(call) {
            return state.fail(call, hash, code);
        }
        if flags != 0 {
            return state.fail(call, hash, codes::NTE_BAD_FLAGS);
        }
        let Some(object) = state.hashes.get_mut(&hash) else {
            return state.fail(call, hash, codes::NTE_BAD_HASH);
        };
        let finished = match &mut object.state {
            HashState::Open(hasher) => {
                hasher.update(data);
                false
            }
            HashState::Finished(_) => true,
        };
        if finished {
            return state.fail(call, hash, codes::NTE_BAD_HASH_STATE);
        }
        state.succeed(call, hash)
    }

    fn get_hash_param(
        &self,
        hash: RawHandle,
        param: u32,
        data: &mut [u8],
        data_len: &mut u32,
        flags: u32,
    ) -> NativeBool {
        let call = NativeCall::GetHashParam;
        let mut state = self.lock();

        if let Some(code) = state.injected(call) {
            return state.fail(call, hash, code);
        }
        if flags != 0 {
            return state.fail(call, hash, codes::NTE_BAD_FLAGS);
        }
        let Some(object) = state.hashes.get_mut(&hash) else {
            return state.fail(call, hash, codes::NTE_BAD_HASH);
        };

        let value = match param {
            HP_HASHVAL => Some(object.value().to_vec()),
            HP_HASHSIZE => {
                let size = GostHasher::output_size(object.alg_id) as u32;
                Some(size.to_le_bytes().to_vec())
            }
            HP_ALGID => Some(object.alg_id.to_le_bytes().to_vec()),
            _ => None,
        };
        let Some(value) = value else {
            return state.fail(call, hash, codes::NTE_BAD_TYPE);
        };

        let capacity = (*data_len as usize).min(data.len());
        // value lengths are at most 64
        *data_len = value.len() as u32;
        if capacity < value.len() {
            return state.fail(call, hash, codes::ERROR_MORE_DATA);
        }
        data[..value.len()].copy_from_slice(&value);
        state.succeed(call, hash)
    }

    fn last_error(&self) -> u32 {
        LAST_ERROR.with(Cell::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn open(csp: &EmulatedCsp, family: ProviderFamily, alg_id: AlgId) -> (RawHandle, RawHandle) {
        let mut context = NULL_HANDLE;
        assert_eq!(
            csp.acquire_context(family.provider_type(), CRYPT_VERIFYCONTEXT, &mut context),
            TRUE
        );
        let mut hash = NULL_HANDLE;
        assert_eq!(csp.create_hash(context, alg_id, &mut hash), TRUE);
        (context, hash)
    }

    fn digest(csp: &EmulatedCsp, hash: RawHandle, size: usize) -> Vec<u8> {
        let mut out = vec![0u8; size];
        let mut len = size as u32;
        assert_eq!(csp.get_hash_param(hash, HP_HASHVAL, &mut out, &mut len, 0), TRUE);
        assert_eq!(len as usize, size);
        out
    }

    #[test]
    fn streebog256_hello_world() {
        let csp = EmulatedCsp::new();
        let (_, hash) = open(&csp, ProviderFamily::Gost2012_512, CALG_GR3411_2012_256);
        assert_eq!(csp.hash_data(hash, b"Hello world", 0), TRUE);
        assert_eq!(
            digest(&csp, hash, 32),
            hex!("6960df2aa2b21015836a81446662b55e4c11c8f5289ea8ac9ed01cb172975dbf")
        );
    }

    #[test]
    fn gost94_hello_world() {
        let csp = EmulatedCsp::new();
        let (_, hash) = open(&csp, ProviderFamily::Gost2012_512, CALG_GR3411);
        assert_eq!(csp.hash_data(hash, b"Hello world", 0), TRUE);
        assert_eq!(
            digest(&csp, hash, 32),
            hex!("83b95631f380a2af583915f565a28055e348df1b9ffa7b246f4cbdae5ee63a73")
        );
    }

    #[test]
    fn family_limits_algorithms() {
        let csp = EmulatedCsp::new();
        let mut context = NULL_HANDLE;
        assert_eq!(
            csp.acquire_context(
                ProviderFamily::Gost2001Dh.provider_type(),
                CRYPT_VERIFYCONTEXT,
                &mut context
            ),
            TRUE
        );
        let mut hash = NULL_HANDLE;
        assert_eq!(csp.create_hash(context, CALG_GR3411_2012_512, &mut hash), FALSE);
        assert_eq!(csp.last_error(), codes::NTE_BAD_ALGID);
        assert_eq!(hash, NULL_HANDLE);
    }

    #[test]
    fn unknown_provider_types() {
        let csp = EmulatedCsp::new();
        let mut context = NULL_HANDLE;
        assert_eq!(csp.acquire_context(24, CRYPT_VERIFYCONTEXT, &mut context), FALSE);
        assert_eq!(csp.last_error(), codes::NTE_PROV_TYPE_NOT_DEF);
        assert_eq!(csp.acquire_context(5000, CRYPT_VERIFYCONTEXT, &mut context), FALSE);
        assert_eq!(csp.last_error(), codes::NTE_BAD_PROV_TYPE);
        assert_eq!(csp.acquire_context(81, 0, &mut context), FALSE);
        assert_eq!(csp.last_error(), codes::NTE_BAD_FLAGS);
        assert_eq!(csp.live_contexts(), 0);
    }

    #[test]
    fn context_with_live_hash_is_busy() {
        let csp = EmulatedCsp::new();
        let (context, hash) = open(&csp, ProviderFamily::Gost2012_256, CALG_GR3411_2012_256);
        assert_eq!(csp.release_context(context, 0), FALSE);
        assert_eq!(csp.last_error(), codes::ERROR_BUSY);

        assert_eq!(csp.destroy_hash(hash), TRUE);
        assert_eq!(csp.release_context(context, 0), TRUE);
        assert_eq!(csp.release_context(context, 0), FALSE);
        assert_eq!(csp.last_error(), codes::NTE_BAD_UID);
    }

    #[test]
    fn small_buffer_reports_required_size() {
        let csp = EmulatedCsp::new();
        let (_, hash) = open(&csp, ProviderFamily::Gost2012_512, CALG_GR3411_2012_512);
        let mut out = [0u8; 16];
        let mut len = 16;
        assert_eq!(csp.get_hash_param(hash, HP_HASHVAL, &mut out, &mut len, 0), FALSE);
        assert_eq!(csp.last_error(), codes::ERROR_MORE_DATA);
        assert_eq!(len, 64);
    }

    #[test]
    fn injected_fault_fires_once_and_is_journaled() {
        let csp = EmulatedCsp::with_journal();
        csp.fail_next(NativeCall::AcquireContext, codes::NTE_KEYSET_NOT_DEF);

        let mut context = NULL_HANDLE;
        assert_eq!(csp.acquire_context(81, CRYPT_VERIFYCONTEXT, &mut context), FALSE);
        assert_eq!(csp.last_error(), codes::NTE_KEYSET_NOT_DEF);
        assert_eq!(csp.acquire_context(81, CRYPT_VERIFYCONTEXT, &mut context), TRUE);

        let journal = csp.journal();
        assert_eq!(journal.len(), 2);
        assert!(!journal[0].ok);
        assert!(journal[1].ok);
        assert_eq!(journal[1].handle, context);
    }

    #[test]
    fn default_provider_counts_without_journaling() {
        let csp = EmulatedCsp::new();
        let (context, hash) = open(&csp, ProviderFamily::Gost2012_512, CALG_GR3411_2012_256);
        for _ in 0..1000 {
            assert_eq!(csp.hash_data(hash, &[0x5a; 256], 0), TRUE);
        }
        assert_eq!(csp.destroy_hash(hash), TRUE);
        assert_eq!(csp.release_context(context, 0), TRUE);

        assert!(csp.journal().is_empty());
        assert_eq!(csp.count(NativeCall::HashData), 1000);
        assert_eq!(csp.count(NativeCall::ReleaseContext), 1);
    }

    #[test]
    fn last_error_belongs_to_the_failing_thread() {
        let csp = std::sync::Arc::new(EmulatedCsp::new());
        let (_, hash) = open(&csp, ProviderFamily::Gost2012_512, CALG_GR3411_2012_512);
        let mut context = NULL_HANDLE;
        assert_eq!(
            csp.acquire_context(
                ProviderFamily::Gost2001Dh.provider_type(),
                CRYPT_VERIFYCONTEXT,
                &mut context
            ),
            TRUE
        );

        let bad_alg = {
            let csp = csp.clone();
            std::thread::spawn(move || {
                (0..2000)
                    .filter(|_| {
                        let mut engine = NULL_HANDLE;
                        csp.create_hash(context, CALG_GR3411_2012_512, &mut engine) == FALSE
                            && csp.last_error() != codes::NTE_BAD_ALGID
                    })
                    .count()
            })
        };
        let more_data = {
            let csp = csp.clone();
            std::thread::spawn(move || {
                (0..2000)
                    .filter(|_| {
                        let mut out = [0u8; 16];
                        let mut len = 16;
                        csp.get_hash_param(hash, HP_HASHVAL, &mut out, &mut len, 0) == FALSE
                            && csp.last_error() != codes::ERROR_MORE_DATA
                    })
                    .count()
            })
        };

        assert_eq!(bad_alg.join().expect("thread"), 0);
        assert_eq!(more_data.join().expect("thread"), 0);
    }
}
