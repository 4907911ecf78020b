//! Resource lifecycle of hash methods against the emulated provider

use hashgate_common::Logging;
use hashgate_csp::constants::codes;
use hashgate_csp::{EmulatedCsp, Gateway, NativeCall};
use hashgate_hashing::{
    Algorithm, CallCategory, Classify, ComputeConfig, ComputeState, HashError, HashMethodFactory,
    ProviderFamily,
};
use std::io::Cursor;
use std::sync::Arc;

fn factory() -> (Arc<EmulatedCsp>, HashMethodFactory) {
    Logging::init_test();
    let csp = Arc::new(EmulatedCsp::with_journal());
    let factory = HashMethodFactory::new(Gateway::new(csp.clone()));
    (csp, factory)
}

fn calls(csp: &EmulatedCsp) -> Vec<NativeCall> {
    csp.journal().iter().map(|entry| entry.call).collect()
}

#[test]
fn backend_method_releases_engine_then_context() {
    let (csp, factory) = factory();
    let mut method = factory.create(Algorithm::Gost3411_2012_512).expect("create");
    assert_eq!(csp.live_contexts(), 1);
    assert_eq!(csp.live_hashes(), 1);

    let digest = method
        .compute(&mut Cursor::new(vec![7u8; 1000]))
        .expect("compute");
    assert_eq!(digest.len(), 64);
    // computing never releases
    assert_eq!(csp.live_hashes(), 1);

    method.release().expect("release");
    assert_eq!(csp.live_contexts(), 0);
    assert_eq!(csp.live_hashes(), 0);

    let journal = calls(&csp);
    let tail = &journal[journal.len() - 2..];
    assert_eq!(tail, [NativeCall::DestroyHash, NativeCall::ReleaseContext]);
}

#[test]
fn release_is_idempotent() {
    let (csp, factory) = factory();
    let mut method = factory.create(Algorithm::Gost3411).expect("create");
    method.release().expect("first release");
    method.release().expect("second release");
    drop(method);

    assert_eq!(csp.count(NativeCall::DestroyHash), 1);
    assert_eq!(csp.count(NativeCall::ReleaseContext), 1);
}

#[test]
fn drop_releases_unreleased_methods() {
    let (csp, factory) = factory();
    {
        let mut method = factory.create(Algorithm::Gost3411_2012_256).expect("create");
        method.update(b"Hello ").expect("update");
        method.update(b"world").expect("update");
        assert_eq!(method.state(), ComputeState::Accumulating);
        let digest = method.finish().expect("finish");
        assert_eq!(
            digest.to_hex(),
            "6960df2aa2b21015836a81446662b55e4c11c8f5289ea8ac9ed01cb172975dbf"
        );
    }
    assert_eq!(csp.live_contexts(), 0);
    assert_eq!(csp.live_hashes(), 0);
}

#[test]
fn unknown_algorithm_acquires_nothing() {
    let (csp, factory) = factory();
    let error = factory.create_by_name("WHIRLPOOL").expect_err("unsupported");
    assert!(matches!(error, HashError::UnknownAlgorithm(_)));
    assert!(error.kind().is_recoverable());
    assert!(csp.journal().is_empty());
}

#[test]
fn software_algorithms_never_touch_the_provider() {
    let (csp, factory) = factory();
    for name in ["MD5", "sha256", "SHA-384", "sha-512"] {
        let mut method = factory.create_by_name(name).expect("create");
        method.compute(&mut Cursor::new(b"abc")).expect("compute");
        method.release().expect("release");
    }
    assert!(csp.journal().is_empty());
}

#[test]
fn failed_engine_creation_releases_the_context() {
    let (csp, factory) = factory();
    csp.fail_next(NativeCall::CreateHash, codes::NTE_NO_MEMORY);

    let error = factory.create(Algorithm::Gost3411_2012_512).expect_err("injected");
    let backend = error.backend().expect("backend error");
    assert_eq!(backend.category(), CallCategory::EngineCreation);
    assert_eq!(backend.status(), codes::NTE_NO_MEMORY);
    assert!(error.kind().is_recoverable());

    assert_eq!(
        calls(&csp),
        vec![
            NativeCall::AcquireContext,
            NativeCall::CreateHash,
            NativeCall::ReleaseContext,
        ]
    );
    assert_eq!(csp.live_contexts(), 0);
}

#[test]
fn failed_acquisition_leaks_nothing() {
    let (csp, factory) = factory();
    csp.fail_next(NativeCall::AcquireContext, codes::NTE_KEYSET_NOT_DEF);

    let error = factory.create(Algorithm::Gost3411).expect_err("injected");
    assert_eq!(
        error.backend().map(|e| e.category()),
        Some(CallCategory::ContextAcquisition)
    );
    assert_eq!(calls(&csp), vec![NativeCall::AcquireContext]);
}

#[test]
fn accumulation_failure_poisons_but_still_releases() {
    let (csp, factory) = factory();
    let mut method = factory.create(Algorithm::Gost3411_2012_256).expect("create");
    csp.fail_next(NativeCall::HashData, codes::NTE_FAIL);

    let error = method
        .compute(&mut Cursor::new(b"Hello world"))
        .expect_err("injected");
    assert_eq!(error.kind(), hashgate_hashing::ErrorKind::Terminal);
    assert_eq!(method.state(), ComputeState::Poisoned);
    assert!(matches!(method.finish(), Err(HashError::EngineUnusable)));

    method.release().expect("release");
    assert_eq!(csp.live_contexts(), 0);
    assert_eq!(csp.live_hashes(), 0);
}

#[test]
fn failed_release_is_fatal_and_reported_once() {
    let (csp, factory) = factory();
    let mut method = factory.create(Algorithm::Gost3411).expect("create");
    csp.fail_next(NativeCall::DestroyHash, codes::ERROR_BUSY);

    let error = method.release().expect_err("injected");
    assert!(error.is_fatal());
    assert_eq!(
        error.backend().map(|e| e.category()),
        Some(CallCategory::EngineRelease)
    );
    // the context is left alone once the engine could not be destroyed
    assert_eq!(csp.count(NativeCall::ReleaseContext), 0);

    method.release().expect("already attempted");
    drop(method);
}

#[test]
fn fatal_release_in_drop_panics() {
    let (csp, factory) = factory();
    let method = factory.create(Algorithm::Gost3411).expect("create");
    csp.fail_next(NativeCall::ReleaseContext, codes::NTE_BAD_UID);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || drop(method)));
    assert!(outcome.is_err());
}

#[test]
fn digest_helper_releases_on_read_error() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("unplugged"))
        }
    }

    let (csp, factory) = factory();
    let error = factory
        .digest_reader(Algorithm::Gost3411_2012_512, &mut Broken)
        .expect_err("read fails");
    assert!(matches!(error, HashError::Io(_)));
    assert_eq!(csp.live_contexts(), 0);
    assert_eq!(csp.live_hashes(), 0);
}

#[test]
fn session_serves_several_methods_and_releases_last() {
    let (csp, factory) = factory();
    let factory = factory
        .with_config(ComputeConfig::default().with_chunk_size(3))
        .expect("config");
    let mut session = factory
        .open_session(ProviderFamily::Gost2012_512)
        .expect("session");

    let short = session
        .digest_bytes(Algorithm::Gost3411_2012_256, b"Hello world")
        .expect("256");
    let long = session
        .digest_bytes(Algorithm::Gost3411_2012_512, b"Hello world")
        .expect("512");
    assert_eq!(short.len(), 32);
    assert_eq!(long.len(), 64);
    assert_eq!(csp.count(NativeCall::AcquireContext), 1);

    let mut held = session.create(Algorithm::Gost3411).expect("create");
    session.release().expect("session release");
    // the held method keeps the context open
    assert_eq!(csp.live_contexts(), 1);

    held.compute(&mut Cursor::new(b"Hello world")).expect("compute");
    held.release().expect("release");
    // releasing the last holder releases the context, not dropping it
    assert_eq!(csp.live_contexts(), 0);
    drop(held);
    assert_eq!(csp.count(NativeCall::ReleaseContext), 1);
}

#[test]
fn sessions_serve_the_algorithms_of_their_family() {
    let (csp, factory) = factory();

    let mut legacy = factory
        .open_session(ProviderFamily::Gost2001Dh)
        .expect("PROV_GOST_2001_DH session");
    let digest = legacy
        .digest_bytes(Algorithm::Gost3411, b"Hello world")
        .expect("GOST3411 on PROV_GOST_2001_DH");
    assert_eq!(
        digest.to_hex(),
        "83b95631f380a2af583915f565a28055e348df1b9ffa7b246f4cbdae5ee63a73"
    );
    let error = legacy
        .create(Algorithm::Gost3411_2012_256)
        .expect_err("2012 digests need a newer family");
    assert_eq!(error.backend().map(|e| e.status()), Some(codes::NTE_BAD_ALGID));
    assert!(error.kind().is_recoverable());
    legacy.release().expect("release");

    let mut short = factory
        .open_session(ProviderFamily::Gost2012_256)
        .expect("PROV_GOST_2012_256 session");
    let digest = short
        .digest_bytes(Algorithm::Gost3411_2012_256, b"Hello world")
        .expect("GOST3411-2012-256 on PROV_GOST_2012_256");
    assert_eq!(
        digest.to_hex(),
        "6960df2aa2b21015836a81446662b55e4c11c8f5289ea8ac9ed01cb172975dbf"
    );
    assert!(short.digest_bytes(Algorithm::Gost3411, b"").is_ok());
    assert!(short.create(Algorithm::Gost3411_2012_512).is_err());
    short.release().expect("release");

    assert_eq!(csp.live_contexts(), 0);
    assert_eq!(csp.live_hashes(), 0);
}

#[test]
fn release_failure_outranks_read_failure() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("unplugged"))
        }
    }

    let (csp, factory) = factory();
    csp.fail_next(NativeCall::ReleaseContext, codes::NTE_BAD_UID);
    let error = factory
        .digest_reader(Algorithm::Gost3411, &mut Broken)
        .expect_err("both fail");
    assert!(error.is_fatal());
    assert_eq!(
        error.backend().map(|e| e.category()),
        Some(CallCategory::ContextRelease)
    );
}

#[test]
fn default_provider_keeps_no_call_history() {
    let csp = Arc::new(EmulatedCsp::new());
    let factory = HashMethodFactory::new(Gateway::new(csp.clone()));
    let data = vec![0x42u8; 256 * 1024];
    for _ in 0..4 {
        factory
            .digest_reader(Algorithm::Gost3411_2012_256, &mut Cursor::new(&data))
            .expect("digest");
    }

    assert!(csp.journal().is_empty());
    assert_eq!(csp.count(NativeCall::HashData), 4 * 1024);
    assert_eq!(csp.live_contexts(), 0);
}
