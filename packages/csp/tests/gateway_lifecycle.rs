//! Gateway lifecycle against the emulated provider

use hashgate_csp::constants::{codes, CALG_GR3411, CALG_GR3411_2012_256, CALG_GR3411_2012_512};
use hashgate_csp::{CallCategory, EmulatedCsp, Gateway, NativeCall, ProviderFamily};
use hashgate_common::Classify;
use hex_literal::hex;
use std::sync::Arc;

fn emulated() -> (Arc<EmulatedCsp>, Gateway) {
    let csp = Arc::new(EmulatedCsp::with_journal());
    (csp.clone(), Gateway::new(csp))
}

fn digest_of(gateway: &Gateway, alg_id: u32, size: usize, chunks: &[&[u8]]) -> Vec<u8> {
    let mut context = gateway
        .acquire_context(ProviderFamily::Gost2012_512)
        .expect("context should be acquired");
    let mut engine = gateway
        .create_engine(&context, alg_id)
        .expect("engine should be created");

    for chunk in chunks {
        gateway.accumulate(&engine, chunk).expect("chunk should be accepted");
    }
    let digest = gateway.read_digest(&engine, size).expect("digest should be read");

    gateway.destroy_engine(&mut engine).expect("engine should be destroyed");
    gateway.release_context(&mut context).expect("context should be released");
    digest
}

#[test]
fn gost_known_answers() {
    let (_csp, gateway) = emulated();

    assert_eq!(
        digest_of(&gateway, CALG_GR3411, 32, &[b"Hello world"]),
        hex!("83b95631f380a2af583915f565a28055e348df1b9ffa7b246f4cbdae5ee63a73")
    );
    assert_eq!(
        digest_of(&gateway, CALG_GR3411_2012_256, 32, &[b"Hello world"]),
        hex!("6960df2aa2b21015836a81446662b55e4c11c8f5289ea8ac9ed01cb172975dbf")
    );
    assert_eq!(
        digest_of(&gateway, CALG_GR3411_2012_512, 64, &[b"Hello world"]),
        hex!(
            "5c175af4bf26f229b865f754d71b2dd4ca3a35c2a27e017ad48fc3cd3064087b"
            "f49190dbd35dc84e25abea30b223a9eb3130cb567c7f523178be46a9f6b5e50e"
        )
    );
}

#[test]
fn split_input_matches_whole_input() {
    let (_csp, gateway) = emulated();
    let whole = digest_of(&gateway, CALG_GR3411_2012_512, 64, &[b"Hello world"]);
    let split = digest_of(&gateway, CALG_GR3411_2012_512, 64, &[b"Hel", b"", b"lo wo", b"rld"]);
    assert_eq!(whole, split);
}

#[test]
fn native_calls_are_paired_and_ordered() {
    let (csp, gateway) = emulated();
    digest_of(&gateway, CALG_GR3411_2012_256, 32, &[b"abc"]);

    let calls: Vec<NativeCall> = csp.journal().iter().map(|entry| entry.call).collect();
    assert_eq!(
        calls,
        vec![
            NativeCall::AcquireContext,
            NativeCall::CreateHash,
            NativeCall::HashData,
            NativeCall::GetHashParam,
            NativeCall::DestroyHash,
            NativeCall::ReleaseContext,
        ]
    );
    assert!(csp.journal().iter().all(|entry| entry.ok));
    assert_eq!(csp.live_contexts(), 0);
    assert_eq!(csp.live_hashes(), 0);
}

#[test]
fn unsupported_family_algorithm_is_a_recoverable_creation_error() {
    let (csp, gateway) = emulated();
    let mut context = gateway
        .acquire_context(ProviderFamily::Gost2012_256)
        .expect("context should be acquired");

    let error = gateway
        .create_engine(&context, CALG_GR3411_2012_512)
        .expect_err("2012-512 is not available in the 256 family");
    assert_eq!(error.category(), CallCategory::EngineCreation);
    assert_eq!(error.status(), codes::NTE_BAD_ALGID);
    assert!(!error.is_fatal());
    assert!(error.to_string().contains("NTE_BAD_ALGID"));

    gateway.release_context(&mut context).expect("context should be released");
    assert_eq!(csp.live_contexts(), 0);
}

#[test]
fn acquisition_failure_leaves_nothing_behind() {
    let (csp, gateway) = emulated();
    csp.fail_next(NativeCall::AcquireContext, codes::NTE_PROV_DLL_NOT_FOUND);

    let error = gateway
        .acquire_context(ProviderFamily::Gost2012_512)
        .expect_err("injected failure");
    assert_eq!(error.category(), CallCategory::ContextAcquisition);
    assert_eq!(error.status(), codes::NTE_PROV_DLL_NOT_FOUND);
    assert!(error.message().starts_with("NTE_PROV_DLL_NOT_FOUND."));
    assert_eq!(csp.live_contexts(), 0);
}

#[test]
fn failed_release_is_fatal() {
    let (csp, gateway) = emulated();
    let mut context = gateway
        .acquire_context(ProviderFamily::Gost2001Dh)
        .expect("context should be acquired");

    csp.fail_next(NativeCall::ReleaseContext, codes::NTE_FAIL);
    let error = gateway
        .release_context(&mut context)
        .expect_err("injected failure");
    assert_eq!(error.category(), CallCategory::ContextRelease);
    assert!(error.is_fatal());
    assert_eq!(error.message(), "undefined error in category context release");

    // the handle was consumed by the failed attempt
    assert!(!context.is_live());
    gateway
        .release_context(&mut context)
        .expect("released handles are ignored");
}

#[test]
fn concurrent_failures_keep_their_own_status() {
    let (_csp, gateway) = emulated();
    let mut legacy = gateway
        .acquire_context(ProviderFamily::Gost2001Dh)
        .expect("context should be acquired");
    let mut modern = gateway
        .acquire_context(ProviderFamily::Gost2012_512)
        .expect("context should be acquired");
    let mut engine = gateway
        .create_engine(&modern, CALG_GR3411_2012_512)
        .expect("engine should be created");

    let (bad_alg, short_buffer) = std::thread::scope(|scope| {
        let bad_alg = scope.spawn(|| {
            (0..2000)
                .filter_map(|_| gateway.create_engine(&legacy, CALG_GR3411_2012_512).err())
                .filter(|error| error.status() != codes::NTE_BAD_ALGID)
                .count()
        });
        let short_buffer = scope.spawn(|| {
            (0..2000)
                .filter_map(|_| gateway.read_digest(&engine, 16).err())
                .filter(|error| error.status() != codes::ERROR_MORE_DATA)
                .count()
        });
        (
            bad_alg.join().expect("thread"),
            short_buffer.join().expect("thread"),
        )
    });
    assert_eq!(bad_alg, 0);
    assert_eq!(short_buffer, 0);

    gateway.destroy_engine(&mut engine).expect("destroy");
    gateway.release_context(&mut modern).expect("release");
    gateway.release_context(&mut legacy).expect("release");
}
