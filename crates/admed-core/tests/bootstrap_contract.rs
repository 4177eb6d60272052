//! Contract Test: Shared Bootstrap
//!
//! Constraints verified:
//! - Concurrent `init` callers share one SDK initialization and one outcome
//! - Bootstrap waits for host readiness before touching the SDK
//! - A missing SDK or credential fails with a stable error code
//! - A failed bootstrap can be retried by a later explicit `init`
//! - Bootstrap runs to completion even when no caller is still waiting
//!
//! If this test fails, the adapter may initialize the SDK more than once.

mod common;

use admed_core::{
    AdKind, AdLifecycleAdapter, AdapterOptions, AdsConfig, Error, ReadySignal, SdkBindings,
    ShowStatus,
};
use common::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn concurrent_init_shares_one_sdk_initialization() {
    let sdk = ScriptedSdk::new();
    sdk.delay_init(Duration::from_millis(200));
    let adapter = ready_adapter(&sdk);
    let config = fixture_config();

    let (a, b, c) = tokio::join!(
        adapter.init(&config),
        adapter.init(&config),
        adapter.init(&config)
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());

    assert_eq!(sdk.init_call_count(), 1, "SDK initialized more than once");
    assert_eq!(sdk.init_keys(), vec![SDK_KEY.to_string()]);
    assert!(adapter.is_initialized());

    // already initialized: resolves without touching the SDK
    adapter.init(&config).await.unwrap();
    assert_eq!(sdk.init_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn bootstrap_waits_for_host_readiness() {
    let sdk = ScriptedSdk::new();
    let host_ready = ReadySignal::new();
    let adapter = adapter_with(&sdk, AdapterOptions::default(), host_ready.clone());

    let init = tokio::spawn({
        let adapter = adapter.clone();
        async move { adapter.init(&fixture_config()).await }
    });

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!init.is_finished());
    assert_eq!(sdk.init_call_count(), 0, "SDK touched before host readiness");

    host_ready.fire();
    init.await.unwrap().unwrap();
    assert_eq!(sdk.init_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_sdk_fails_with_sdk_not_available() {
    let options = AdapterOptions::default()
        .with_sdk_wait(Duration::from_millis(500), Duration::from_millis(100));
    let adapter = AdLifecycleAdapter::new(
        options,
        ReadySignal::fired(),
        Arc::new(SdkBindings::default()),
    );

    let err = adapter.init(&fixture_config()).await.unwrap_err();
    assert_eq!(err, Error::SdkNotAvailable { waited_ms: 500 });
    assert_eq!(err.code(), "SDK_NOT_AVAILABLE");
    assert!(!adapter.is_initialized());

    // nothing downstream works without a ready SDK
    let reward = placement("reward");
    assert_eq!(
        adapter.load(AdKind::Rewarded, "reward", &reward).await,
        Err(Error::NotInitialized)
    );
    assert_eq!(
        adapter.show(AdKind::Rewarded, "reward", &reward).await.status,
        ShowStatus::NotReady
    );
}

#[tokio::test(start_paused = true)]
async fn sdk_bound_late_is_found_by_polling() {
    let sdk = ScriptedSdk::new();
    let bindings = Arc::new(SdkBindings::default());
    let options = AdapterOptions::default()
        .with_sdk_wait(Duration::from_secs(2), Duration::from_millis(100));
    let adapter = AdLifecycleAdapter::new(options, ReadySignal::fired(), bindings.clone());
    sdk.attach(adapter.event_bus());

    let binder = tokio::spawn({
        let sdk = sdk.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(750)).await;
            bindings.bind("AppLovinMAX", sdk);
        }
    });

    adapter.init(&fixture_config()).await.unwrap();
    binder.await.unwrap();
    assert_eq!(sdk.init_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_credential_fails_and_init_can_be_retried() {
    let sdk = ScriptedSdk::new();
    let adapter = ready_adapter(&sdk);

    let mut no_key = fixture_config();
    no_key.mediators.clear();

    let (a, b) = tokio::join!(adapter.init(&no_key), adapter.init(&no_key));
    let expected = Error::CredentialMissing {
        mediator: "applovin".to_string(),
    };
    assert_eq!(a, Err(expected.clone()));
    assert_eq!(b, Err(expected));
    assert_eq!(sdk.init_call_count(), 0);
    assert!(!adapter.is_initialized());

    // an empty key counts as missing
    let empty_key = AdsConfig::new().with_mediator("applovin", "");
    assert_eq!(
        adapter.init(&empty_key).await.unwrap_err().code(),
        "CREDENTIAL_MISSING"
    );

    adapter.init(&fixture_config()).await.unwrap();
    assert!(adapter.is_initialized());
    assert_eq!(sdk.init_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn load_issued_during_bootstrap_waits_for_it() {
    let sdk = ScriptedSdk::new();
    sdk.delay_init(Duration::from_millis(300));
    let adapter = ready_adapter(&sdk);
    let reward = placement("reward");
    let config = fixture_config();

    let (init, load) = tokio::join!(
        adapter.init(&config),
        adapter.load(AdKind::Rewarded, "reward", &reward)
    );
    init.unwrap();
    load.unwrap();
    assert_eq!(sdk.count("load_rewarded_ad"), 1);
    assert!(adapter.is_ready("reward"));
}

#[tokio::test(start_paused = true)]
async fn test_device_ids_are_registered_after_init() {
    let sdk = ScriptedSdk::new();
    let options =
        AdapterOptions::default().with_test_device_ids(vec!["device-gaid".to_string()]);
    let adapter = adapter_with(&sdk, options, ReadySignal::fired());

    adapter.init(&fixture_config()).await.unwrap();
    assert_eq!(sdk.test_device_ids(), vec!["device-gaid".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn bootstrap_completes_after_its_caller_gives_up() {
    let sdk = ScriptedSdk::new();
    sdk.delay_init(Duration::from_millis(200));
    let adapter = ready_adapter(&sdk);

    let config = fixture_config();
    let gave_up = tokio::time::timeout(Duration::from_millis(10), adapter.init(&config)).await;
    assert!(gave_up.is_err());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(adapter.is_initialized());
    assert_eq!(sdk.init_call_count(), 1);

    adapter
        .load(AdKind::Rewarded, "reward", &placement("reward"))
        .await
        .unwrap();
}
