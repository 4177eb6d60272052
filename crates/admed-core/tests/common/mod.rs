//! Test doubles and common utilities for adapter contract tests
//!
//! The scripted SDK records every call and, when told to, answers loads and
//! shows by publishing events on the adapter's bus from inside the call,
//! the way a native binding that completes synchronously would. Creating a
//! banner or rectangle surface counts as that surface's first load.

#![allow(dead_code)]

use admed_core::{
    AdEvent, AdEventKind, AdKind, AdLifecycleAdapter, AdNetworkSdk, AdViewFormat,
    AdViewPosition, AdapterOptions, AdsConfig, EventBus, PlacementConfig, ReadySignal,
    SdkBindings, TargetConfig,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

pub const SDK_KEY: &str = "test-sdk-key";
pub const REWARD_UNIT: &str = "reward-unit";
pub const INTER_UNIT: &str = "inter-unit";
pub const BANNER_UNIT: &str = "banner-unit";
pub const MREC_UNIT: &str = "mrec-unit";

/// How the SDK answers a load call
#[derive(Debug, Clone)]
pub enum LoadReply {
    Loaded,
    Failed(Option<String>),
    /// Never answer; the test publishes events itself or lets the timer win
    Silent,
}

/// How the SDK answers a full-screen show call
#[derive(Debug, Clone)]
pub enum ShowReply {
    Hidden,
    RewardThenHidden,
    FailedToDisplay(Option<String>),
    Silent,
}

type CreateHook = Arc<dyn Fn(&str) + Send + Sync>;

/// A scriptable AdNetworkSdk that records calls
pub struct ScriptedSdk {
    bus: OnceLock<EventBus>,
    load_reply: Mutex<LoadReply>,
    show_reply: Mutex<ShowReply>,
    /// Simulated duration of the initialization callback
    init_delay: Mutex<Duration>,
    init_call_count: AtomicUsize,
    init_keys: Mutex<Vec<String>>,
    interstitial_ready: AtomicBool,
    rewarded_ready: AtomicBool,
    calls: Mutex<Vec<String>>,
    test_device_ids: Mutex<Vec<String>>,
    on_create: Mutex<Option<CreateHook>>,
}

impl ScriptedSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            bus: OnceLock::new(),
            load_reply: Mutex::new(LoadReply::Loaded),
            show_reply: Mutex::new(ShowReply::Hidden),
            init_delay: Mutex::new(Duration::ZERO),
            init_call_count: AtomicUsize::new(0),
            init_keys: Mutex::new(Vec::new()),
            interstitial_ready: AtomicBool::new(false),
            rewarded_ready: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            test_device_ids: Mutex::new(Vec::new()),
            on_create: Mutex::new(None),
        })
    }

    /// Publish replies on this bus
    pub fn attach(&self, bus: &EventBus) {
        let _ = self.bus.set(bus.clone());
    }

    pub fn reply_to_loads(&self, reply: LoadReply) {
        *self.load_reply.lock().unwrap() = reply;
    }

    pub fn reply_to_shows(&self, reply: ShowReply) {
        *self.show_reply.lock().unwrap() = reply;
    }

    /// Run `hook` with the ad unit from inside every surface creation
    pub fn on_create(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_create.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn delay_init(&self, delay: Duration) {
        *self.init_delay.lock().unwrap() = delay;
    }

    pub fn set_interstitial_ready(&self, ready: bool) {
        self.interstitial_ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_rewarded_ready(&self, ready: bool) {
        self.rewarded_ready.store(ready, Ordering::SeqCst);
    }

    /// Get the number of times initialize() was called
    pub fn init_call_count(&self) -> usize {
        self.init_call_count.load(Ordering::SeqCst)
    }

    pub fn init_keys(&self) -> Vec<String> {
        self.init_keys.lock().unwrap().clone()
    }

    pub fn test_device_ids(&self) -> Vec<String> {
        self.test_device_ids.lock().unwrap().clone()
    }

    /// Every recorded call as "method unit"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to `method`, for any ad unit
    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.split(' ').next() == Some(method))
            .count()
    }

    fn record(&self, method: &str, ad_unit_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", method, ad_unit_id));
    }

    fn emit(&self, event: AdEvent) {
        if let Some(bus) = self.bus.get() {
            bus.publish(event);
        }
    }

    fn answer_load(&self, kind: AdKind, format: AdViewFormat, ad_unit_id: &str) {
        let Some([loaded, failed]) = AdEventKind::load_pair(kind, format) else {
            return;
        };
        let reply = self.load_reply.lock().unwrap().clone();
        match reply {
            LoadReply::Loaded => self.emit(AdEvent::for_unit(loaded, ad_unit_id)),
            LoadReply::Failed(message) => {
                let mut event = AdEvent::for_unit(failed, ad_unit_id);
                event.error_message = message;
                self.emit(event);
            }
            LoadReply::Silent => {}
        }
    }

    fn created(&self, format: AdViewFormat, ad_unit_id: &str, position: AdViewPosition) {
        self.record("position", position.as_str());
        let hook = self.on_create.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(ad_unit_id);
        }
        self.answer_load(AdKind::Banner, format, ad_unit_id);
    }

    fn answer_show(&self, kind: AdKind, ad_unit_id: &str) {
        let (hidden, failed) = match kind {
            AdKind::Rewarded => (AdEventKind::RewardedAdHidden, AdEventKind::RewardedAdFailedToDisplay),
            _ => (AdEventKind::InterstitialHidden, AdEventKind::InterstitialFailedToDisplay),
        };
        let reply = self.show_reply.lock().unwrap().clone();
        match reply {
            ShowReply::Hidden => self.emit(AdEvent::for_unit(hidden, ad_unit_id)),
            ShowReply::RewardThenHidden => {
                self.emit(AdEvent::for_unit(AdEventKind::RewardedAdReceivedReward, ad_unit_id));
                self.emit(AdEvent::for_unit(hidden, ad_unit_id));
            }
            ShowReply::FailedToDisplay(message) => {
                let mut event = AdEvent::for_unit(failed, ad_unit_id);
                event.error_message = message;
                self.emit(event);
            }
            ShowReply::Silent => {}
        }
    }
}

#[async_trait::async_trait]
impl AdNetworkSdk for ScriptedSdk {
    async fn initialize(&self, sdk_key: &str) {
        self.init_call_count.fetch_add(1, Ordering::SeqCst);
        self.init_keys.lock().unwrap().push(sdk_key.to_string());
        let delay = *self.init_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn set_test_device_advertising_ids(&self, ids: &[String]) {
        *self.test_device_ids.lock().unwrap() = ids.to_vec();
    }

    fn load_rewarded_ad(&self, ad_unit_id: &str) {
        self.record("load_rewarded_ad", ad_unit_id);
        self.answer_load(AdKind::Rewarded, AdViewFormat::Banner, ad_unit_id);
    }

    fn load_interstitial(&self, ad_unit_id: &str) {
        self.record("load_interstitial", ad_unit_id);
        self.answer_load(AdKind::Interstitial, AdViewFormat::Banner, ad_unit_id);
    }

    fn load_ad_view(&self, ad_unit_id: &str, format: AdViewFormat) {
        self.record("load_ad_view", ad_unit_id);
        self.answer_load(AdKind::Banner, format, ad_unit_id);
    }

    fn create_banner(&self, ad_unit_id: &str, position: AdViewPosition) {
        self.record("create_banner", ad_unit_id);
        self.created(AdViewFormat::Banner, ad_unit_id, position);
    }

    fn create_mrec(&self, ad_unit_id: &str, position: AdViewPosition) {
        self.record("create_mrec", ad_unit_id);
        self.created(AdViewFormat::Mrec, ad_unit_id, position);
    }

    fn set_banner_placement(&self, ad_unit_id: &str, _placement: &str) {
        self.record("set_banner_placement", ad_unit_id);
    }

    fn set_mrec_placement(&self, ad_unit_id: &str, _placement: &str) {
        self.record("set_mrec_placement", ad_unit_id);
    }

    fn show_banner(&self, ad_unit_id: &str) {
        self.record("show_banner", ad_unit_id);
    }

    fn show_mrec(&self, ad_unit_id: &str) {
        self.record("show_mrec", ad_unit_id);
    }

    fn hide_banner(&self, ad_unit_id: &str) {
        self.record("hide_banner", ad_unit_id);
    }

    fn hide_mrec(&self, ad_unit_id: &str) {
        self.record("hide_mrec", ad_unit_id);
    }

    fn show_interstitial(&self, ad_unit_id: &str, _placement: &str) {
        self.record("show_interstitial", ad_unit_id);
        self.answer_show(AdKind::Interstitial, ad_unit_id);
    }

    fn show_rewarded_ad(&self, ad_unit_id: &str, _placement: &str) {
        self.record("show_rewarded_ad", ad_unit_id);
        self.answer_show(AdKind::Rewarded, ad_unit_id);
    }

    fn is_interstitial_ready(&self, _ad_unit_id: &str) -> bool {
        self.interstitial_ready.load(Ordering::SeqCst)
    }

    fn is_rewarded_ad_ready(&self, _ad_unit_id: &str) -> bool {
        self.rewarded_ready.load(Ordering::SeqCst)
    }

    fn sdk_name(&self) -> &'static str {
        "scripted"
    }
}

/// An adapter whose host is ready and whose SDK is already bound
pub fn ready_adapter(sdk: &Arc<ScriptedSdk>) -> AdLifecycleAdapter {
    adapter_with(sdk, AdapterOptions::default(), ReadySignal::fired())
}

/// An adapter with the SDK bound under the default name
pub fn adapter_with(
    sdk: &Arc<ScriptedSdk>,
    options: AdapterOptions,
    host_ready: ReadySignal,
) -> AdLifecycleAdapter {
    let bindings = Arc::new(SdkBindings::default());
    bindings.bind("applovin", sdk.clone());
    let adapter = AdLifecycleAdapter::new(options, host_ready, bindings);
    sdk.attach(adapter.event_bus());
    adapter
}

/// Initialize an adapter against the fixture configuration
pub async fn initialized_adapter(sdk: &Arc<ScriptedSdk>) -> AdLifecycleAdapter {
    let adapter = ready_adapter(sdk);
    adapter
        .init(&fixture_config())
        .await
        .expect("fixture init succeeds");
    adapter
}

/// Placements used across contract tests
///
/// `reward` and `bonus` share one rewarded ad unit.
pub fn fixture_config() -> AdsConfig {
    AdsConfig::new()
        .with_mediator("applovin", SDK_KEY)
        .with_placement(
            "reward",
            PlacementConfig::new(AdKind::Rewarded)
                .with_base(TargetConfig::for_unit(REWARD_UNIT))
                .with_reward("coins", 10),
        )
        .with_placement(
            "bonus",
            PlacementConfig::new(AdKind::Rewarded).with_base(TargetConfig::for_unit(REWARD_UNIT)),
        )
        .with_placement(
            "inter",
            PlacementConfig::new(AdKind::Interstitial)
                .with_base(TargetConfig::for_unit(INTER_UNIT)),
        )
        .with_placement(
            "banner",
            PlacementConfig::new(AdKind::Banner).with_base(TargetConfig::for_unit(BANNER_UNIT)),
        )
        .with_placement(
            "mrec",
            PlacementConfig::new(AdKind::Banner)
                .with_base(TargetConfig::for_unit(MREC_UNIT).with_format(AdViewFormat::Mrec)),
        )
}

/// Placement config by name from the fixture
pub fn placement(name: &str) -> PlacementConfig {
    fixture_config().placements[name].clone()
}

/// Let spawned tasks run to their next suspension point
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
