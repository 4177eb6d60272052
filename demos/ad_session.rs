// # ad_session - simulated end-to-end ad session
//
// Embeds the adapter the way a host app would, against an in-process
// network SDK that answers every call after a short delay:
// 1. The "native layer" binds the SDK and fires host readiness
// 2. The adapter bootstraps, then loads every placement
// 3. Each placement is shown and its outcome printed as JSON
//
// ## Configuration
//
// All configuration is done via environment variables:
// - `ADMED_CONFIG_PATH`: Ads configuration document (default: built-in sample)
// - `ADMED_TARGET`: Active runtime target: cordova, android, ios (default: cordova)
// - `ADMED_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export ADMED_CONFIG_PATH=demos/ads.json
// export ADMED_TARGET=android
// ad_session
// ```

use admed_core::{
    AdEvent, AdEventKind, AdKind, AdLifecycleAdapter, AdNetworkSdk, AdViewFormat, AdViewPosition,
    AdapterOptions, AdsConfig, EventBus, MediatorRegistry, ReadySignal, SdkBindings, Target,
};
use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const SAMPLE_CONFIG: &str = include_str!("ads.json");

/// How long the simulated network takes to answer
const NETWORK_LATENCY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
enum SessionExitCode {
    Completed = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SessionExitCode> for ExitCode {
    fn from(code: SessionExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Settings read from the environment
struct Settings {
    config_path: Option<String>,
    target: Target,
    log_level: String,
}

impl Settings {
    fn from_env() -> Result<Self> {
        let target = match env::var("ADMED_TARGET") {
            Ok(raw) => raw.parse::<Target>()?,
            Err(_) => Target::default(),
        };
        Ok(Self {
            config_path: env::var("ADMED_CONFIG_PATH").ok(),
            target,
            log_level: env::var("ADMED_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    fn load_config(&self) -> Result<AdsConfig> {
        let config = match &self.config_path {
            Some(path) => AdsConfig::from_path(path)
                .with_context(|| format!("loading ads configuration from {}", path))?,
            None => AdsConfig::from_json_str(SAMPLE_CONFIG).context("parsing sample configuration")?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Network SDK double answering on the adapter's event bus
struct SimulatedSdk {
    bus: OnceLock<EventBus>,
}

impl SimulatedSdk {
    fn new() -> Self {
        Self {
            bus: OnceLock::new(),
        }
    }

    fn attach(&self, bus: &EventBus) {
        let _ = self.bus.set(bus.clone());
    }

    /// Publish `events` in order after the simulated latency
    fn answer(&self, events: Vec<AdEvent>) {
        let Some(bus) = self.bus.get().cloned() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(NETWORK_LATENCY).await;
            for event in events {
                bus.publish(event);
            }
        });
    }

    /// Surfaces load on creation and on every later load request
    fn answer_view(&self, ad_unit_id: &str, format: AdViewFormat) {
        let kind = match format {
            AdViewFormat::Mrec => AdEventKind::MRecAdLoaded,
            AdViewFormat::Banner => AdEventKind::BannerAdLoaded,
        };
        self.answer(vec![AdEvent::for_unit(kind, ad_unit_id)]);
    }
}

#[async_trait::async_trait]
impl AdNetworkSdk for SimulatedSdk {
    async fn initialize(&self, sdk_key: &str) {
        info!(sdk_key, "simulated SDK initializing");
        tokio::time::sleep(NETWORK_LATENCY).await;
    }

    fn set_test_device_advertising_ids(&self, ids: &[String]) {
        info!(count = ids.len(), "test devices registered");
    }

    fn load_rewarded_ad(&self, ad_unit_id: &str) {
        self.answer(vec![AdEvent::for_unit(AdEventKind::RewardedAdLoaded, ad_unit_id)]);
    }

    fn load_interstitial(&self, ad_unit_id: &str) {
        self.answer(vec![AdEvent::for_unit(AdEventKind::InterstitialLoaded, ad_unit_id)]);
    }

    fn load_ad_view(&self, ad_unit_id: &str, format: AdViewFormat) {
        self.answer_view(ad_unit_id, format);
    }

    fn create_banner(&self, ad_unit_id: &str, position: AdViewPosition) {
        info!(ad_unit_id, position = position.as_str(), "banner surface created");
        self.answer_view(ad_unit_id, AdViewFormat::Banner);
    }

    fn create_mrec(&self, ad_unit_id: &str, position: AdViewPosition) {
        info!(ad_unit_id, position = position.as_str(), "mrec surface created");
        self.answer_view(ad_unit_id, AdViewFormat::Mrec);
    }

    fn set_banner_placement(&self, _ad_unit_id: &str, _placement: &str) {}

    fn set_mrec_placement(&self, _ad_unit_id: &str, _placement: &str) {}

    fn show_banner(&self, ad_unit_id: &str) {
        info!(ad_unit_id, "banner visible");
    }

    fn show_mrec(&self, ad_unit_id: &str) {
        info!(ad_unit_id, "mrec visible");
    }

    fn hide_banner(&self, ad_unit_id: &str) {
        info!(ad_unit_id, "banner hidden");
    }

    fn hide_mrec(&self, ad_unit_id: &str) {
        info!(ad_unit_id, "mrec hidden");
    }

    fn show_interstitial(&self, ad_unit_id: &str, _placement: &str) {
        self.answer(vec![AdEvent::for_unit(AdEventKind::InterstitialHidden, ad_unit_id)]);
    }

    fn show_rewarded_ad(&self, ad_unit_id: &str, _placement: &str) {
        self.answer(vec![
            AdEvent::for_unit(AdEventKind::RewardedAdReceivedReward, ad_unit_id),
            AdEvent::for_unit(AdEventKind::RewardedAdHidden, ad_unit_id),
        ]);
    }

    fn is_interstitial_ready(&self, _ad_unit_id: &str) -> bool {
        false
    }

    fn is_rewarded_ad_ready(&self, _ad_unit_id: &str) -> bool {
        false
    }

    fn sdk_name(&self) -> &'static str {
        "simulated"
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SessionExitCode::ConfigError.into();
        }
    };

    let log_level = match settings.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SessionExitCode::ConfigError.into();
    }

    let config = match settings.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return SessionExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SessionExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_session(settings.target, config).await {
            Ok(()) => SessionExitCode::Completed,
            Err(e) => {
                error!("Session error: {:#}", e);
                SessionExitCode::RuntimeError
            }
        }
    })
    .into()
}

async fn run_session(target: Target, config: AdsConfig) -> Result<()> {
    if !config.enabled {
        warn!("ads disabled by configuration, nothing to do");
        return Ok(());
    }

    let bindings = Arc::new(SdkBindings::default());
    let host_ready = ReadySignal::new();
    let options = AdapterOptions::default().with_target(target);
    let adapter = AdLifecycleAdapter::new(options, host_ready.clone(), bindings.clone());

    let registry = MediatorRegistry::new();
    adapter.register(&registry);
    info!(mediators = ?registry.list(), target = target.key(), "adapter registered");

    // the native layer comes up a little later and exposes the SDK
    let sdk = Arc::new(SimulatedSdk::new());
    sdk.attach(adapter.event_bus());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        bindings.bind("AppLovinMAX", sdk);
        host_ready.fire();
    });

    adapter.init(&config).await?;

    if config.defaults.preload_on_start {
        for (placement, result) in adapter.preload(&config).await {
            if let Err(e) = result {
                warn!(placement = %placement, code = e.code(), "preload failed: {}", e);
            }
        }
    }

    for (name, placement) in &config.placements {
        if let Err(e) = adapter.load(placement.kind, name, placement).await {
            warn!(placement = %name, code = e.code(), "load failed: {}", e);
            continue;
        }

        let outcome = adapter.show(placement.kind, name, placement).await;
        println!("{} {}", name, serde_json::to_string(&outcome)?);

        if placement.kind == AdKind::Banner {
            adapter.hide_view(placement.kind, placement);
        }
    }

    info!("ad session finished");
    Ok(())
}
