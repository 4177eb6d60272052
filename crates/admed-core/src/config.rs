//! Configuration types for the ad lifecycle adapter
//!
//! [`AdsConfig`] is the host-owned document handed to `init`; a
//! [`PlacementConfig`] is handed to every `load`/`show`. [`AdapterOptions`]
//! carries the process-level knobs that do not come from that document.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default budget for locating the network SDK
pub const DEFAULT_SDK_WAIT: Duration = Duration::from_secs(15);

/// Default interval between SDK availability checks
pub const DEFAULT_SDK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default load and show timeout when neither defaults nor placement override it
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Default mediator name used to look up the SDK credential
pub const DEFAULT_MEDIATOR: &str = "applovin";

/// Top-level ads configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdsConfig {
    /// Whether ads are enabled at all for this host
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Per-mediator credentials, keyed by mediator name
    #[serde(default)]
    pub mediators: HashMap<String, MediatorConfig>,

    /// Process-wide defaults
    #[serde(default)]
    pub defaults: AdDefaults,

    /// Placements, keyed by placement name
    #[serde(default)]
    pub placements: BTreeMap<String, PlacementConfig>,
}

fn default_enabled() -> bool {
    true
}

impl AdsConfig {
    /// Create an empty, enabled configuration
    pub fn new() -> Self {
        Self {
            enabled: true,
            mediators: HashMap::new(),
            defaults: AdDefaults::default(),
            placements: BTreeMap::new(),
        }
    }

    /// Parse a configuration document
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Add a mediator credential
    pub fn with_mediator(mut self, name: impl Into<String>, sdk_key: impl Into<String>) -> Self {
        self.mediators.insert(
            name.into(),
            MediatorConfig {
                sdk_key: Some(sdk_key.into()),
            },
        );
        self
    }

    /// Add a placement
    pub fn with_placement(mut self, name: impl Into<String>, placement: PlacementConfig) -> Self {
        self.placements.insert(name.into(), placement);
        self
    }

    /// Credential for the named mediator, if configured and non-empty
    pub fn sdk_key(&self, mediator: &str) -> Option<&str> {
        self.mediators
            .get(mediator)
            .and_then(|m| m.sdk_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.defaults.validate()?;

        for (name, placement) in &self.placements {
            if placement.kind == AdKind::Unsupported {
                continue;
            }
            let has_unit = placement
                .sources()
                .any(|source| source.ad_unit_id.as_deref().is_some_and(|id| !id.is_empty()));
            if !has_unit {
                return Err(crate::Error::config(format!(
                    "placement '{}' has no adUnitId",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Credentials for one mediator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediatorConfig {
    /// SDK key handed to the network's initialize call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_key: Option<String>,
}

/// Process-wide defaults applied at bootstrap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDefaults {
    /// Default load timeout for placements without their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_timeout_ms: Option<u64>,

    /// Default show timeout for placements without their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_timeout_ms: Option<u64>,

    /// Load every placement right after init
    #[serde(default)]
    pub preload_on_start: bool,
}

impl AdDefaults {
    /// Validate the defaults
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.load_timeout_ms == Some(0) {
            return Err(crate::Error::config("defaults.loadTimeoutMs must be > 0"));
        }
        if self.show_timeout_ms == Some(0) {
            return Err(crate::Error::config("defaults.showTimeoutMs must be > 0"));
        }
        Ok(())
    }
}

/// Kind of a placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdKind {
    /// Persistent banner or rectangle surface
    Banner,
    /// One-shot full-screen ad
    Interstitial,
    /// One-shot full-screen ad that can grant a reward
    Rewarded,
    /// Any kind this adapter does not serve
    #[default]
    #[serde(other)]
    Unsupported,
}

impl AdKind {
    /// Configuration literal for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AdKind::Banner => "banner",
            AdKind::Interstitial => "interstitial",
            AdKind::Rewarded => "rewarded",
            AdKind::Unsupported => "unsupported",
        }
    }

    /// Whether showing consumes the loaded content
    pub fn is_one_shot(&self) -> bool {
        matches!(self, AdKind::Interstitial | AdKind::Rewarded)
    }
}

impl FromStr for AdKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "banner" => AdKind::Banner,
            "interstitial" => AdKind::Interstitial,
            "rewarded" => AdKind::Rewarded,
            _ => AdKind::Unsupported,
        })
    }
}

impl std::fmt::Display for AdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format of a persistent ad surface
///
/// Only the literal `mrec` selects the rectangle; every other value is a banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AdViewFormat {
    #[default]
    Banner,
    Mrec,
}

impl From<String> for AdViewFormat {
    fn from(value: String) -> Self {
        AdViewFormat::from(value.as_str())
    }
}

impl From<&str> for AdViewFormat {
    fn from(value: &str) -> Self {
        if value == "mrec" {
            AdViewFormat::Mrec
        } else {
            AdViewFormat::Banner
        }
    }
}

impl AdViewFormat {
    /// Position used when none is configured
    pub fn default_position(&self) -> AdViewPosition {
        match self {
            AdViewFormat::Mrec => AdViewPosition::Centered,
            AdViewFormat::Banner => AdViewPosition::BottomCenter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdViewFormat::Banner => "banner",
            AdViewFormat::Mrec => "mrec",
        }
    }
}

/// Screen anchor of a persistent ad surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdViewPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Centered,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AdViewPosition {
    /// Literal understood by the network SDK
    pub fn as_str(&self) -> &'static str {
        match self {
            AdViewPosition::TopLeft => "top_left",
            AdViewPosition::TopCenter => "top_center",
            AdViewPosition::TopRight => "top_right",
            AdViewPosition::CenterLeft => "center_left",
            AdViewPosition::Centered => "centered",
            AdViewPosition::CenterRight => "center_right",
            AdViewPosition::BottomLeft => "bottom_left",
            AdViewPosition::BottomCenter => "bottom_center",
            AdViewPosition::BottomRight => "bottom_right",
        }
    }
}

/// Active runtime target, selecting a per-target sub-object of a placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Generic non-native fallback
    #[default]
    Cordova,
    Android,
    Ios,
}

impl Target {
    /// Known targets in fallback order
    pub const ALL: [Target; 3] = [Target::Cordova, Target::Android, Target::Ios];

    /// Key of this target's sub-object in a placement
    pub fn key(&self) -> &'static str {
        match self {
            Target::Cordova => "cordova",
            Target::Android => "android",
            Target::Ios => "ios",
        }
    }
}

impl FromStr for Target {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cordova" => Ok(Target::Cordova),
            "android" => Ok(Target::Android),
            "ios" => Ok(Target::Ios),
            other => Err(crate::Error::config(format!("Unknown target: {}", other))),
        }
    }
}

/// Fields a placement may set per target or at placement level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    /// Network ad unit identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_unit_id: Option<String>,

    /// Surface format for banner placements
    #[serde(default, alias = "adViewFormat", skip_serializing_if = "Option::is_none")]
    pub format: Option<AdViewFormat>,

    /// Surface position for banner placements
    #[serde(
        default,
        alias = "adViewPosition",
        alias = "bannerPosition",
        alias = "mrecPosition",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<AdViewPosition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_timeout_ms: Option<u64>,

    /// Mediator serving this placement; absent means any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediator: Option<String>,
}

impl TargetConfig {
    /// Target config naming only an ad unit
    pub fn for_unit(ad_unit_id: impl Into<String>) -> Self {
        Self {
            ad_unit_id: Some(ad_unit_id.into()),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: AdViewFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_position(mut self, position: AdViewPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_load_timeout_ms(mut self, ms: u64) -> Self {
        self.load_timeout_ms = Some(ms);
        self
    }

    pub fn with_show_timeout_ms(mut self, ms: u64) -> Self {
        self.show_timeout_ms = Some(ms);
        self
    }
}

/// Configuration of one placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    /// Placement kind
    #[serde(rename = "type", default)]
    pub kind: AdKind,

    /// Reward type reported on a granted reward
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<String>,

    /// Reward amount reported on a granted reward
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_amount: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cordova: Option<TargetConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<TargetConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<TargetConfig>,

    /// Placement-level fields, the last fallback
    #[serde(flatten)]
    pub base: TargetConfig,
}

impl PlacementConfig {
    /// Create a placement of the given kind with no fields set
    pub fn new(kind: AdKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Set the sub-object for a target
    pub fn with_target(mut self, target: Target, config: TargetConfig) -> Self {
        match target {
            Target::Cordova => self.cordova = Some(config),
            Target::Android => self.android = Some(config),
            Target::Ios => self.ios = Some(config),
        }
        self
    }

    /// Replace the placement-level fields
    pub fn with_base(mut self, base: TargetConfig) -> Self {
        self.base = base;
        self
    }

    pub fn with_reward(mut self, reward_type: impl Into<String>, amount: u64) -> Self {
        self.reward_type = Some(reward_type.into());
        self.reward_amount = Some(amount);
        self
    }

    /// Sub-object for a target, if present
    pub fn target(&self, target: Target) -> Option<&TargetConfig> {
        match target {
            Target::Cordova => self.cordova.as_ref(),
            Target::Android => self.android.as_ref(),
            Target::Ios => self.ios.as_ref(),
        }
    }

    /// Every field source, in declaration order, placement level last
    pub(crate) fn sources(&self) -> impl Iterator<Item = &TargetConfig> {
        Target::ALL
            .iter()
            .filter_map(|target| self.target(*target))
            .chain(std::iter::once(&self.base))
    }
}

/// Process-level adapter options
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Name under which the credential is looked up and the adapter registers
    pub mediator_name: String,

    /// Active runtime target
    pub target: Target,

    /// Overall budget for locating the network SDK
    pub sdk_wait: Duration,

    /// Interval between SDK availability checks
    pub sdk_poll_interval: Duration,

    /// Load timeout until bootstrap applies `defaults.loadTimeoutMs`
    pub load_timeout: Duration,

    /// Show timeout until bootstrap applies `defaults.showTimeoutMs`
    pub show_timeout: Duration,

    /// Advertising ids registered as test devices after initialization
    pub test_device_ids: Vec<String>,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            mediator_name: DEFAULT_MEDIATOR.to_string(),
            target: Target::default(),
            sdk_wait: DEFAULT_SDK_WAIT,
            sdk_poll_interval: DEFAULT_SDK_POLL_INTERVAL,
            load_timeout: DEFAULT_OPERATION_TIMEOUT,
            show_timeout: DEFAULT_OPERATION_TIMEOUT,
            test_device_ids: Vec::new(),
        }
    }
}

impl AdapterOptions {
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_mediator_name(mut self, name: impl Into<String>) -> Self {
        self.mediator_name = name.into();
        self
    }

    pub fn with_sdk_wait(mut self, wait: Duration, poll_interval: Duration) -> Self {
        self.sdk_wait = wait;
        self.sdk_poll_interval = poll_interval;
        self
    }

    pub fn with_test_device_ids(mut self, ids: Vec<String>) -> Self {
        self.test_device_ids = ids;
        self
    }
}
