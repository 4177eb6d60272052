// # Ad Events
//
// The network reports every outcome on one process-wide stream of named
// events. Any listener may receive any event, so every consumer filters by
// ad unit identifier.
//
// ## Event names
//
// | Kind         | Events                                                        |
// |--------------|---------------------------------------------------------------|
// | rewarded     | Loaded, LoadFailed, ReceivedReward, FailedToDisplay, Hidden   |
// | interstitial | Loaded, LoadFailed, FailedToDisplay, Hidden                   |
// | banner       | BannerAdLoaded, BannerAdLoadFailed                            |
// | mrec         | MRecAdLoaded, MRecAdLoadFailed                                |

pub mod bus;

pub use bus::{EventBus, Subscription};

use crate::config::{AdKind, AdViewFormat};
use serde::Deserialize;
use std::str::FromStr;

/// Named events published by the network SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdEventKind {
    RewardedAdLoaded,
    RewardedAdLoadFailed,
    RewardedAdReceivedReward,
    RewardedAdFailedToDisplay,
    RewardedAdHidden,
    InterstitialLoaded,
    InterstitialLoadFailed,
    InterstitialFailedToDisplay,
    InterstitialHidden,
    BannerAdLoaded,
    BannerAdLoadFailed,
    MRecAdLoaded,
    MRecAdLoadFailed,
}

/// What an event means to a pending operation, independent of ad kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    Loaded,
    LoadFailed,
    RewardGranted,
    FailedToDisplay,
    Hidden,
}

impl AdEventKind {
    const ALL: [AdEventKind; 13] = [
        AdEventKind::RewardedAdLoaded,
        AdEventKind::RewardedAdLoadFailed,
        AdEventKind::RewardedAdReceivedReward,
        AdEventKind::RewardedAdFailedToDisplay,
        AdEventKind::RewardedAdHidden,
        AdEventKind::InterstitialLoaded,
        AdEventKind::InterstitialLoadFailed,
        AdEventKind::InterstitialFailedToDisplay,
        AdEventKind::InterstitialHidden,
        AdEventKind::BannerAdLoaded,
        AdEventKind::BannerAdLoadFailed,
        AdEventKind::MRecAdLoaded,
        AdEventKind::MRecAdLoadFailed,
    ];

    /// Event name as emitted by the native bridge
    pub fn name(&self) -> &'static str {
        match self {
            AdEventKind::RewardedAdLoaded => "OnRewardedAdLoadedEvent",
            AdEventKind::RewardedAdLoadFailed => "OnRewardedAdLoadFailedEvent",
            AdEventKind::RewardedAdReceivedReward => "OnRewardedAdReceivedRewardEvent",
            AdEventKind::RewardedAdFailedToDisplay => "OnRewardedAdFailedToDisplayEvent",
            AdEventKind::RewardedAdHidden => "OnRewardedAdHiddenEvent",
            AdEventKind::InterstitialLoaded => "OnInterstitialLoadedEvent",
            AdEventKind::InterstitialLoadFailed => "OnInterstitialLoadFailedEvent",
            AdEventKind::InterstitialFailedToDisplay => "OnInterstitialAdFailedToDisplayEvent",
            AdEventKind::InterstitialHidden => "OnInterstitialHiddenEvent",
            AdEventKind::BannerAdLoaded => "OnBannerAdLoadedEvent",
            AdEventKind::BannerAdLoadFailed => "OnBannerAdLoadFailedEvent",
            AdEventKind::MRecAdLoaded => "OnMRecAdLoadedEvent",
            AdEventKind::MRecAdLoadFailed => "OnMRecAdLoadFailedEvent",
        }
    }

    pub fn role(&self) -> EventRole {
        match self {
            AdEventKind::RewardedAdLoaded
            | AdEventKind::InterstitialLoaded
            | AdEventKind::BannerAdLoaded
            | AdEventKind::MRecAdLoaded => EventRole::Loaded,
            AdEventKind::RewardedAdLoadFailed
            | AdEventKind::InterstitialLoadFailed
            | AdEventKind::BannerAdLoadFailed
            | AdEventKind::MRecAdLoadFailed => EventRole::LoadFailed,
            AdEventKind::RewardedAdReceivedReward => EventRole::RewardGranted,
            AdEventKind::RewardedAdFailedToDisplay | AdEventKind::InterstitialFailedToDisplay => {
                EventRole::FailedToDisplay
            }
            AdEventKind::RewardedAdHidden | AdEventKind::InterstitialHidden => EventRole::Hidden,
        }
    }

    /// The loaded/failed pair a load of `kind` waits on
    pub fn load_pair(kind: AdKind, format: AdViewFormat) -> Option<[AdEventKind; 2]> {
        match (kind, format) {
            (AdKind::Rewarded, _) => Some([
                AdEventKind::RewardedAdLoaded,
                AdEventKind::RewardedAdLoadFailed,
            ]),
            (AdKind::Interstitial, _) => Some([
                AdEventKind::InterstitialLoaded,
                AdEventKind::InterstitialLoadFailed,
            ]),
            (AdKind::Banner, AdViewFormat::Mrec) => {
                Some([AdEventKind::MRecAdLoaded, AdEventKind::MRecAdLoadFailed])
            }
            (AdKind::Banner, AdViewFormat::Banner) => {
                Some([AdEventKind::BannerAdLoaded, AdEventKind::BannerAdLoadFailed])
            }
            (AdKind::Unsupported, _) => None,
        }
    }

    /// Terminal events a show of a one-shot `kind` waits on
    pub fn show_set(kind: AdKind) -> &'static [AdEventKind] {
        match kind {
            AdKind::Rewarded => &[
                AdEventKind::RewardedAdReceivedReward,
                AdEventKind::RewardedAdFailedToDisplay,
                AdEventKind::RewardedAdHidden,
            ],
            AdKind::Interstitial => &[
                AdEventKind::InterstitialFailedToDisplay,
                AdEventKind::InterstitialHidden,
            ],
            AdKind::Banner | AdKind::Unsupported => &[],
        }
    }
}

impl FromStr for AdEventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdEventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| crate::Error::UnknownEvent(s.to_string()))
    }
}

impl std::fmt::Display for AdEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One event on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdEvent {
    pub kind: AdEventKind,
    /// Ad unit the event concerns; `None` for kind-wide broadcasts
    pub ad_unit_id: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgePayload {
    #[serde(default)]
    ad_unit_id: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl AdEvent {
    /// Kind-wide event carrying no ad unit
    pub fn new(kind: AdEventKind) -> Self {
        Self {
            kind,
            ad_unit_id: None,
            error_message: None,
        }
    }

    /// Event scoped to one ad unit
    pub fn for_unit(kind: AdEventKind, ad_unit_id: impl Into<String>) -> Self {
        Self {
            ad_unit_id: Some(ad_unit_id.into()),
            ..Self::new(kind)
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Build an event from a native event name and its JSON payload
    pub fn from_bridge(name: &str, payload: &serde_json::Value) -> crate::Result<Self> {
        let kind = name.parse::<AdEventKind>()?;
        let payload = if payload.is_null() {
            BridgePayload::default()
        } else {
            BridgePayload::deserialize(payload)?
        };
        Ok(Self {
            kind,
            ad_unit_id: payload.ad_unit_id.filter(|id| !id.is_empty()),
            error_message: payload.error_message,
        })
    }

    /// Carries exactly this ad unit
    pub fn is_for(&self, ad_unit_id: &str) -> bool {
        self.ad_unit_id.as_deref() == Some(ad_unit_id)
    }

    /// Carries this ad unit or no ad unit at all
    pub fn concerns(&self, ad_unit_id: &str) -> bool {
        self.ad_unit_id.as_deref().is_none_or(|id| id == ad_unit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in AdEventKind::ALL {
            assert_eq!(kind.name().parse::<AdEventKind>().unwrap(), kind);
        }
        assert!(matches!(
            "OnSomethingElse".parse::<AdEventKind>(),
            Err(crate::Error::UnknownEvent(_))
        ));
    }

    #[test]
    fn decodes_bridge_payloads() {
        let event = AdEvent::from_bridge(
            "OnRewardedAdFailedToDisplayEvent",
            &serde_json::json!({ "adUnitId": "u1", "errorMessage": "no activity", "extra": 3 }),
        )
        .unwrap();
        assert_eq!(event.kind, AdEventKind::RewardedAdFailedToDisplay);
        assert!(event.is_for("u1"));
        assert_eq!(event.error_message.as_deref(), Some("no activity"));

        let unscoped =
            AdEvent::from_bridge("OnInterstitialLoadFailedEvent", &serde_json::Value::Null)
                .unwrap();
        assert_eq!(unscoped.ad_unit_id, None);
        assert!(unscoped.concerns("anything"));
        assert!(!unscoped.is_for("anything"));
    }

    #[test]
    fn scoped_events_only_concern_their_unit() {
        let event = AdEvent::for_unit(AdEventKind::InterstitialHidden, "a");
        assert!(event.concerns("a"));
        assert!(!event.concerns("b"));
    }

    #[test]
    fn event_sets_follow_kind_and_format() {
        assert_eq!(
            AdEventKind::load_pair(AdKind::Banner, AdViewFormat::Mrec),
            Some([AdEventKind::MRecAdLoaded, AdEventKind::MRecAdLoadFailed])
        );
        assert_eq!(AdEventKind::load_pair(AdKind::Unsupported, AdViewFormat::Banner), None);
        assert_eq!(AdEventKind::show_set(AdKind::Rewarded).len(), 3);
        assert!(AdEventKind::show_set(AdKind::Banner).is_empty());
        assert_eq!(
            AdEventKind::RewardedAdReceivedReward.role(),
            EventRole::RewardGranted
        );
    }
}
