//! Effective per-target placement configuration
//!
//! Each field is looked up in the active target's sub-object, then in the
//! other known targets in [`Target::ALL`] order, then at placement level.
//! A missing field falls through to the next source or to a hard default;
//! resolution never fails.

use crate::config::{AdViewFormat, AdViewPosition, PlacementConfig, Target, TargetConfig};
use std::time::Duration;

/// Placement fields after target fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub ad_unit_id: Option<String>,
    pub format: AdViewFormat,
    pub position: AdViewPosition,
    pub load_timeout: Option<Duration>,
    pub show_timeout: Option<Duration>,
    pub mediator: Option<String>,
}

/// Resolve the effective configuration of a placement for a target
pub fn resolve(placement: &PlacementConfig, target: Target) -> EffectiveConfig {
    let sources: Vec<&TargetConfig> = placement
        .target(target)
        .into_iter()
        .chain(
            Target::ALL
                .iter()
                .filter(|other| **other != target)
                .filter_map(|other| placement.target(*other)),
        )
        .chain(std::iter::once(&placement.base))
        .collect();

    let ad_unit_id = first(&sources, |s| {
        s.ad_unit_id.as_ref().filter(|id| !id.is_empty()).cloned()
    });
    let format = first(&sources, |s| s.format).unwrap_or_default();
    let position = first(&sources, |s| s.position).unwrap_or_else(|| format.default_position());

    EffectiveConfig {
        ad_unit_id,
        format,
        position,
        load_timeout: first(&sources, |s| positive_ms(s.load_timeout_ms)),
        show_timeout: first(&sources, |s| positive_ms(s.show_timeout_ms)),
        mediator: first(&sources, |s| s.mediator.clone()),
    }
}

fn first<T>(sources: &[&TargetConfig], field: impl Fn(&TargetConfig) -> Option<T>) -> Option<T> {
    sources.iter().find_map(|source| field(source))
}

fn positive_ms(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdKind;

    #[test]
    fn active_target_wins() {
        let placement = PlacementConfig::new(AdKind::Rewarded)
            .with_target(Target::Cordova, TargetConfig::for_unit("cordova-unit"))
            .with_target(Target::Ios, TargetConfig::for_unit("ios-unit"));

        assert_eq!(
            resolve(&placement, Target::Ios).ad_unit_id.as_deref(),
            Some("ios-unit")
        );
        assert_eq!(
            resolve(&placement, Target::Cordova).ad_unit_id.as_deref(),
            Some("cordova-unit")
        );
        // android has no sub-object, first known target in order wins
        assert_eq!(
            resolve(&placement, Target::Android).ad_unit_id.as_deref(),
            Some("cordova-unit")
        );
    }

    #[test]
    fn falls_back_field_by_field_to_placement_level() {
        let placement = PlacementConfig::new(AdKind::Banner)
            .with_target(
                Target::Android,
                TargetConfig::for_unit("a-unit").with_load_timeout_ms(2500),
            )
            .with_base(
                TargetConfig::default()
                    .with_format(AdViewFormat::Mrec)
                    .with_show_timeout_ms(9000),
            );

        let effective = resolve(&placement, Target::Android);
        assert_eq!(effective.ad_unit_id.as_deref(), Some("a-unit"));
        assert_eq!(effective.format, AdViewFormat::Mrec);
        assert_eq!(effective.position, AdViewPosition::Centered);
        assert_eq!(effective.load_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(effective.show_timeout, Some(Duration::from_millis(9000)));
    }

    #[test]
    fn hard_defaults_when_nothing_is_set() {
        let effective = resolve(&PlacementConfig::new(AdKind::Banner), Target::Cordova);

        assert_eq!(effective.ad_unit_id, None);
        assert_eq!(effective.format, AdViewFormat::Banner);
        assert_eq!(effective.position, AdViewPosition::BottomCenter);
        assert_eq!(effective.load_timeout, None);
        assert_eq!(effective.show_timeout, None);
    }

    #[test]
    fn zero_timeouts_and_empty_units_fall_through() {
        let placement = PlacementConfig::new(AdKind::Interstitial)
            .with_target(
                Target::Cordova,
                TargetConfig {
                    ad_unit_id: Some(String::new()),
                    load_timeout_ms: Some(0),
                    ..TargetConfig::default()
                },
            )
            .with_base(TargetConfig::for_unit("base-unit").with_load_timeout_ms(700));

        let effective = resolve(&placement, Target::Cordova);
        assert_eq!(effective.ad_unit_id.as_deref(), Some("base-unit"));
        assert_eq!(effective.load_timeout, Some(Duration::from_millis(700)));
    }

    #[test]
    fn explicit_position_overrides_format_default() {
        let placement = PlacementConfig::new(AdKind::Banner).with_target(
            Target::Cordova,
            TargetConfig::for_unit("b")
                .with_format(AdViewFormat::Mrec)
                .with_position(AdViewPosition::TopCenter),
        );

        assert_eq!(
            resolve(&placement, Target::Cordova).position,
            AdViewPosition::TopCenter
        );
    }
}
