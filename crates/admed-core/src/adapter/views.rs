//! Persistent ad surfaces
//!
//! Banner and rectangle content is fetched into a surface, so the surface
//! must exist before any load or show touches its ad unit. Each surface is
//! created at most once per process.

use super::AdLifecycleAdapter;
use crate::config::{AdKind, AdViewFormat, PlacementConfig};
use crate::resolver::resolve;
use crate::traits::AdNetworkSdk;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, info};

/// Ad units that already have a surface
#[derive(Debug, Default)]
pub(crate) struct ViewSet {
    created: Mutex<HashSet<String>>,
}

impl ViewSet {
    pub(crate) fn contains(&self, ad_unit_id: &str) -> bool {
        self.created.lock().unwrap().contains(ad_unit_id)
    }

    /// Record `ad_unit_id`; false when another caller already did
    fn claim(&self, ad_unit_id: &str) -> bool {
        self.created.lock().unwrap().insert(ad_unit_id.to_string())
    }
}

impl AdLifecycleAdapter {
    /// Create the surface for `ad_unit_id` unless it already exists
    ///
    /// Binds the placement name to the new surface. Creating a surface also
    /// starts its first load. Returns whether a surface was created.
    pub(crate) fn ensure_view(
        &self,
        sdk: &dyn AdNetworkSdk,
        ad_unit_id: &str,
        format: AdViewFormat,
        placement: &str,
        config: &PlacementConfig,
    ) -> bool {
        // claimed first; no lock is held while the SDK runs
        if !self.inner.views.claim(ad_unit_id) {
            return false;
        }

        let position = resolve(config, self.inner.options.target).position;
        match format {
            AdViewFormat::Mrec => {
                sdk.create_mrec(ad_unit_id, position);
                sdk.set_mrec_placement(ad_unit_id, placement);
            }
            AdViewFormat::Banner => {
                sdk.create_banner(ad_unit_id, position);
                sdk.set_banner_placement(ad_unit_id, placement);
            }
        }

        info!(
            placement,
            ad_unit_id,
            format = format.as_str(),
            position = position.as_str(),
            "ad view created"
        );
        true
    }

    /// Hide the persistent surface of a banner placement
    ///
    /// Never creates a surface. Returns whether a hide call was issued.
    pub fn hide_view(&self, kind: AdKind, config: &PlacementConfig) -> bool {
        if kind != AdKind::Banner {
            return false;
        }
        let Some(session) = self.ready_session() else {
            return false;
        };

        let effective = resolve(config, self.inner.options.target);
        let Some(ad_unit_id) = effective.ad_unit_id else {
            return false;
        };
        if !self.inner.views.contains(&ad_unit_id) {
            debug!(ad_unit_id = %ad_unit_id, "no ad view to hide");
            return false;
        }

        match effective.format {
            AdViewFormat::Mrec => session.sdk.hide_mrec(&ad_unit_id),
            AdViewFormat::Banner => session.sdk.hide_banner(&ad_unit_id),
        }
        true
    }
}
