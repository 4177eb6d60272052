//! Load coordination
//!
//! At most one fetch is in flight per ad unit. Callers that arrive while one
//! is pending join it instead of issuing another SDK call, since a single ad
//! unit may back several placements. Each fetch runs as its own task, so it
//! settles even when every caller has given up waiting, and the entry is
//! removed as soon as it does, whatever the outcome.

use super::{AdLifecycleAdapter, Session};
use crate::config::{AdKind, PlacementConfig};
use crate::error::{Error, Result};
use crate::events::{AdEventKind, EventRole};
use crate::resolver::{EffectiveConfig, resolve};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

type SharedLoad = Shared<BoxFuture<'static, Result<()>>>;

/// Pending fetches keyed by ad unit identifier
#[derive(Default)]
pub(crate) struct InFlightLoads {
    pending: Mutex<HashMap<String, SharedLoad>>,
}

impl InFlightLoads {
    /// Join the fetch pending for `ad_unit_id`, or start one with `start`
    ///
    /// Returns the shared outcome and whether an existing fetch was joined.
    fn join_or_start(
        &self,
        ad_unit_id: &str,
        start: impl FnOnce() -> SharedLoad,
    ) -> (SharedLoad, bool) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(existing) = pending.get(ad_unit_id) {
            return (existing.clone(), true);
        }
        let fetch = start();
        pending.insert(ad_unit_id.to_string(), fetch.clone());
        (fetch, false)
    }

    fn settle(&self, ad_unit_id: &str) {
        let mut pending = self.pending.lock().unwrap();
        pending.remove(ad_unit_id);
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

struct LoadRequest {
    kind: AdKind,
    placement: String,
    ad_unit_id: String,
    effective: EffectiveConfig,
    config: PlacementConfig,
}

impl AdLifecycleAdapter {
    /// Load content for a placement
    ///
    /// Waits for a bootstrap in progress. Resolves at once, without any SDK
    /// call, when the placement already holds unconsumed content. Unsupported
    /// kinds are a silent no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`]: bootstrap never succeeded
    /// - [`Error::AdUnitIdMissing`]: the placement names no ad unit
    /// - [`Error::LoadFailed`]: the network reported a failure
    /// - [`Error::LoadTimeout`]: no outcome arrived in time
    pub async fn load(&self, kind: AdKind, placement: &str, config: &PlacementConfig) -> Result<()> {
        if kind == AdKind::Unsupported {
            debug!(placement, "ignoring load for unsupported ad kind");
            return Ok(());
        }

        let session = self.session().await?;

        let effective = resolve(config, self.inner.options.target);
        let ad_unit_id = effective
            .ad_unit_id
            .clone()
            .ok_or_else(|| Error::AdUnitIdMissing {
                placement: placement.to_string(),
            })?;

        if self.inner.readiness.is_ready(placement) {
            debug!(placement, "placement already loaded");
            return Ok(());
        }

        let (fetch, joined) = self.inner.loads.join_or_start(&ad_unit_id, || {
            let request = LoadRequest {
                kind,
                placement: placement.to_string(),
                ad_unit_id: ad_unit_id.clone(),
                effective,
                config: config.clone(),
            };
            let task = tokio::spawn(self.clone().fetch(session, request));
            async move {
                task.await
                    .unwrap_or_else(|e| Err(Error::Other(format!("load task failed: {}", e))))
            }
            .boxed()
            .shared()
        });

        if joined {
            debug!(placement, ad_unit_id = %ad_unit_id, "joining load in flight");
        }

        let outcome = fetch.await;
        if joined && outcome.is_ok() {
            self.inner.readiness.mark_ready(placement);
        }
        outcome
    }

    async fn fetch(self, session: Arc<Session>, request: LoadRequest) -> Result<()> {
        let timeout = request.effective.load_timeout.unwrap_or(session.load_timeout);
        let outcome = self.race_load(&session, &request, timeout).await;

        self.inner.loads.settle(&request.ad_unit_id);

        match &outcome {
            Ok(()) => info!(
                placement = %request.placement,
                ad_unit_id = %request.ad_unit_id,
                kind = %request.kind,
                "ad loaded"
            ),
            Err(e) => warn!(
                placement = %request.placement,
                ad_unit_id = %request.ad_unit_id,
                kind = %request.kind,
                "ad load failed: {}", e
            ),
        }

        outcome
    }

    /// Subscribe, arm the timer, issue the SDK call, then take the first signal
    async fn race_load(&self, session: &Session, request: &LoadRequest, timeout: Duration) -> Result<()> {
        let LoadRequest {
            kind,
            placement,
            ad_unit_id,
            effective,
            config,
        } = request;

        let Some(pair) = AdEventKind::load_pair(*kind, effective.format) else {
            return Ok(());
        };
        let mut events = self.inner.bus.subscribe(ad_unit_id.as_str(), &pair);
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let sdk = session.sdk.as_ref();
        match kind {
            AdKind::Rewarded => sdk.load_rewarded_ad(ad_unit_id),
            AdKind::Interstitial => sdk.load_interstitial(ad_unit_id),
            AdKind::Banner => {
                // a new surface fetches its first content on creation
                if !self.ensure_view(sdk, ad_unit_id, effective.format, placement, config) {
                    sdk.load_ad_view(ad_unit_id, effective.format);
                }
            }
            AdKind::Unsupported => {}
        }

        loop {
            let event = tokio::select! {
                _ = &mut deadline => {
                    return Err(Error::LoadTimeout {
                        ad_unit_id: ad_unit_id.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                event = events.next() => event,
            };

            let Some(event) = event else {
                return Err(Error::load_failed(
                    ad_unit_id.as_str(),
                    Some("ad event bus closed".to_string()),
                ));
            };

            match event.kind.role() {
                // unscoped "loaded" events cannot be attributed to this unit
                EventRole::Loaded if event.is_for(ad_unit_id) => {
                    self.inner.readiness.mark_ready(placement);
                    return Ok(());
                }
                EventRole::LoadFailed => {
                    return Err(Error::load_failed(ad_unit_id.as_str(), event.error_message));
                }
                _ => {}
            }
        }
    }
}
