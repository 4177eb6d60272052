//! Show coordination
//!
//! Every show settles exactly one [`ShowOutcome`]; nothing is raised. For
//! one-shot kinds the first terminal event or the timer wins, and returning
//! drops the subscription and the timer on every path, so late events for
//! this invocation go nowhere.

use super::{AdLifecycleAdapter, Session};
use crate::config::{AdKind, AdViewFormat, PlacementConfig};
use crate::events::{AdEventKind, EventRole};
use crate::resolver::{EffectiveConfig, resolve};
use crate::traits::ShowOutcome;
use tracing::{debug, info};

impl AdLifecycleAdapter {
    /// Show a placement
    ///
    /// Settles `NOT_READY` at once when bootstrap has not completed, the
    /// placement names no ad unit, or no content is ready.
    pub async fn show(&self, kind: AdKind, placement: &str, config: &PlacementConfig) -> ShowOutcome {
        let Some(session) = self.ready_session() else {
            debug!(placement, "show before init");
            return ShowOutcome::not_ready();
        };

        let effective = resolve(config, self.inner.options.target);
        let Some(ad_unit_id) = effective.ad_unit_id.clone() else {
            debug!(placement, "show without ad unit id");
            return ShowOutcome::not_ready();
        };

        let outcome = match kind {
            AdKind::Banner => self.show_view(&session, placement, &ad_unit_id, effective.format, config),
            AdKind::Interstitial | AdKind::Rewarded => {
                self.show_full_screen(&session, kind, placement, &ad_unit_id, &effective, config)
                    .await
            }
            AdKind::Unsupported => ShowOutcome::not_ready(),
        };

        info!(
            placement,
            ad_unit_id = %ad_unit_id,
            kind = %kind,
            status = %outcome.status,
            "show settled"
        );
        outcome
    }

    /// Persistent surfaces are not consumed by showing; readiness stays set
    fn show_view(
        &self,
        session: &Session,
        placement: &str,
        ad_unit_id: &str,
        format: AdViewFormat,
        config: &PlacementConfig,
    ) -> ShowOutcome {
        if !self.inner.readiness.is_ready(placement) {
            return ShowOutcome::not_ready();
        }

        let sdk = session.sdk.as_ref();
        self.ensure_view(sdk, ad_unit_id, format, placement, config);
        match format {
            AdViewFormat::Mrec => sdk.show_mrec(ad_unit_id),
            AdViewFormat::Banner => sdk.show_banner(ad_unit_id),
        }
        ShowOutcome::completed()
    }

    async fn show_full_screen(
        &self,
        session: &Session,
        kind: AdKind,
        placement: &str,
        ad_unit_id: &str,
        effective: &EffectiveConfig,
        config: &PlacementConfig,
    ) -> ShowOutcome {
        let sdk = session.sdk.as_ref();
        let sdk_ready = || match kind {
            AdKind::Rewarded => sdk.is_rewarded_ad_ready(ad_unit_id),
            _ => sdk.is_interstitial_ready(ad_unit_id),
        };
        if !(self.inner.readiness.is_ready(placement) || sdk_ready()) {
            return ShowOutcome::not_ready();
        }

        let timeout = effective.show_timeout.unwrap_or(session.show_timeout);
        let mut events = self
            .inner
            .bus
            .subscribe(ad_unit_id, AdEventKind::show_set(kind));
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        match kind {
            AdKind::Rewarded => sdk.show_rewarded_ad(ad_unit_id, placement),
            _ => sdk.show_interstitial(ad_unit_id, placement),
        }

        loop {
            let event = tokio::select! {
                // readiness is left as-is; the SDK may still finish on its own
                _ = &mut deadline => return ShowOutcome::timeout(),
                event = events.next() => event,
            };

            let Some(event) = event else {
                return ShowOutcome::internal_error("ad event bus closed");
            };

            match event.kind.role() {
                EventRole::FailedToDisplay => {
                    self.inner.readiness.consume(placement);
                    return ShowOutcome::show_failed(event.error_message);
                }
                EventRole::Hidden => {
                    self.inner.readiness.consume(placement);
                    return match kind {
                        AdKind::Rewarded => ShowOutcome::closed(),
                        _ => ShowOutcome::completed(),
                    };
                }
                EventRole::RewardGranted if event.is_for(ad_unit_id) => {
                    self.inner.readiness.consume(placement);
                    return ShowOutcome::reward_granted(
                        config.reward_type.clone(),
                        config.reward_amount,
                    );
                }
                _ => {}
            }
        }
    }
}
