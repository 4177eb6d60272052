//! One-time, shared SDK bootstrap
//!
//! 1. Wait for the host readiness signal
//! 2. Poll for the SDK binding until found or the wait budget is spent
//! 3. Read the mediator credential
//! 4. Initialize the SDK and wait for its completion callback
//! 5. Publish the [`Session`] that loads and shows run against
//!
//! Concurrent callers share one attempt and observe the same outcome. The
//! attempt runs as its own task and completes even if its callers stop
//! waiting. A failed attempt returns the state to uninitialized; only a later
//! explicit `init` starts a new one.

use super::AdLifecycleAdapter;
use crate::config::AdsConfig;
use crate::error::{Error, Result};
use crate::traits::AdNetworkSdk;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

type SharedBootstrap = Shared<BoxFuture<'static, Result<Arc<Session>>>>;

/// Bootstrap progress
pub(crate) enum BootstrapState {
    Uninitialized,
    Initializing(SharedBootstrap),
    Ready(Arc<Session>),
}

/// Everything a ready adapter needs; read-only once published
pub(crate) struct Session {
    pub(crate) sdk: Arc<dyn AdNetworkSdk>,
    pub(crate) load_timeout: Duration,
    pub(crate) show_timeout: Duration,
}

impl AdLifecycleAdapter {
    /// Initialize the network SDK
    ///
    /// Resolves at once when already initialized; joins the pending attempt
    /// when one is in progress.
    ///
    /// # Errors
    ///
    /// - [`Error::SdkNotAvailable`]: no SDK binding appeared within the wait budget
    /// - [`Error::CredentialMissing`]: no `sdkKey` for this mediator
    pub async fn init(&self, config: &AdsConfig) -> Result<()> {
        let pending = {
            let mut state = self.inner.bootstrap.lock().unwrap();
            match &*state {
                BootstrapState::Ready(_) => return Ok(()),
                BootstrapState::Initializing(pending) => {
                    debug!("joining bootstrap in progress");
                    pending.clone()
                }
                BootstrapState::Uninitialized => {
                    let task = tokio::spawn(self.clone().bootstrap(config.clone()));
                    let adapter = self.clone();
                    let pending = async move {
                        task.await.unwrap_or_else(|e| {
                            warn!("bootstrap task failed: {}", e);
                            *adapter.inner.bootstrap.lock().unwrap() = BootstrapState::Uninitialized;
                            Err(Error::Other(format!("bootstrap task failed: {}", e)))
                        })
                    }
                    .boxed()
                    .shared();
                    *state = BootstrapState::Initializing(pending.clone());
                    pending
                }
            }
        };

        pending.await.map(|_| ())
    }

    /// The ready session, waiting for a bootstrap in progress
    pub(crate) async fn session(&self) -> Result<Arc<Session>> {
        let pending = {
            let state = self.inner.bootstrap.lock().unwrap();
            match &*state {
                BootstrapState::Ready(session) => return Ok(Arc::clone(session)),
                BootstrapState::Initializing(pending) => pending.clone(),
                BootstrapState::Uninitialized => return Err(Error::NotInitialized),
            }
        };

        pending.await.map_err(|e| {
            debug!("bootstrap failed while waiting for it: {}", e);
            Error::NotInitialized
        })
    }

    /// The ready session, without waiting
    pub(crate) fn ready_session(&self) -> Option<Arc<Session>> {
        let state = self.inner.bootstrap.lock().unwrap();
        match &*state {
            BootstrapState::Ready(session) => Some(Arc::clone(session)),
            _ => None,
        }
    }

    async fn bootstrap(self, config: AdsConfig) -> Result<Arc<Session>> {
        let outcome = self.run_bootstrap(&config).await;

        let mut state = self.inner.bootstrap.lock().unwrap();
        match &outcome {
            Ok(session) => {
                info!(
                    sdk = session.sdk.sdk_name(),
                    load_timeout_ms = session.load_timeout.as_millis() as u64,
                    show_timeout_ms = session.show_timeout.as_millis() as u64,
                    "ad network initialized"
                );
                *state = BootstrapState::Ready(Arc::clone(session));
            }
            Err(e) => {
                warn!("ad network bootstrap failed: {}", e);
                *state = BootstrapState::Uninitialized;
            }
        }

        outcome
    }

    async fn run_bootstrap(&self, config: &AdsConfig) -> Result<Arc<Session>> {
        let options = &self.inner.options;

        if !self.inner.host_ready.is_fired() {
            debug!("waiting for host readiness");
        }
        self.inner.host_ready.wait().await;

        let sdk = self.locate_sdk().await?;

        let sdk_key = config
            .sdk_key(&options.mediator_name)
            .ok_or_else(|| Error::CredentialMissing {
                mediator: options.mediator_name.clone(),
            })?;

        debug!(sdk = sdk.sdk_name(), "initializing ad network SDK");
        sdk.initialize(sdk_key).await;

        if !options.test_device_ids.is_empty() {
            sdk.set_test_device_advertising_ids(&options.test_device_ids);
        }

        Ok(Arc::new(Session {
            sdk,
            load_timeout: positive_ms(config.defaults.load_timeout_ms)
                .unwrap_or(options.load_timeout),
            show_timeout: positive_ms(config.defaults.show_timeout_ms)
                .unwrap_or(options.show_timeout),
        }))
    }

    /// Poll the locator until it yields the SDK or the wait budget is spent
    async fn locate_sdk(&self) -> Result<Arc<dyn AdNetworkSdk>> {
        let options = &self.inner.options;
        let mut ticker = tokio::time::interval(options.sdk_poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let search = async {
            loop {
                ticker.tick().await;
                match self.inner.locator.locate() {
                    Ok(Some(sdk)) => return sdk,
                    Ok(None) => {}
                    Err(e) => debug!("SDK lookup failed: {}", e),
                }
            }
        };

        tokio::time::timeout(options.sdk_wait, search)
            .await
            .map_err(|_| Error::SdkNotAvailable {
                waited_ms: options.sdk_wait.as_millis() as u64,
            })
    }
}

fn positive_ms(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}
