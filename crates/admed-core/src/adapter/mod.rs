//! Ad lifecycle adapter
//!
//! The adapter turns the network SDK's fire-and-forget calls and its shared
//! event stream into the `init`/`load`/`show` contract:
//!
//! - `init` runs one shared bootstrap for any number of concurrent callers
//! - `load` de-duplicates per ad unit and races each fetch against a timeout
//! - `show` resolves exactly one [`ShowOutcome`] per invocation
//!
//! ## Architecture
//!
//! ```text
//!          init ──► Bootstrap ──► Session (sdk, default timeouts)
//!                                    │
//!   load ──► Resolver ──► InFlight ──┼──► ViewSet (banner/mrec) ──► SDK
//!                                    │
//!   show ──► Resolver ──► Readiness ─┘
//!                  ▲
//!                  └──────── EventBus ◄─── SDK events
//! ```
//!
//! ## Shared state
//!
//! The readiness table, in-flight table and view set are owned by the
//! adapter. Their locks are never held across an `.await` or a call into
//! the network SDK.

mod bootstrap;
mod load;
mod show;
mod views;

pub(crate) use bootstrap::{BootstrapState, Session};
pub(crate) use load::InFlightLoads;
pub(crate) use views::ViewSet;

use crate::config::{AdKind, AdapterOptions, AdsConfig, PlacementConfig};
use crate::error::Result;
use crate::events::EventBus;
use crate::host::ReadySignal;
use crate::registry::MediatorRegistry;
use crate::traits::{Mediator, SdkLocator, ShowOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error};

/// Per-placement "content loaded and not yet consumed" flags
#[derive(Debug, Default)]
pub(crate) struct ReadinessTable {
    ready: Mutex<HashMap<String, bool>>,
}

impl ReadinessTable {
    pub(crate) fn is_ready(&self, placement: &str) -> bool {
        let ready = self.ready.lock().unwrap();
        ready.get(placement).copied().unwrap_or(false)
    }

    pub(crate) fn mark_ready(&self, placement: &str) {
        let mut ready = self.ready.lock().unwrap();
        ready.insert(placement.to_string(), true);
    }

    pub(crate) fn consume(&self, placement: &str) {
        let mut ready = self.ready.lock().unwrap();
        ready.insert(placement.to_string(), false);
    }
}

struct Inner {
    options: AdapterOptions,
    host_ready: ReadySignal,
    locator: Box<dyn SdkLocator>,
    bus: EventBus,
    bootstrap: Mutex<BootstrapState>,
    readiness: ReadinessTable,
    loads: InFlightLoads,
    views: ViewSet,
}

/// Lifecycle adapter for one ad network
///
/// Cloning yields another handle to the same adapter and its shared state.
///
/// # Example
///
/// ```rust,no_run
/// use admed_core::{AdKind, AdLifecycleAdapter, AdapterOptions, AdsConfig, ReadySignal, SdkBindings};
/// use std::sync::Arc;
///
/// # async fn run(config: AdsConfig) -> admed_core::Result<()> {
/// let bindings = Arc::new(SdkBindings::default());
/// let host_ready = ReadySignal::new();
/// let adapter = AdLifecycleAdapter::new(AdapterOptions::default(), host_ready.clone(), bindings.clone());
///
/// // the native layer binds the SDK and fires readiness, then:
/// adapter.init(&config).await?;
///
/// let reward = &config.placements["reward"];
/// adapter.load(AdKind::Rewarded, "reward", reward).await?;
/// let outcome = adapter.show(AdKind::Rewarded, "reward", reward).await;
/// println!("{}", outcome.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdLifecycleAdapter {
    inner: Arc<Inner>,
}

impl AdLifecycleAdapter {
    /// Create an adapter
    ///
    /// # Parameters
    ///
    /// - `options`: Process-level options
    /// - `host_ready`: Host environment readiness signal
    /// - `locator`: Discovery of the network SDK binding
    pub fn new(
        options: AdapterOptions,
        host_ready: ReadySignal,
        locator: impl SdkLocator + 'static,
    ) -> Self {
        let bus = EventBus::new();
        Self {
            inner: Arc::new(Inner {
                options,
                host_ready,
                locator: Box::new(locator),
                bus,
                bootstrap: Mutex::new(BootstrapState::Uninitialized),
                readiness: ReadinessTable::default(),
                loads: InFlightLoads::default(),
                views: ViewSet::default(),
            }),
        }
    }

    /// Bus the native bridge publishes SDK events on
    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.inner.options
    }

    /// Whether bootstrap has completed
    pub fn is_initialized(&self) -> bool {
        self.ready_session().is_some()
    }

    /// Whether a placement holds loaded, unconsumed content
    pub fn is_ready(&self, placement: &str) -> bool {
        self.inner.readiness.is_ready(placement)
    }

    /// Whether a persistent surface exists for an ad unit
    pub fn has_view(&self, ad_unit_id: &str) -> bool {
        self.inner.views.contains(ad_unit_id)
    }

    /// Number of loads currently in flight
    pub fn in_flight_loads(&self) -> usize {
        self.inner.loads.len()
    }

    /// Register this adapter in a mediator registry under its mediator name
    pub fn register(&self, registry: &MediatorRegistry) {
        registry.register(
            self.inner.options.mediator_name.clone(),
            Arc::new(self.clone()),
        );
    }

    /// Show a placement on the runtime and hand the outcome to `on_result`
    ///
    /// `on_result` runs exactly once. A show task that panics yields
    /// `INTERNAL_ERROR`. Aborting the returned handle before the show settles
    /// stops the show and yields `CANCELLED`.
    pub fn show_then<F>(
        &self,
        kind: AdKind,
        placement: impl Into<String>,
        config: PlacementConfig,
        on_result: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(ShowOutcome) + Send + 'static,
    {
        let adapter = self.clone();
        let placement = placement.into();
        let task = tokio::spawn(async move { adapter.show(kind, &placement, &config).await });
        let delivery = Delivery {
            on_result: Some(on_result),
            show: task.abort_handle(),
        };

        tokio::spawn(async move {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => ShowOutcome::cancelled(),
                Err(e) => {
                    error!("show task failed: {}", e);
                    ShowOutcome::internal_error(e.to_string())
                }
            };
            delivery.deliver(outcome);
        })
    }

    /// Load every placement served by this adapter, concurrently
    ///
    /// A placement is served unless its effective `mediator` names another
    /// mediator. Returns one result per placement attempted.
    pub async fn preload(&self, config: &AdsConfig) -> Vec<(String, Result<()>)> {
        let target = self.inner.options.target;
        let mediator = self.inner.options.mediator_name.as_str();

        let loads = config
            .placements
            .iter()
            .filter(|(_, placement)| placement.kind != AdKind::Unsupported)
            .filter(|(_, placement)| {
                crate::resolver::resolve(placement, target)
                    .mediator
                    .as_deref()
                    .is_none_or(|name| name == mediator)
            })
            .map(|(name, placement)| async move {
                (name.clone(), self.load(placement.kind, name, placement).await)
            });

        let results = futures::future::join_all(loads).await;
        debug!(count = results.len(), "preload finished");
        results
    }
}

/// Hands a show outcome to its callback once, even if the waiting task is aborted
struct Delivery<F: FnOnce(ShowOutcome)> {
    on_result: Option<F>,
    show: AbortHandle,
}

impl<F: FnOnce(ShowOutcome)> Delivery<F> {
    fn deliver(mut self, outcome: ShowOutcome) {
        if let Some(on_result) = self.on_result.take() {
            on_result(outcome);
        }
    }
}

impl<F: FnOnce(ShowOutcome)> Drop for Delivery<F> {
    fn drop(&mut self) {
        if let Some(on_result) = self.on_result.take() {
            self.show.abort();
            debug!("show aborted before settling");
            on_result(ShowOutcome::cancelled());
        }
    }
}

#[async_trait]
impl Mediator for AdLifecycleAdapter {
    async fn init(&self, config: &AdsConfig) -> Result<()> {
        AdLifecycleAdapter::init(self, config).await
    }

    async fn load(&self, kind: AdKind, placement: &str, config: &PlacementConfig) -> Result<()> {
        AdLifecycleAdapter::load(self, kind, placement, config).await
    }

    async fn show(&self, kind: AdKind, placement: &str, config: &PlacementConfig) -> ShowOutcome {
        AdLifecycleAdapter::show(self, kind, placement, config).await
    }

    fn mediator_name(&self) -> &str {
        &self.inner.options.mediator_name
    }
}
