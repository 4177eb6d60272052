// # Host Integration
//
// Pieces the host environment provides before any SDK interaction:
//
// - [`ReadySignal`]: the one-time "environment ready" event
// - [`SdkBindings`]: named slots the native layer fills with the SDK handle
// - [`LocatorChain`]: ordered fallback across several discovery mechanisms

use crate::traits::{AdNetworkSdk, SdkLocator};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::debug;

/// Binding names searched by [`SdkBindings::default`], in order
pub const DEFAULT_BINDING_NAMES: [&str; 2] = ["applovin", "AppLovinMAX"];

/// Fire-once, process-lifetime readiness latch
///
/// Waiting after the signal fired returns immediately. Cloning yields a
/// handle to the same latch.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadySignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that has already fired
    pub fn fired() -> Self {
        let signal = Self::new();
        signal.fire();
        signal
    }

    /// Fire the signal; later calls are no-ops
    pub fn fire(&self) {
        self.tx.send_if_modified(|fired| !std::mem::replace(fired, true));
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspend until the signal has fired
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Named binding slots for the SDK handle
///
/// The native layer binds the handle under whatever name it exposes; the
/// locator searches names in the configured order.
pub struct SdkBindings {
    order: Vec<String>,
    slots: RwLock<HashMap<String, Arc<dyn AdNetworkSdk>>>,
}

impl SdkBindings {
    /// Create bindings searched in the given name order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: names.into_iter().map(Into::into).collect(),
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Expose the SDK under a binding name
    pub fn bind(&self, name: impl Into<String>, sdk: Arc<dyn AdNetworkSdk>) {
        let mut slots = self.slots.write().unwrap();
        slots.insert(name.into(), sdk);
    }

    /// Remove a binding
    pub fn unbind(&self, name: &str) {
        let mut slots = self.slots.write().unwrap();
        slots.remove(name);
    }

    /// Names searched, in order
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

impl Default for SdkBindings {
    fn default() -> Self {
        Self::new(DEFAULT_BINDING_NAMES)
    }
}

impl SdkLocator for SdkBindings {
    fn locate(&self) -> crate::Result<Option<Arc<dyn AdNetworkSdk>>> {
        let slots = self.slots.read().unwrap();
        Ok(self.order.iter().find_map(|name| slots.get(name).cloned()))
    }
}

impl<T: SdkLocator + ?Sized> SdkLocator for Arc<T> {
    fn locate(&self) -> crate::Result<Option<Arc<dyn AdNetworkSdk>>> {
        (**self).locate()
    }
}

/// Tries several locators in order
///
/// A failing locator is treated as "not available" and the next one is tried.
#[derive(Default)]
pub struct LocatorChain {
    locators: Vec<Box<dyn SdkLocator>>,
}

impl LocatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: impl SdkLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }
}

impl SdkLocator for LocatorChain {
    fn locate(&self) -> crate::Result<Option<Arc<dyn AdNetworkSdk>>> {
        for locator in &self.locators {
            match locator.locate() {
                Ok(Some(sdk)) => return Ok(Some(sdk)),
                Ok(None) => {}
                Err(e) => debug!("SDK lookup failed, trying next: {}", e),
            }
        }
        Ok(None)
    }
}

/// A locator backed by a lookup function, e.g. a module registry query
pub struct LookupFn<F>(pub F);

impl<F> SdkLocator for LookupFn<F>
where
    F: Fn() -> crate::Result<Option<Arc<dyn AdNetworkSdk>>> + Send + Sync,
{
    fn locate(&self) -> crate::Result<Option<Arc<dyn AdNetworkSdk>>> {
        (self.0)()
    }
}
