//! Process-wide publish/subscribe channel for ad events
//!
//! Listeners register the ad unit and kinds they care about, and `publish`
//! only queues an event for listeners it matches. Unrelated traffic never
//! reaches a listener's queue, so a pending operation cannot miss its signal
//! however busy the bus is. Dropping a [`Subscription`] removes the listener,
//! so a settled operation never observes a late event.

use super::{AdEvent, AdEventKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tracing::trace;

/// Registered listeners keyed by subscription id
#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    entries: HashMap<u64, Listener>,
}

#[derive(Debug)]
struct Listener {
    ad_unit_id: String,
    kinds: Vec<AdEventKind>,
    tx: mpsc::UnboundedSender<AdEvent>,
}

impl Listener {
    fn matches(&self, event: &AdEvent) -> bool {
        self.kinds.contains(&event.kind) && event.concerns(&self.ad_unit_id)
    }
}

/// Shared ad event bus
///
/// Cloning yields another handle to the same bus.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Listeners>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event to every listener it matches
    ///
    /// Returns the number of listeners it was delivered to; events matching
    /// no listener are dropped.
    pub fn publish(&self, event: AdEvent) -> usize {
        trace!(event = %event.kind, ad_unit_id = ?event.ad_unit_id, "ad event");
        let listeners = self.listeners.lock().unwrap();
        listeners
            .entries
            .values()
            .filter(|listener| listener.matches(&event))
            .filter(|listener| listener.tx.send(event.clone()).is_ok())
            .count()
    }

    /// Listen for `kinds` concerning `ad_unit_id`
    pub fn subscribe(&self, ad_unit_id: impl Into<String>, kinds: &[AdEventKind]) -> Subscription {
        let ad_unit_id = ad_unit_id.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut listeners = self.listeners.lock().unwrap();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(
            id,
            Listener {
                ad_unit_id: ad_unit_id.clone(),
                kinds: kinds.to_vec(),
                tx,
            },
        );

        Subscription {
            id,
            rx,
            ad_unit_id,
            bus: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().entries.len()
    }
}

/// A filtered listener on the [`EventBus`]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<AdEvent>,
    ad_unit_id: String,
    bus: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Next matching event, or `None` once the bus is gone
    ///
    /// Cancel safe: dropping the returned future loses no event.
    pub async fn next(&mut self) -> Option<AdEvent> {
        self.rx.recv().await
    }

    pub fn ad_unit_id(&self) -> &str {
        &self.ad_unit_id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.bus.upgrade() {
            listeners.lock().unwrap().entries.remove(&self.id);
        }
    }
}
