//! Mediator registry
//!
//! The host ads layer looks mediators up by name, avoiding hardcoded
//! per-network branches.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use admed_core::{AdLifecycleAdapter, MediatorRegistry};
//!
//! let registry = MediatorRegistry::new();
//! adapter.register(&registry);
//!
//! let mediator = registry.get("applovin").unwrap();
//! mediator.init(&ads_config).await?;
//! ```

use crate::error::{Error, Result};
use crate::traits::Mediator;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of mediators by name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct MediatorRegistry {
    mediators: RwLock<HashMap<String, Arc<dyn Mediator>>>,
}

impl MediatorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mediator under a name, replacing any previous one
    pub fn register(&self, name: impl Into<String>, mediator: Arc<dyn Mediator>) {
        let name = name.into();
        let mut mediators = self.mediators.write().unwrap();
        mediators.insert(name, mediator);
    }

    /// Look a mediator up by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Mediator>> {
        let mediators = self.mediators.read().unwrap();
        mediators.get(name).cloned()
    }

    /// Look a mediator up, failing with a configuration error when absent
    pub fn require(&self, name: &str) -> Result<Arc<dyn Mediator>> {
        self.get(name)
            .ok_or_else(|| Error::config(format!("Unknown mediator: {}", name)))
    }

    /// List all registered mediator names
    pub fn list(&self) -> Vec<String> {
        let mediators = self.mediators.read().unwrap();
        mediators.keys().cloned().collect()
    }

    /// Check if a mediator is registered
    pub fn has(&self, name: &str) -> bool {
        let mediators = self.mediators.read().unwrap();
        mediators.contains_key(name)
    }
}
