// # admed-core
//
// Ad-mediation lifecycle adapter.
//
// ## Architecture Overview
//
// This library drives a third-party ad network SDK through a small,
// promise-like contract:
// - **AdNetworkSdk**: Trait for the native SDK surface (fire-and-forget calls)
// - **SdkLocator**: Trait for discovering the SDK binding once the host is up
// - **EventBus**: Shared stream of SDK events, filtered per subscriber
// - **AdLifecycleAdapter**: Orchestrates init, load and show over the SDK
// - **MediatorRegistry**: Registry of adapters keyed by mediator name
//
// ## Design Principles
//
// 1. **Single Bootstrap**: Any number of `init` callers share one SDK initialization
// 2. **One Fetch per Ad Unit**: Concurrent loads of the same unit join a single SDK call
// 3. **Bounded Waits**: Every load and show races a timer
// 4. **Structured Outcomes**: `show` always settles a `ShowOutcome`, never an error
// 5. **Library-First**: The native bridge is injected; nothing here is platform specific

pub mod adapter;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod registry;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use adapter::AdLifecycleAdapter;
pub use config::{
    AdKind, AdViewFormat, AdViewPosition, AdapterOptions, AdsConfig, PlacementConfig, Target,
    TargetConfig,
};
pub use error::{Error, Result};
pub use events::{AdEvent, AdEventKind, EventBus, Subscription};
pub use host::{LocatorChain, LookupFn, ReadySignal, SdkBindings};
pub use registry::MediatorRegistry;
pub use resolver::{EffectiveConfig, resolve};
pub use traits::{AdNetworkSdk, Mediator, SdkLocator, ShowOutcome, ShowStatus};
