// # Ad Network SDK Trait
//
// Defines the capability set the adapter consumes from the third-party
// network SDK. The SDK reports outcomes asynchronously on the shared
// [`crate::events::EventBus`]; calls here only start work.
//
// ## Usage
//
// ```rust,ignore
// use admed_core::AdNetworkSdk;
//
// let sdk: Arc<dyn AdNetworkSdk> = /* native binding */;
// sdk.initialize("sdk-key").await;
// sdk.load_rewarded_ad("d2d8ec71ef348184");
// // ... wait for OnRewardedAdLoadedEvent on the bus
// ```

use crate::config::{AdViewFormat, AdViewPosition};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for network SDK bindings
///
/// # Thread Safety
///
/// Implementations must be thread-safe; the adapter shares one handle
/// across every concurrent load and show once bootstrap completes.
///
/// # Contract
///
/// - Calls other than [`AdNetworkSdk::initialize`] return immediately.
/// - Outcomes of loads and shows are published as events carrying the ad unit id.
/// - The SDK must not assume it is called once per ad unit; the adapter
///   de-duplicates, the SDK does not need to.
#[async_trait]
pub trait AdNetworkSdk: Send + Sync {
    /// Initialize the SDK with the mediation credential
    ///
    /// Resolves when the SDK's completion callback fires. There is no
    /// timeout on this call.
    async fn initialize(&self, sdk_key: &str);

    /// Register advertising ids that should receive test ads
    fn set_test_device_advertising_ids(&self, ids: &[String]);

    fn load_rewarded_ad(&self, ad_unit_id: &str);

    fn load_interstitial(&self, ad_unit_id: &str);

    /// Fetch fresh content into an existing banner or rectangle surface
    ///
    /// Only issued for surfaces created by an earlier load; a new surface
    /// is never asked to load right after creation.
    fn load_ad_view(&self, ad_unit_id: &str, format: AdViewFormat);

    /// Create a banner surface; creation starts its first load
    fn create_banner(&self, ad_unit_id: &str, position: AdViewPosition);

    /// Create a rectangle surface; creation starts its first load
    fn create_mrec(&self, ad_unit_id: &str, position: AdViewPosition);

    /// Bind a placement name to a banner surface for placement-scoped reporting
    fn set_banner_placement(&self, ad_unit_id: &str, placement: &str);

    /// Bind a placement name to a rectangle surface for placement-scoped reporting
    fn set_mrec_placement(&self, ad_unit_id: &str, placement: &str);

    fn show_banner(&self, ad_unit_id: &str);

    fn show_mrec(&self, ad_unit_id: &str);

    fn hide_banner(&self, ad_unit_id: &str);

    fn hide_mrec(&self, ad_unit_id: &str);

    fn show_interstitial(&self, ad_unit_id: &str, placement: &str);

    fn show_rewarded_ad(&self, ad_unit_id: &str, placement: &str);

    /// SDK-side readiness, which may know about content the adapter never saw load
    fn is_interstitial_ready(&self, ad_unit_id: &str) -> bool;

    fn is_rewarded_ad_ready(&self, ad_unit_id: &str) -> bool;

    /// Get the SDK name (for logging/debugging)
    fn sdk_name(&self) -> &'static str;
}

/// Trait for discovering the SDK binding at runtime
///
/// The binding may appear late, under one of several names, or only through
/// a lookup mechanism that can itself fail. Bootstrap polls a locator until
/// it yields a handle or the wait budget is spent.
pub trait SdkLocator: Send + Sync {
    /// Look for the SDK once
    ///
    /// # Returns
    ///
    /// - `Ok(Some(sdk))`: The SDK is available
    /// - `Ok(None)`: Not available yet
    /// - `Err(Error)`: The lookup itself failed; callers treat it as not available
    fn locate(&self) -> crate::Result<Option<Arc<dyn AdNetworkSdk>>>;
}
