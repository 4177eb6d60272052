//! Core traits for the ad lifecycle adapter
//!
//! This module defines the seams between the adapter and its collaborators.
//!
//! - [`AdNetworkSdk`]: The network SDK capability set
//! - [`SdkLocator`]: Runtime discovery of the SDK binding
//! - [`Mediator`]: The `init`/`load`/`show` contract the host consumes

pub mod ad_network;
pub mod mediator;

pub use ad_network::{AdNetworkSdk, SdkLocator};
pub use mediator::{Mediator, ShowOutcome, ShowStatus};
