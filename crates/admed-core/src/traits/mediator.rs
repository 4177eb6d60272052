// # Mediator Trait
//
// The contract the host ads layer consumes: one mediator per ad network,
// registered by name, offering exactly `init`, `load` and `show`.
//
// Bootstrap and load failures are errors. Show never fails; every branch,
// including infrastructure trouble, ends in a [`ShowOutcome`].

use crate::config::{AdKind, AdsConfig, PlacementConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Terminal status of a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShowStatus {
    NotReady,
    Completed,
    RewardGranted,
    Closed,
    ShowFailed,
    Timeout,
    Cancelled,
    InternalError,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowStatus::NotReady => "NOT_READY",
            ShowStatus::Completed => "COMPLETED",
            ShowStatus::RewardGranted => "REWARD_GRANTED",
            ShowStatus::Closed => "CLOSED",
            ShowStatus::ShowFailed => "SHOW_FAILED",
            ShowStatus::Timeout => "TIMEOUT",
            ShowStatus::Cancelled => "CANCELLED",
            ShowStatus::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of a show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowOutcome {
    pub status: ShowStatus,
    pub can_reward: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ShowOutcome {
    /// Outcome with the given status and nothing else
    pub fn status(status: ShowStatus) -> Self {
        Self {
            status,
            can_reward: false,
            reward_type: None,
            reward_amount: None,
            error_message: None,
        }
    }

    pub fn not_ready() -> Self {
        Self::status(ShowStatus::NotReady)
    }

    pub fn completed() -> Self {
        Self::status(ShowStatus::Completed)
    }

    pub fn closed() -> Self {
        Self::status(ShowStatus::Closed)
    }

    pub fn timeout() -> Self {
        Self::status(ShowStatus::Timeout)
    }

    pub fn cancelled() -> Self {
        Self::status(ShowStatus::Cancelled)
    }

    pub fn reward_granted(reward_type: Option<String>, reward_amount: Option<u64>) -> Self {
        Self {
            can_reward: true,
            reward_type,
            reward_amount,
            ..Self::status(ShowStatus::RewardGranted)
        }
    }

    pub fn show_failed(message: Option<String>) -> Self {
        Self {
            error_message: Some(message.unwrap_or_else(|| "SHOW_FAILED".to_string())),
            ..Self::status(ShowStatus::ShowFailed)
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::status(ShowStatus::InternalError)
        }
    }
}

/// Trait for ad network mediators
#[async_trait]
pub trait Mediator: Send + Sync {
    /// Initialize the network; concurrent callers share one attempt
    async fn init(&self, config: &AdsConfig) -> crate::Result<()>;

    /// Load content for a placement
    async fn load(
        &self,
        kind: AdKind,
        placement: &str,
        config: &PlacementConfig,
    ) -> crate::Result<()>;

    /// Show a placement; never fails, the outcome carries the status
    async fn show(&self, kind: AdKind, placement: &str, config: &PlacementConfig) -> ShowOutcome;

    /// Get the mediator name (for registration and logging)
    fn mediator_name(&self) -> &str;
}
