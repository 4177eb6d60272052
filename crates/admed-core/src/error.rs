//! Error types for the ad lifecycle adapter
//!
//! Bootstrap and load failures are surfaced as [`Error`]. Show failures never
//! are; they are folded into [`crate::ShowOutcome`] instead.

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the adapter
///
/// The type is `Clone` because one settled bootstrap or load outcome is
/// handed to every caller that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The network SDK could not be located within the wait budget
    #[error("network SDK not available after {waited_ms}ms")]
    SdkNotAvailable {
        /// How long discovery polled before giving up
        waited_ms: u64,
    },

    /// No credential configured for the mediator
    #[error("credential missing for mediator '{mediator}'")]
    CredentialMissing {
        /// Mediator name looked up in `mediators`
        mediator: String,
    },

    /// An operation needed a ready SDK but bootstrap never succeeded
    #[error("adapter not initialized")]
    NotInitialized,

    /// The placement resolves to no ad unit identifier
    #[error("no ad unit id configured for placement '{placement}'")]
    AdUnitIdMissing {
        /// Placement name
        placement: String,
    },

    /// The network reported a load failure for the ad unit
    #[error("load failed for ad unit '{ad_unit_id}'{}", detail_suffix(.message))]
    LoadFailed {
        /// Ad unit that failed
        ad_unit_id: String,
        /// Error message carried by the failure event, if any
        message: Option<String>,
    },

    /// No load outcome arrived before the timeout
    #[error("load timed out for ad unit '{ad_unit_id}' after {timeout_ms}ms")]
    LoadTimeout {
        /// Ad unit that timed out
        ad_unit_id: String,
        /// Effective timeout
        timeout_ms: u64,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A bridge payload named an event the bus does not know
    #[error("unknown ad event: {0}")]
    UnknownEvent(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn detail_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a load failure for an ad unit
    pub fn load_failed(ad_unit_id: impl Into<String>, message: Option<String>) -> Self {
        Self::LoadFailed {
            ad_unit_id: ad_unit_id.into(),
            message,
        }
    }

    /// Stable error code, matching the codes hosts already switch on
    pub fn code(&self) -> &'static str {
        match self {
            Self::SdkNotAvailable { .. } => "SDK_NOT_AVAILABLE",
            Self::CredentialMissing { .. } => "CREDENTIAL_MISSING",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AdUnitIdMissing { .. } => "AD_UNIT_ID_MISSING",
            Self::LoadFailed { .. } => "LOAD_FAILED",
            Self::LoadTimeout { .. } => "LOAD_TIMEOUT",
            Self::Config(_) => "CONFIG_INVALID",
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a later call may succeed without any configuration change
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SdkNotAvailable { .. } | Self::LoadFailed { .. } | Self::LoadTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
