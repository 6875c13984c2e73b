//! Port for the external automation service that reports early-stage
//! progress.

use crate::status::domain::{BotId, BotStatus};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for external status lookups.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Status reported by the external automation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalStatus {
    /// The run is progressing through an early stage.
    Stage(BotStatus),
    /// The run failed on the external side.
    Failed {
        /// Failure reason supplied by the service, if any.
        reason: Option<String>,
    },
}

impl ExternalStatus {
    /// Maps a status word reported by the service.
    ///
    /// Early-stage words map to the status of the same name. `error` and
    /// `failed` signal an external failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnrecognisedStatus`] for any other word,
    /// including late-stage statuses the service does not own.
    pub fn from_word(word: &str, reason: Option<String>) -> ProviderResult<Self> {
        let normalized = word.trim().to_ascii_lowercase();
        if matches!(normalized.as_str(), "error" | "failed") {
            return Ok(Self::Failed { reason });
        }
        match BotStatus::try_from(normalized.as_str()) {
            Ok(status) if status.is_early_stage() => Ok(Self::Stage(status)),
            _ => Err(ProviderError::UnrecognisedStatus(word.to_owned())),
        }
    }
}

/// Source of early-stage status for bot runs.
#[async_trait]
pub trait ExternalStatusProvider: Send + Sync {
    /// Fetches the current external status of a bot run.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the service cannot be reached or its
    /// answer cannot be interpreted. All such errors are transient from the
    /// reconciler's point of view.
    async fn fetch_status(&self, bot_id: &BotId) -> ProviderResult<ExternalStatus>;
}

/// Transient failures raised while talking to the external service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The service could not be reached or answered with a failure code.
    #[error("external status service unavailable: {0}")]
    Unavailable(String),

    /// The service did not answer within the configured timeout.
    #[error("external status request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a status word outside the early stages.
    #[error("unrecognised external status: {0}")]
    UnrecognisedStatus(String),
}
