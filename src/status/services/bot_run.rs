//! Request-path operations: trigger, status query and explicit callback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::TransitionOutcome;
use crate::status::{
    domain::{BotId, BotStatus, OwnerId, StatusDomainError, StatusRecord},
    ports::{StatusStore, StatusStoreError},
};

/// Request payload for registering a triggered bot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerBotRequest {
    owner_id: String,
    bot_id: Option<String>,
}

impl TriggerBotRequest {
    /// Creates a request on behalf of `owner_id`.
    #[must_use]
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            bot_id: None,
        }
    }

    /// Uses the identifier assigned by the automation service.
    ///
    /// Without it a random identifier is generated.
    #[must_use]
    pub fn with_bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.bot_id = Some(bot_id.into());
        self
    }
}

/// Response returned to the caller that triggered a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerReceipt {
    /// Identifier to poll for status.
    pub bot_id: BotId,
    /// Status at creation time.
    pub status: BotStatus,
}

/// Explicit completion callback from an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRequest {
    /// Bot whose run finished.
    pub bot_id: String,
    /// Processing session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Result payload exposed to clients.
    #[serde(default)]
    pub result_data: Option<Value>,
}

/// Service-level errors for request-path operations.
#[derive(Debug, Error)]
pub enum BotRunError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] StatusDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StatusStoreError),
}

/// Result type for request-path operations.
pub type BotRunResult<T> = Result<T, BotRunError>;

/// Entry point for client-facing operations on bot runs.
#[derive(Clone)]
pub struct BotRunService<S>
where
    S: StatusStore,
{
    store: Arc<S>,
}

impl<S> BotRunService<S>
where
    S: StatusStore,
{
    /// Creates a service operating on `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a triggered run in the initial status.
    ///
    /// # Errors
    ///
    /// Returns [`BotRunError::Domain`] for empty identifiers and
    /// [`StatusStoreError::Conflict`] when the bot is already tracked.
    pub fn trigger(&self, request: TriggerBotRequest) -> BotRunResult<TriggerReceipt> {
        let owner_id = OwnerId::new(request.owner_id)?;
        let bot_id = match request.bot_id {
            Some(raw) => BotId::new(raw)?,
            None => BotId::generate(),
        };
        let record = self.store.create(bot_id, owner_id)?;
        Ok(TriggerReceipt {
            bot_id: record.bot_id().clone(),
            status: record.status(),
        })
    }

    /// Returns the record of a run owned by `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::NotFound`] for unknown or expired bots and
    /// [`StatusStoreError::Forbidden`] when `requester` is not the owner.
    pub fn status(&self, bot_id: &BotId, requester: &OwnerId) -> BotRunResult<StatusRecord> {
        Ok(self.store.get(bot_id, requester)?)
    }

    /// Marks a run as done on behalf of an external collaborator.
    ///
    /// Any non-terminal record is accepted and loses reconciler authority. A
    /// callback for a record that is already terminal is a no-op reported as
    /// [`TransitionOutcome::AlreadyTerminal`].
    ///
    /// # Errors
    ///
    /// Returns [`BotRunError::Domain`] for an empty bot identifier and
    /// [`StatusStoreError::NotFound`] for unknown bots.
    pub fn record_callback(&self, request: CallbackRequest) -> BotRunResult<TransitionOutcome> {
        let bot_id = BotId::new(request.bot_id)?;
        let session_id = request.session_id;
        let result_data = request.result_data;
        let applied = self.store.compare_and_set(
            &bot_id,
            &|record| !record.is_terminal(),
            &|record| record.complete(session_id.clone(), result_data.clone()),
        )?;

        if applied {
            info!(bot_id = %bot_id, "bot run completed by callback");
            Ok(TransitionOutcome::Applied)
        } else {
            debug!(bot_id = %bot_id, "ignored callback for terminal bot run");
            Ok(TransitionOutcome::AlreadyTerminal)
        }
    }
}
