//! Status record aggregate for a single bot run.

use super::{BotId, BotStatus, OwnerId, StatusDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status record of one bot run.
///
/// Records are owned by a status store. Every change goes through one of the
/// lifecycle methods below, which reject moves the status order forbids and
/// leave terminal records untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    bot_id: BotId,
    #[serde(rename = "user_id")]
    owner_id: OwnerId,
    status: BotStatus,
    sync_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    error_message: Option<String>,
    session_id: Option<String>,
    result_data: Option<Value>,
}

impl StatusRecord {
    /// Creates a record in the initial status with reconciliation enabled.
    #[must_use]
    pub fn new(bot_id: BotId, owner_id: OwnerId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            bot_id,
            owner_id,
            status: BotStatus::INITIAL,
            sync_active: true,
            created_at: timestamp,
            updated_at: timestamp,
            error_message: None,
            session_id: None,
            result_data: None,
        }
    }

    /// Returns the bot identifier.
    #[must_use]
    pub const fn bot_id(&self) -> &BotId {
        &self.bot_id
    }

    /// Returns the owner identifier.
    #[must_use]
    pub const fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> BotStatus {
        self.status
    }

    /// Returns whether the reconciler may still write this record.
    #[must_use]
    pub const fn sync_active(&self) -> bool {
        self.sync_active
    }

    /// Returns `true` once the transition driver owns the record.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        !self.sync_active && !self.status.is_terminal()
    }

    /// Returns `true` when the status is `done` or `error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the latest accepted mutation.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the failure message, if the run failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the processing session identifier, if attached.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the result payload, if attached.
    #[must_use]
    pub const fn result_data(&self) -> Option<&Value> {
        self.result_data.as_ref()
    }

    /// Moves the record forward to `target`.
    ///
    /// Early-stage targets require reconciler authority (`sync_active`);
    /// late-stage targets require the record to be claimed. `done` and
    /// `error` have dedicated methods and are rejected here.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::InvalidTransition`] when the order forbids
    /// the move, [`StatusDomainError::NotClaimed`] for a late-stage target on
    /// an unclaimed record, and [`StatusDomainError::AlreadyClaimed`] for an
    /// early-stage target on a claimed record.
    pub fn advance_to(&mut self, target: BotStatus) -> Result<(), StatusDomainError> {
        if target.is_terminal() || !self.status.can_transition_to(target) {
            return Err(self.invalid_transition(target));
        }
        if target.is_early_stage() && !self.sync_active {
            return Err(StatusDomainError::AlreadyClaimed(self.bot_id.clone()));
        }
        if target.is_late_stage() && self.sync_active {
            return Err(StatusDomainError::NotClaimed(self.bot_id.clone()));
        }
        self.status = target;
        Ok(())
    }

    /// Hands write authority from the reconciler to the transition driver.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::AlreadyClaimed`] when the record is
    /// already claimed or terminal.
    pub fn claim(&mut self) -> Result<(), StatusDomainError> {
        if !self.sync_active || self.is_terminal() {
            return Err(StatusDomainError::AlreadyClaimed(self.bot_id.clone()));
        }
        self.sync_active = false;
        Ok(())
    }

    /// Marks the run as done and attaches the processing payload.
    ///
    /// Reconciliation is disabled as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::InvalidTransition`] when the record is
    /// already terminal.
    pub fn complete(
        &mut self,
        session_id: Option<String>,
        result_data: Option<Value>,
    ) -> Result<(), StatusDomainError> {
        if !self.status.can_transition_to(BotStatus::Done) {
            return Err(self.invalid_transition(BotStatus::Done));
        }
        self.status = BotStatus::Done;
        self.sync_active = false;
        self.session_id = session_id;
        self.result_data = result_data;
        Ok(())
    }

    /// Marks the run as failed with the given message.
    ///
    /// Reconciliation is disabled as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::InvalidTransition`] when the record is
    /// already terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), StatusDomainError> {
        if !self.status.can_transition_to(BotStatus::Error) {
            return Err(self.invalid_transition(BotStatus::Error));
        }
        self.status = BotStatus::Error;
        self.sync_active = false;
        self.error_message = Some(message.into());
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn invalid_transition(&self, to: BotStatus) -> StatusDomainError {
        StatusDomainError::InvalidTransition {
            bot_id: self.bot_id.clone(),
            from: self.status,
            to,
        }
    }
}
