//! Late-stage status transitions driven by the local processing pipeline.

use std::cell::Cell;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::status::{
    domain::{BotId, BotStatus, StatusRecord},
    ports::{RecordMutation, StatusStore, StatusStoreResult},
};

/// Decision taken for a requested status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The record moved to the requested status.
    Applied,
    /// The record was already terminal; nothing changed.
    AlreadyTerminal,
    /// The request was out of order or the record was not claimed; nothing
    /// changed.
    Rejected,
}

impl TransitionOutcome {
    /// Returns `true` when the record changed.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Drives a claimed record through the late stages to a terminal status.
///
/// [`TransitionDriver::claim`] is the serialization point between concurrent
/// pipeline executions: only the caller that observes `true` may go on to
/// call the other operations for that bot.
#[derive(Clone)]
pub struct TransitionDriver<S>
where
    S: StatusStore,
{
    store: Arc<S>,
}

impl<S> TransitionDriver<S>
where
    S: StatusStore,
{
    /// Creates a driver operating on `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Takes write authority over the record away from the reconciler.
    ///
    /// Returns `false` when the record was already claimed or is terminal; the
    /// caller must then not process this bot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::status::ports::StatusStoreError::NotFound`] when the
    /// record does not exist.
    pub fn claim(&self, bot_id: &BotId) -> StatusStoreResult<bool> {
        let claimed = self.store.compare_and_set(
            bot_id,
            &|record| record.sync_active() && !record.is_terminal(),
            &StatusRecord::claim,
        )?;
        if claimed {
            info!(bot_id = %bot_id, "claimed bot run for processing");
        } else {
            warn!(bot_id = %bot_id, "bot run already claimed, refusing duplicate processing");
        }
        Ok(claimed)
    }

    /// Moves a claimed record forward to the late stage `stage`.
    ///
    /// Backward, repeated and out-of-band requests (`done`, `error`, early
    /// stages) are logged and rejected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::status::ports::StatusStoreError::NotFound`] when the
    /// record does not exist.
    pub fn advance(&self, bot_id: &BotId, stage: BotStatus) -> StatusStoreResult<TransitionOutcome> {
        if !stage.is_late_stage() || stage.is_terminal() {
            warn!(bot_id = %bot_id, to = %stage, "rejected advance to a non-pipeline stage");
            return Ok(TransitionOutcome::Rejected);
        }
        self.apply(
            bot_id,
            stage,
            &|record| record.is_claimed() && stage.is_later_than(record.status()),
            &|record| record.advance_to(stage),
        )
    }

    /// Marks a claimed record in `creating_tasks` as done and attaches the
    /// processing payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::status::ports::StatusStoreError::NotFound`] when the
    /// record does not exist.
    pub fn complete(
        &self,
        bot_id: &BotId,
        session_id: impl Into<String>,
        result_data: &Value,
    ) -> StatusStoreResult<TransitionOutcome> {
        let session = session_id.into();
        self.apply(
            bot_id,
            BotStatus::Done,
            &|record| record.is_claimed() && record.status() == BotStatus::CreatingTasks,
            &|record| record.complete(Some(session.clone()), Some(result_data.clone())),
        )
    }

    /// Marks a non-terminal record as failed.
    ///
    /// Failing a record that already failed is a no-op reported as
    /// [`TransitionOutcome::AlreadyTerminal`]; the first message is kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::status::ports::StatusStoreError::NotFound`] when the
    /// record does not exist.
    pub fn fail(
        &self,
        bot_id: &BotId,
        message: impl Into<String>,
    ) -> StatusStoreResult<TransitionOutcome> {
        let reason = message.into();
        self.apply(
            bot_id,
            BotStatus::Error,
            &|record| !record.is_terminal(),
            &|record| record.fail(reason.clone()),
        )
    }

    fn apply(
        &self,
        bot_id: &BotId,
        target: BotStatus,
        guard: &dyn Fn(&StatusRecord) -> bool,
        mutation: RecordMutation<'_>,
    ) -> StatusStoreResult<TransitionOutcome> {
        let observed = Cell::new(None);
        let applied = self.store.compare_and_set(
            bot_id,
            &|record| {
                observed.set(Some(record.status()));
                guard(record)
            },
            mutation,
        )?;

        if applied {
            info!(bot_id = %bot_id, to = %target, "bot status updated");
            return Ok(TransitionOutcome::Applied);
        }

        match observed.get() {
            Some(current) if current.is_terminal() => {
                debug!(bot_id = %bot_id, status = %current, to = %target, "bot run already terminal");
                Ok(TransitionOutcome::AlreadyTerminal)
            }
            current => {
                warn!(
                    bot_id = %bot_id,
                    from = ?current,
                    to = %target,
                    "rejected out-of-order bot status transition"
                );
                Ok(TransitionOutcome::Rejected)
            }
        }
    }
}
