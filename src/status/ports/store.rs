//! Store port for bot status records.

use crate::status::domain::{BotId, OwnerId, StatusDomainError, StatusRecord};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for status store operations.
pub type StatusStoreResult<T> = Result<T, StatusStoreError>;

/// Condition a record must satisfy before a mutation is applied.
pub type RecordPredicate<'a> = &'a dyn Fn(&StatusRecord) -> bool;

/// Change applied to a record once its predicate holds.
pub type RecordMutation<'a> = &'a dyn Fn(&mut StatusRecord) -> Result<(), StatusDomainError>;

/// Authoritative store of bot status records.
///
/// Implementations must make every operation atomic per key: no caller may
/// observe a record mid-mutation. Operations never block on I/O, so callers
/// are free to invoke them from async contexts between network calls.
pub trait StatusStore: Send + Sync {
    /// Inserts a new record in the initial status with reconciliation
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Conflict`] when a record already exists
    /// for `bot_id`.
    fn create(&self, bot_id: BotId, owner_id: OwnerId) -> StatusStoreResult<StatusRecord>;

    /// Returns a snapshot of the record on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::NotFound`] when the record does not exist
    /// and [`StatusStoreError::Forbidden`] when `requester` is not the owner.
    fn get(&self, bot_id: &BotId, requester: &OwnerId) -> StatusStoreResult<StatusRecord>;

    /// Returns a snapshot of the record without an ownership check.
    ///
    /// Intended for the background workers and the transition driver.
    fn snapshot(&self, bot_id: &BotId) -> StatusStoreResult<Option<StatusRecord>>;

    /// Applies `mutation` only if `predicate` holds against the current
    /// record.
    ///
    /// The mutation runs against a copy; the copy replaces the stored record
    /// and has its `updated_at` refreshed only when the mutation succeeds. A
    /// mutation rejected by the lifecycle rules leaves the record unchanged
    /// and yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::NotFound`] when the record does not exist.
    fn compare_and_set(
        &self,
        bot_id: &BotId,
        predicate: RecordPredicate<'_>,
        mutation: RecordMutation<'_>,
    ) -> StatusStoreResult<bool>;

    /// Removes the record unconditionally.
    ///
    /// Returns `true` when a record was removed.
    fn delete(&self, bot_id: &BotId) -> StatusStoreResult<bool>;

    /// Returns snapshots of every record the reconciler may still write.
    fn list_sync_active(&self) -> StatusStoreResult<Vec<StatusRecord>>;

    /// Returns snapshots of every record created strictly before `cutoff`.
    fn list_created_before(&self, cutoff: DateTime<Utc>) -> StatusStoreResult<Vec<StatusRecord>>;

    /// Returns the number of stored records.
    fn count(&self) -> StatusStoreResult<usize>;
}

/// Errors returned by status store implementations.
#[derive(Debug, Clone, Error)]
pub enum StatusStoreError {
    /// A record for the bot already exists.
    #[error("bot {0} is already being tracked")]
    Conflict(BotId),

    /// No record exists for the bot, or it has expired.
    #[error("bot {0} not found")]
    NotFound(BotId),

    /// The requester does not own the record.
    #[error("requester {requester} may not read bot {bot_id}")]
    Forbidden {
        /// Requested bot.
        bot_id: BotId,
        /// Identity of the rejected caller.
        requester: OwnerId,
    },

    /// Storage-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StatusStoreError {
    /// Wraps a storage-layer error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
