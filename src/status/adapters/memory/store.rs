//! In-memory implementation of the [`StatusStore`] port.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info};

use crate::status::{
    domain::{BotId, OwnerId, StatusRecord},
    ports::{RecordMutation, RecordPredicate, StatusStore, StatusStoreError, StatusStoreResult},
};

/// Thread-safe in-memory status store.
///
/// Every operation runs under one [`RwLock`], which makes each of them atomic
/// per key. The lock is never held across an await point.
#[derive(Debug, Clone)]
pub struct InMemoryStatusStore<C: Clock + Send + Sync> {
    records: Arc<RwLock<HashMap<BotId, StatusRecord>>>,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync> InMemoryStatusStore<C> {
    /// Creates an empty store stamping records with the given clock.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    fn read(&self) -> StatusStoreResult<RwLockReadGuard<'_, HashMap<BotId, StatusRecord>>> {
        self.records
            .read()
            .map_err(|err| StatusStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StatusStoreResult<RwLockWriteGuard<'_, HashMap<BotId, StatusRecord>>> {
        self.records
            .write()
            .map_err(|err| StatusStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn collect_where(
        &self,
        filter: impl Fn(&StatusRecord) -> bool,
    ) -> StatusStoreResult<Vec<StatusRecord>> {
        let records = self.read()?;
        Ok(records
            .values()
            .filter(|record| filter(*record))
            .cloned()
            .collect())
    }
}

impl<C: Clock + Send + Sync> StatusStore for InMemoryStatusStore<C> {
    fn create(&self, bot_id: BotId, owner_id: OwnerId) -> StatusStoreResult<StatusRecord> {
        let mut records = self.write()?;
        if records.contains_key(&bot_id) {
            return Err(StatusStoreError::Conflict(bot_id));
        }

        let record = StatusRecord::new(bot_id.clone(), owner_id, &*self.clock);
        records.insert(bot_id, record.clone());
        info!(
            bot_id = %record.bot_id(),
            status = %record.status(),
            "created bot status record"
        );
        Ok(record)
    }

    fn get(&self, bot_id: &BotId, requester: &OwnerId) -> StatusStoreResult<StatusRecord> {
        let records = self.read()?;
        let record = records
            .get(bot_id)
            .ok_or_else(|| StatusStoreError::NotFound(bot_id.clone()))?;
        if record.owner_id() != requester {
            return Err(StatusStoreError::Forbidden {
                bot_id: bot_id.clone(),
                requester: requester.clone(),
            });
        }
        Ok(record.clone())
    }

    fn snapshot(&self, bot_id: &BotId) -> StatusStoreResult<Option<StatusRecord>> {
        let records = self.read()?;
        Ok(records.get(bot_id).cloned())
    }

    fn compare_and_set(
        &self,
        bot_id: &BotId,
        predicate: RecordPredicate<'_>,
        mutation: RecordMutation<'_>,
    ) -> StatusStoreResult<bool> {
        let mut records = self.write()?;
        let current = records
            .get_mut(bot_id)
            .ok_or_else(|| StatusStoreError::NotFound(bot_id.clone()))?;
        if !predicate(&*current) {
            return Ok(false);
        }

        let mut candidate = current.clone();
        if let Err(err) = mutation(&mut candidate) {
            debug!(bot_id = %bot_id, error = %err, "discarded rejected record mutation");
            return Ok(false);
        }
        candidate.touch(&*self.clock);
        *current = candidate;
        Ok(true)
    }

    fn delete(&self, bot_id: &BotId) -> StatusStoreResult<bool> {
        let mut records = self.write()?;
        Ok(records.remove(bot_id).is_some())
    }

    fn list_sync_active(&self) -> StatusStoreResult<Vec<StatusRecord>> {
        self.collect_where(StatusRecord::sync_active)
    }

    fn list_created_before(&self, cutoff: DateTime<Utc>) -> StatusStoreResult<Vec<StatusRecord>> {
        self.collect_where(|record| record.created_at() < cutoff)
    }

    fn count(&self) -> StatusStoreResult<usize> {
        Ok(self.read()?.len())
    }
}
