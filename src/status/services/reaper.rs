//! Expiry of records older than the retention window.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::worker::PeriodicTask;
use crate::status::{domain::BotId, ports::StatusStore};

/// Result of one reaper pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapReport {
    /// Records found past the retention window.
    pub expired: usize,
    /// Records actually removed by this pass.
    pub deleted: Vec<BotId>,
}

/// Deletes records whose age exceeds the retention window.
///
/// Age is measured from `created_at`, so a run that is still in progress is
/// reclaimed once it has been around longer than the window.
pub struct Reaper<S, C>
where
    S: StatusStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    retention: TimeDelta,
}

impl<S, C> Reaper<S, C>
where
    S: StatusStore,
    C: Clock + Send + Sync,
{
    /// Creates a reaper expiring records older than `retention`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, retention: TimeDelta) -> Self {
        Self {
            store,
            clock,
            retention,
        }
    }

    /// Deletes every record created more than the retention window ago.
    ///
    /// Never fails: store errors are logged and the pass moves on.
    pub fn reap_once(&self) -> ReapReport {
        let mut report = ReapReport::default();
        let Some(cutoff) = self.clock.utc().checked_sub_signed(self.retention) else {
            warn!(
                retention = %self.retention,
                "retention window exceeds the clock range, skipping pass"
            );
            return report;
        };
        let expired = match self.store.list_created_before(cutoff) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "could not list expired bot status records");
                return report;
            }
        };

        report.expired = expired.len();
        for record in expired {
            let bot_id = record.bot_id();
            match self.store.delete(bot_id) {
                Ok(true) => {
                    info!(
                        bot_id = %bot_id,
                        status = %record.status(),
                        created_at = %record.created_at(),
                        "cleaned up expired bot status"
                    );
                    report.deleted.push(bot_id.clone());
                }
                Ok(false) => debug!(bot_id = %bot_id, "expired bot status already removed"),
                Err(err) => warn!(bot_id = %bot_id, error = %err, "failed to delete expired bot status"),
            }
        }
        report
    }
}

#[async_trait]
impl<S, C> PeriodicTask for Reaper<S, C>
where
    S: StatusStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "bot-status-reaper"
    }

    async fn run_tick(&self) {
        let report = self.reap_once();
        debug!(
            expired = report.expired,
            deleted = report.deleted.len(),
            "reaper pass finished"
        );
    }
}
