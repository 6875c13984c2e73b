//! Periodic reconciliation of early-stage status from the external service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::worker::PeriodicTask;
use crate::status::{
    domain::{BotId, BotStatus, StatusRecord},
    ports::{ExternalStatus, ExternalStatusProvider, ProviderError, StatusStore},
};

/// Failure message recorded when the service reports a failure without one.
const EXTERNAL_FAILURE_MESSAGE: &str = "bot run failed in the external automation service";

/// Counters describing one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records whose external status was requested.
    pub polled: usize,
    /// Records moved to a later early-stage status.
    pub advanced: usize,
    /// Records moved to `error` after an external failure.
    pub failed: usize,
    /// Records left untouched because nothing newer was reported or the
    /// record changed hands before the update.
    pub unchanged: usize,
    /// Records skipped because the service was unavailable.
    pub skipped: usize,
}

/// What happened to a single record during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordSync {
    Advanced,
    Failed,
    Unchanged,
    Skipped,
}

impl ReconcileReport {
    fn record(&mut self, outcome: RecordSync) {
        self.polled += 1;
        match outcome {
            RecordSync::Advanced => self.advanced += 1,
            RecordSync::Failed => self.failed += 1,
            RecordSync::Unchanged => self.unchanged += 1,
            RecordSync::Skipped => self.skipped += 1,
        }
    }
}

/// Pulls early-stage progress for every record the reconciler still owns.
///
/// The provider is called without holding any store lock; the result is then
/// applied through a compare-and-set whose predicate re-checks ownership, so a
/// record claimed by the transition driver in the meantime is left alone.
pub struct Reconciler<S, P>
where
    S: StatusStore,
    P: ExternalStatusProvider,
{
    store: Arc<S>,
    provider: Arc<P>,
    timeout: Duration,
}

impl<S, P> Reconciler<S, P>
where
    S: StatusStore,
    P: ExternalStatusProvider,
{
    /// Creates a reconciler bounding every provider call by `timeout`.
    #[must_use]
    pub const fn new(store: Arc<S>, provider: Arc<P>, timeout: Duration) -> Self {
        Self {
            store,
            provider,
            timeout,
        }
    }

    /// Runs one reconciliation pass over all sync-active records.
    ///
    /// Never fails: store and provider errors are logged and the affected
    /// record is retried on the next pass.
    pub async fn reconcile_once(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let records = match self.store.list_sync_active() {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "could not list records for reconciliation");
                return report;
            }
        };

        for record in records {
            let outcome = self.reconcile_record(&record).await;
            report.record(outcome);
        }
        report
    }

    async fn reconcile_record(&self, record: &StatusRecord) -> RecordSync {
        let bot_id = record.bot_id();
        let fetched = match tokio::time::timeout(self.timeout, self.provider.fetch_status(bot_id))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        };

        match fetched {
            Ok(ExternalStatus::Stage(target)) => self.apply_stage(record, target),
            Ok(ExternalStatus::Failed { reason }) => self.apply_failure(bot_id, reason),
            Err(err) => {
                warn!(bot_id = %bot_id, error = %err, "failed to sync bot status, retrying next tick");
                RecordSync::Skipped
            }
        }
    }

    fn apply_stage(&self, record: &StatusRecord, target: BotStatus) -> RecordSync {
        let bot_id = record.bot_id();
        let result = self.store.compare_and_set(
            bot_id,
            &|current| {
                current.sync_active()
                    && current.status().is_early_stage()
                    && target.is_early_stage()
                    && target.is_later_than(current.status())
            },
            &|current| current.advance_to(target),
        );
        match result {
            Ok(true) => {
                info!(
                    bot_id = %bot_id,
                    from = %record.status(),
                    to = %target,
                    "synced bot status from external service"
                );
                RecordSync::Advanced
            }
            Ok(false) => RecordSync::Unchanged,
            Err(err) => {
                warn!(bot_id = %bot_id, error = %err, "could not apply synced bot status");
                RecordSync::Skipped
            }
        }
    }

    fn apply_failure(&self, bot_id: &BotId, reason: Option<String>) -> RecordSync {
        let message = reason.unwrap_or_else(|| EXTERNAL_FAILURE_MESSAGE.to_owned());
        let result = self.store.compare_and_set(
            bot_id,
            &|current| current.sync_active() && !current.is_terminal(),
            &|current| current.fail(message.clone()),
        );
        match result {
            Ok(true) => {
                warn!(bot_id = %bot_id, error = %message, "bot run failed externally");
                RecordSync::Failed
            }
            Ok(false) => RecordSync::Unchanged,
            Err(err) => {
                warn!(bot_id = %bot_id, error = %err, "could not record external failure");
                RecordSync::Skipped
            }
        }
    }
}

#[async_trait]
impl<S, P> PeriodicTask for Reconciler<S, P>
where
    S: StatusStore + 'static,
    P: ExternalStatusProvider + 'static,
{
    fn name(&self) -> &'static str {
        "bot-status-reconciler"
    }

    async fn run_tick(&self) {
        let report = self.reconcile_once().await;
        debug!(
            polled = report.polled,
            advanced = report.advanced,
            failed = report.failed,
            unchanged = report.unchanged,
            skipped = report.skipped,
            "reconciliation pass finished"
        );
    }
}
