//! Cancellable periodic workers for the background loops.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Unit of work executed on every tick of a periodic worker.
#[async_trait]
pub trait PeriodicTask: Send + Sync + 'static {
    /// Name used in log records.
    fn name(&self) -> &'static str;

    /// Runs one iteration. Failures must be handled inside the tick.
    async fn run_tick(&self);
}

/// Errors raised while stopping a worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker task panicked or was aborted.
    #[error("worker {name} did not shut down cleanly: {message}")]
    Join {
        /// Worker name.
        name: &'static str,
        /// Join failure description.
        message: String,
    },
}

/// Handle to a running periodic worker.
///
/// Dropping the handle without calling [`WorkerHandle::shutdown`] also stops
/// the worker after its current tick, but does not wait for it.
#[derive(Debug)]
pub struct WorkerHandle {
    name: &'static str,
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Returns the worker name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Stops accepting new ticks, lets the in-flight tick finish and waits for
    /// the worker to exit.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Join`] when the worker task panicked.
    pub async fn shutdown(mut self) -> Result<(), WorkerError> {
        let name = self.name;
        if let Some(stop_tx) = self.stop_tx.take() {
            // The receiver is gone only if the loop already exited.
            if stop_tx.send(()).is_err() {
                debug!(worker = name, "worker loop already exited");
            }
        }
        self.task.await.map_err(|err| WorkerError::Join {
            name,
            message: err.to_string(),
        })?;
        info!(worker = name, "worker stopped");
        Ok(())
    }
}

/// Fallback delay for a first tick that would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Spawns `task` on the current tokio runtime, ticking every `period`.
///
/// The first tick fires one full period after the call. Ticks missed while a
/// slow iteration runs are skipped rather than replayed.
#[must_use]
pub fn spawn_periodic<T: PeriodicTask>(task: Arc<T>, period: Duration) -> WorkerHandle {
    // tokio rejects a zero period.
    let tick = period.max(Duration::from_millis(1));
    let name = task.name();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        let now = Instant::now();
        let start = now.checked_add(tick).unwrap_or(now + FAR_FUTURE);
        let mut interval = tokio::time::interval_at(start, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = interval.tick() => task.run_tick().await,
            }
        }
    });

    info!(worker = name, period = ?tick, "worker started");
    WorkerHandle {
        name,
        stop_tx: Some(stop_tx),
        task: join,
    }
}
