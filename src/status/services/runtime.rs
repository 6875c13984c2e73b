//! Wiring of the store, the request-path services and the background
//! workers.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::{
    BotRunService, Reaper, Reconciler, TransitionDriver,
    worker::{WorkerError, WorkerHandle, spawn_periodic},
};
use crate::config::TrackerConfig;
use crate::status::ports::{ExternalStatusProvider, StatusStore};

/// Running status tracker.
///
/// Starting the runtime spawns the reconciler and the reaper on the current
/// tokio runtime; [`TrackerRuntime::shutdown`] stops both after their current
/// tick.
pub struct TrackerRuntime<S>
where
    S: StatusStore + 'static,
{
    store: Arc<S>,
    service: BotRunService<S>,
    driver: TransitionDriver<S>,
    reconciler: WorkerHandle,
    reaper: WorkerHandle,
}

impl<S> TrackerRuntime<S>
where
    S: StatusStore + 'static,
{
    /// Starts the background workers for `store`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start<P, C>(
        config: &TrackerConfig,
        store: Arc<S>,
        provider: Arc<P>,
        clock: Arc<C>,
    ) -> Self
    where
        P: ExternalStatusProvider + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&store),
            provider,
            config.provider_timeout(),
        ));
        let reaper = Arc::new(Reaper::new(Arc::clone(&store), clock, config.retention()));

        let reconciler = spawn_periodic(reconciler, config.sync_interval());
        let reaper = spawn_periodic(reaper, config.cleanup_interval());
        info!("bot status tracking started");

        Self {
            service: BotRunService::new(Arc::clone(&store)),
            driver: TransitionDriver::new(Arc::clone(&store)),
            store,
            reconciler,
            reaper,
        }
    }

    /// Returns the shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the request-path service.
    #[must_use]
    pub const fn service(&self) -> &BotRunService<S> {
        &self.service
    }

    /// Returns the transition driver for the processing pipeline.
    #[must_use]
    pub const fn driver(&self) -> &TransitionDriver<S> {
        &self.driver
    }

    /// Stops both workers, waiting for their in-flight ticks.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorkerError`] raised; the other worker is still
    /// stopped.
    pub async fn shutdown(self) -> Result<(), WorkerError> {
        let reconciler = self.reconciler.shutdown().await;
        let reaper = self.reaper.shutdown().await;
        info!("bot status tracking stopped");
        reconciler.and(reaper)
    }
}
