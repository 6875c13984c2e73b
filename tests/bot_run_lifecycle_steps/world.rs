//! Shared world state for bot run lifecycle BDD scenarios.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use botwatch::status::{
    adapters::{ManualClock, memory::InMemoryStatusStore},
    domain::{BotId, BotStatus, StatusRecord},
    ports::{ExternalStatus, ExternalStatusProvider, ProviderError, ProviderResult},
    services::{
        BotRunResult, BotRunService, Reaper, Reconciler, TransitionDriver, TriggerReceipt,
    },
};
use chrono::{TimeDelta, Utc};
use rstest::fixture;

/// Store type used by the BDD world.
pub type WorldStore = InMemoryStatusStore<ManualClock>;

/// External service stand-in answering from per-bot queues.
#[derive(Debug, Default)]
pub struct QueuedProvider {
    queues: Mutex<HashMap<BotId, VecDeque<BotStatus>>>,
}

impl QueuedProvider {
    /// Queues the statuses the service will report for `bot_id`.
    pub fn enqueue(&self, bot_id: &BotId, statuses: impl IntoIterator<Item = BotStatus>) {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(bot_id.clone())
            .or_default()
            .extend(statuses);
    }
}

#[async_trait]
impl ExternalStatusProvider for QueuedProvider {
    async fn fetch_status(&self, bot_id: &BotId) -> ProviderResult<ExternalStatus> {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(bot_id)
            .and_then(VecDeque::pop_front)
            .map(ExternalStatus::Stage)
            .ok_or_else(|| ProviderError::Unavailable("nothing queued".to_owned()))
    }
}

/// Scenario world for bot run lifecycle behaviour tests.
pub struct BotRunWorld {
    pub clock: ManualClock,
    pub provider: Arc<QueuedProvider>,
    pub service: BotRunService<WorldStore>,
    pub driver: TransitionDriver<WorldStore>,
    pub reconciler: Reconciler<WorldStore, QueuedProvider>,
    pub reaper: Reaper<WorldStore, ManualClock>,
    pub last_trigger: Option<BotRunResult<TriggerReceipt>>,
    pub last_status: Option<BotRunResult<StatusRecord>>,
    pub claims: Vec<bool>,
}

impl BotRunWorld {
    /// Creates a world with an empty store and a 24 hour retention window.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::new(Utc::now());
        let shared = Arc::new(clock.clone());
        let store = Arc::new(InMemoryStatusStore::new(Arc::clone(&shared)));
        let provider = Arc::new(QueuedProvider::default());

        Self {
            service: BotRunService::new(Arc::clone(&store)),
            driver: TransitionDriver::new(Arc::clone(&store)),
            reconciler: Reconciler::new(
                Arc::clone(&store),
                Arc::clone(&provider),
                Duration::from_secs(10),
            ),
            reaper: Reaper::new(store, shared, TimeDelta::hours(24)),
            clock,
            provider,
            last_trigger: None,
            last_status: None,
            claims: Vec::new(),
        }
    }
}

impl Default for BotRunWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BotRunWorld {
    BotRunWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a bot identifier from scenario text.
///
/// # Errors
///
/// Returns an error when the identifier is blank.
pub fn parse_bot(raw: &str) -> Result<BotId, eyre::Report> {
    BotId::new(raw).map_err(|err| eyre::eyre!("invalid bot id in scenario: {err}"))
}

/// Parses a status word from scenario text.
///
/// # Errors
///
/// Returns an error for unknown status words.
pub fn parse_status(raw: &str) -> Result<BotStatus, eyre::Report> {
    BotStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}
