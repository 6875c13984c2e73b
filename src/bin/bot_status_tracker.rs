//! Runs the bot status tracker against the external automation service.
//!
//! Usage:
//!
//! ```text
//! bot_status_tracker [bot-id ...]
//! ```
//!
//! Each `bot-id` is registered on start and then reconciled with the service
//! at `BOT_STATUS_PROVIDER_URL` until the process receives Ctrl-C. Scheduling
//! and retention come from the `BOT_STATUS_*` variables read by
//! [`TrackerConfig::from_env`]; log filtering follows `RUST_LOG`.

use std::env;
use std::sync::Arc;

use botwatch::config::{ConfigError, TrackerConfig};
use botwatch::status::{
    adapters::{http::HttpStatusProvider, memory::InMemoryStatusStore},
    ports::ProviderError,
    services::{BotRunError, TrackerRuntime, TriggerBotRequest, WorkerError},
};
use botwatch::telemetry::{self, TelemetryError};
use mockable::DefaultClock;
use thiserror::Error;
use tracing::info;

/// Owner recorded for bots registered from the command line.
const CLI_OWNER: &str = "local";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the tracker process.
#[derive(Debug, Error)]
enum TrackerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("could not build status provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("could not register bot: {0}")]
    Register(#[from] BotRunError),
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
    #[error(transparent)]
    Shutdown(#[from] WorkerError),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    run().await.map_err(Into::into)
}

async fn run() -> Result<(), TrackerError> {
    let config = TrackerConfig::from_env()?;
    telemetry::init_tracing()?;

    let clock = Arc::new(DefaultClock);
    let store = Arc::new(InMemoryStatusStore::new(Arc::clone(&clock)));
    let provider = Arc::new(HttpStatusProvider::new(
        config.provider_base_url.clone(),
        config.provider_timeout(),
    )?);
    let runtime = TrackerRuntime::start(&config, store, provider, clock);

    for bot_id in env::args().skip(1) {
        let receipt = runtime
            .service()
            .trigger(TriggerBotRequest::new(CLI_OWNER).with_bot_id(bot_id))?;
        info!(bot_id = %receipt.bot_id, "tracking bot");
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    runtime.shutdown().await?;
    Ok(())
}
