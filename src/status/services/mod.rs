//! Application services for bot status tracking.

mod bot_run;
mod driver;
mod pipeline;
mod reaper;
mod reconciler;
mod runtime;
pub mod worker;

pub use bot_run::{
    BotRunError, BotRunResult, BotRunService, CallbackRequest, TriggerBotRequest, TriggerReceipt,
};
pub use driver::{TransitionDriver, TransitionOutcome};
pub use pipeline::{PipelineRun, PipelineRunner};
pub use reaper::{ReapReport, Reaper};
pub use reconciler::{ReconcileReport, Reconciler};
pub use runtime::TrackerRuntime;
pub use worker::{PeriodicTask, WorkerError, WorkerHandle, spawn_periodic};
