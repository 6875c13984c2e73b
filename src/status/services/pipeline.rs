//! Pipeline entrypoint that claims a run and reports each stage.

use std::sync::Arc;

use tracing::{info, warn};

use super::{TransitionDriver, TransitionOutcome};
use crate::status::{
    domain::{BotId, BotStatus},
    ports::{PipelineError, ProcessingPipeline, StatusStore, StatusStoreResult},
};

/// Final state of a pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineRun {
    /// Another execution already claimed the bot; nothing was processed.
    Duplicate,
    /// Every stage succeeded and the record is done.
    Completed {
        /// Session identifier attached to the record.
        session_id: String,
    },
    /// A stage failed and the record is in `error`.
    Failed {
        /// Stage that failed.
        stage: BotStatus,
        /// Message stored on the record.
        message: String,
    },
    /// The record stopped accepting transitions mid-run, for example because a
    /// callback completed it first.
    Interrupted {
        /// Stage that could not be entered.
        stage: BotStatus,
        /// Driver decision for that stage.
        outcome: TransitionOutcome,
    },
}

/// Runs the processing pipeline for a bot while keeping its status current.
pub struct PipelineRunner<S, P>
where
    S: StatusStore,
    P: ProcessingPipeline,
{
    driver: TransitionDriver<S>,
    pipeline: Arc<P>,
}

impl<S, P> PipelineRunner<S, P>
where
    S: StatusStore,
    P: ProcessingPipeline,
{
    /// Creates a runner reporting through `driver`.
    #[must_use]
    pub const fn new(driver: TransitionDriver<S>, pipeline: Arc<P>) -> Self {
        Self { driver, pipeline }
    }

    /// Claims the bot and drives it through transcription, analysis and task
    /// creation.
    ///
    /// A failed claim returns [`PipelineRun::Duplicate`] without touching the
    /// pipeline. A failing stage moves the record to `error`, unless the
    /// record became terminal meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`crate::status::ports::StatusStoreError::NotFound`] when the
    /// record does not exist or expires during the run.
    pub async fn run(&self, bot_id: &BotId) -> StatusStoreResult<PipelineRun> {
        if !self.driver.claim(bot_id)? {
            return Ok(PipelineRun::Duplicate);
        }

        if let Some(stop) = self.enter(bot_id, BotStatus::Transcribing)? {
            return Ok(stop);
        }
        let transcript = match self.pipeline.transcribe(bot_id).await {
            Ok(transcript) => transcript,
            Err(err) => return self.abort(bot_id, BotStatus::Transcribing, &err),
        };

        if let Some(stop) = self.enter(bot_id, BotStatus::AnalyzingMeeting)? {
            return Ok(stop);
        }
        let analysis = match self.pipeline.analyze(bot_id, &transcript).await {
            Ok(analysis) => analysis,
            Err(err) => return self.abort(bot_id, BotStatus::AnalyzingMeeting, &err),
        };

        if let Some(stop) = self.enter(bot_id, BotStatus::CreatingTasks)? {
            return Ok(stop);
        }
        let output = match self.pipeline.create_tasks(bot_id, &analysis).await {
            Ok(output) => output,
            Err(err) => return self.abort(bot_id, BotStatus::CreatingTasks, &err),
        };

        let session_id = output.session_id;
        match self
            .driver
            .complete(bot_id, session_id.clone(), &output.result_data)?
        {
            TransitionOutcome::Applied => {
                info!(bot_id = %bot_id, session_id = %session_id, "pipeline finished");
                Ok(PipelineRun::Completed { session_id })
            }
            outcome => Ok(PipelineRun::Interrupted {
                stage: BotStatus::Done,
                outcome,
            }),
        }
    }

    fn enter(&self, bot_id: &BotId, stage: BotStatus) -> StatusStoreResult<Option<PipelineRun>> {
        match self.driver.advance(bot_id, stage)? {
            TransitionOutcome::Applied => Ok(None),
            outcome => Ok(Some(PipelineRun::Interrupted { stage, outcome })),
        }
    }

    fn abort(
        &self,
        bot_id: &BotId,
        stage: BotStatus,
        err: &PipelineError,
    ) -> StatusStoreResult<PipelineRun> {
        let message = format!("{stage} failed: {err}");
        warn!(bot_id = %bot_id, stage = %stage, error = %err, "pipeline stage failed");
        match self.driver.fail(bot_id, message.clone())? {
            TransitionOutcome::Applied => Ok(PipelineRun::Failed { stage, message }),
            outcome => Ok(PipelineRun::Interrupted { stage, outcome }),
        }
    }
}
