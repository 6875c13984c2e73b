//! Port for the local processing pipeline that runs the late stages.

use crate::status::domain::BotId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for pipeline stage execution.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Transcript produced by the transcription stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(String);

impl Transcript {
    /// Wraps transcript text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the transcript text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque analysis produced from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingAnalysis(Value);

impl MeetingAnalysis {
    /// Wraps an analysis payload.
    #[must_use]
    pub const fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Returns the analysis payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.0
    }
}

/// Final payload attached to a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Identifier of the processing session.
    pub session_id: String,
    /// Opaque result data exposed to clients.
    pub result_data: Value,
}

/// Failure of a pipeline stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PipelineError(pub String);

impl PipelineError {
    /// Creates a stage failure with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Late-stage processing of a recorded meeting.
#[async_trait]
pub trait ProcessingPipeline: Send + Sync {
    /// Transcribes the recording captured by the bot.
    async fn transcribe(&self, bot_id: &BotId) -> PipelineResult<Transcript>;

    /// Analyses the transcript.
    async fn analyze(
        &self,
        bot_id: &BotId,
        transcript: &Transcript,
    ) -> PipelineResult<MeetingAnalysis>;

    /// Creates tasks from the analysis and returns the final payload.
    async fn create_tasks(
        &self,
        bot_id: &BotId,
        analysis: &MeetingAnalysis,
    ) -> PipelineResult<PipelineOutput>;
}
