//! Port contracts for bot status tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by the status
//! services.

pub mod pipeline;
pub mod provider;
pub mod store;

pub use pipeline::{
    MeetingAnalysis, PipelineError, PipelineOutput, PipelineResult, ProcessingPipeline,
    Transcript,
};
pub use provider::{ExternalStatus, ExternalStatusProvider, ProviderError, ProviderResult};
pub use store::{
    RecordMutation, RecordPredicate, StatusStore, StatusStoreError, StatusStoreResult,
};
