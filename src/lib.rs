//! Botwatch: status tracking for long-running meeting bot runs.
//!
//! A bot run is triggered by a client, progresses through early stages
//! reported by an external automation service, and then through late stages
//! executed by a local processing pipeline. This crate keeps the single
//! authoritative status record clients poll, reconciles it with the external
//! service, lets the pipeline claim and advance it, and expires old records.
//!
//! # Architecture
//!
//! Botwatch follows hexagonal architecture principles:
//!
//! - **Domain**: Status order and record lifecycle rules
//! - **Ports**: Store, external provider and pipeline traits
//! - **Adapters**: In-memory store, HTTP provider, manual clock
//!
//! # Modules
//!
//! - [`status`]: Status records, reconciliation, transitions and expiry
//! - [`config`]: Scheduling and retention settings
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod status;
pub mod telemetry;
