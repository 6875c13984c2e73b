//! Adapter implementations for the status ports.
//!
//! - [`memory`]: in-memory status store
//! - [`http`]: REST client for the external automation service
//! - [`clock`]: manually driven clock for deterministic runs

pub mod clock;
pub mod http;
pub mod memory;

pub use clock::ManualClock;
