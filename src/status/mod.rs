//! Bot run status tracking.
//!
//! A bot run spans an external automation service, which reports the early
//! stages (`initialized`, `connecting`, `connected`), and the local processing
//! pipeline, which runs the late stages up to `done`. Clients only ever see
//! the single record kept here. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Reconciler, reaper, transition driver and request-path services in
//!   [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
