//! HTTP adapters for external collaborators.

mod provider;

pub use provider::HttpStatusProvider;
