//! In-memory adapters for status tracking.

mod store;

pub use store::InMemoryStatusStore;
