//! Domain model for bot run status tracking.
//!
//! The domain owns the status order and the record lifecycle rules. Stores,
//! providers and background workers live outside this boundary and mutate
//! records only through the methods defined here.

mod error;
mod ids;
mod record;
mod status;

pub use error::{ParseBotStatusError, StatusDomainError};
pub use ids::{BotId, OwnerId};
pub use record::StatusRecord;
pub use status::BotStatus;
