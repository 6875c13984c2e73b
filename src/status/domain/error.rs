//! Error types for bot status domain validation and parsing.

use super::{BotId, BotStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating status records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusDomainError {
    /// The bot identifier is empty after trimming.
    #[error("bot identifier must not be empty")]
    EmptyBotId,

    /// The owner identifier is empty after trimming.
    #[error("owner identifier must not be empty")]
    EmptyOwnerId,

    /// The requested status change violates the lifecycle order.
    #[error("invalid status transition for bot {bot_id} from {from} to {to}")]
    InvalidTransition {
        /// Bot whose record rejected the change.
        bot_id: BotId,
        /// Status before the attempted change.
        from: BotStatus,
        /// Requested target status.
        to: BotStatus,
    },

    /// The record has already been claimed by the transition driver or has
    /// reached a terminal status.
    #[error("bot {0} has already been claimed")]
    AlreadyClaimed(BotId),

    /// A late-stage change was attempted before the record was claimed.
    #[error("bot {0} has not been claimed for processing")]
    NotClaimed(BotId),
}

/// Error returned while parsing bot statuses from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown bot status: {0}")]
pub struct ParseBotStatusError(pub String);
