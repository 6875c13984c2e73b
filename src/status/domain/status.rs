//! Bot run status values and their total order.

use super::ParseBotStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a bot run.
///
/// Statuses other than [`BotStatus::Error`] form a total order, see
/// [`BotStatus::rank`]. `Error` sits outside the order: it is reachable from
/// every non-terminal status and is itself terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    /// The run has been registered but the bot has not started joining.
    Initialized,
    /// The bot is joining the meeting.
    Connecting,
    /// The bot is in the meeting and recording.
    Connected,
    /// The recording is being transcribed.
    Transcribing,
    /// The transcript is being analysed.
    AnalyzingMeeting,
    /// Tasks are being created from the analysis.
    CreatingTasks,
    /// Processing finished successfully.
    Done,
    /// Processing failed.
    Error,
}

/// Ordered statuses, earliest first. The index of a status is its rank.
const STATUS_ORDER: [BotStatus; 7] = [
    BotStatus::Initialized,
    BotStatus::Connecting,
    BotStatus::Connected,
    BotStatus::Transcribing,
    BotStatus::AnalyzingMeeting,
    BotStatus::CreatingTasks,
    BotStatus::Done,
];

impl BotStatus {
    /// Status assigned to a freshly created record.
    pub const INITIAL: Self = Self::Initialized;

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Transcribing => "transcribing",
            Self::AnalyzingMeeting => "analyzing_meeting",
            Self::CreatingTasks => "creating_tasks",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Returns the position of the status in the lifecycle order.
    ///
    /// `Error` has no rank.
    #[must_use]
    pub fn rank(self) -> Option<usize> {
        STATUS_ORDER.iter().position(|status| *status == self)
    }

    /// Returns `true` when `self` comes strictly after `other`.
    ///
    /// This is the single ordering predicate used by every status transition.
    /// Comparisons involving `Error` are always `false`.
    #[must_use]
    pub fn is_later_than(self, other: Self) -> bool {
        match (self.rank(), other.rank()) {
            (Some(lhs), Some(rhs)) => lhs > rhs,
            _ => false,
        }
    }

    /// Returns `true` for `done` and `error`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns `true` for statuses owned by the reconciler.
    #[must_use]
    pub const fn is_early_stage(self) -> bool {
        matches!(self, Self::Initialized | Self::Connecting | Self::Connected)
    }

    /// Returns `true` for statuses owned by the transition driver.
    #[must_use]
    pub const fn is_late_stage(self) -> bool {
        matches!(
            self,
            Self::Transcribing | Self::AnalyzingMeeting | Self::CreatingTasks | Self::Done
        )
    }

    /// Returns whether the lifecycle permits moving from `self` to `target`.
    ///
    /// Terminal statuses permit nothing. `Error` is reachable from every other
    /// status; all remaining moves must go strictly forward.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Error || target.is_later_than(self)
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BotStatus {
    type Error = ParseBotStatusError;

    fn try_from(value: &str) -> Result<Self, ParseBotStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "initialized" => Ok(Self::Initialized),
            "connecting" => Ok(Self::Connecting),
            "connected" => Ok(Self::Connected),
            "transcribing" => Ok(Self::Transcribing),
            "analyzing_meeting" => Ok(Self::AnalyzingMeeting),
            "creating_tasks" => Ok(Self::CreatingTasks),
            "done" => Ok(Self::Done),
            "error" => Ok(Self::Error),
            _ => Err(ParseBotStatusError(value.to_owned())),
        }
    }
}
