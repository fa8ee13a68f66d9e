use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored election lifecycle state.
///
/// There is no `Ended` variant: "ended" is derived at call time by
/// comparing the clock against `end_time`, never stored as a flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionState {
    /// No election has been started yet.
    NotStarted,
    /// Started. Votes are accepted strictly before `end_time`.
    Active {
        /// Absolute close of polls, fixed at start time.
        end_time: DateTime<Utc>,
    },
}

impl ElectionState {
    /// Derive the lifecycle phase at `now`.
    pub fn phase(&self, now: DateTime<Utc>) -> ElectionPhase {
        match *self {
            ElectionState::NotStarted => ElectionPhase::NotStarted,
            ElectionState::Active { end_time } if now < end_time => ElectionPhase::Active,
            ElectionState::Active { .. } => ElectionPhase::Ended,
        }
    }

    /// The fixed close of polls, if the election has started.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        match *self {
            ElectionState::NotStarted => None,
            ElectionState::Active { end_time } => Some(end_time),
        }
    }
}

/// The derived lifecycle phase at a particular instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionPhase {
    NotStarted,
    Active,
    Ended,
}

/// A point-in-time snapshot of the lifecycle, for display layers that poll
/// (countdown tickers, results pages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStatus {
    pub phase: ElectionPhase,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds until close of polls; zero unless currently active.
    pub remaining_seconds: i64,
}

impl ElectionStatus {
    pub(crate) fn at(state: ElectionState, now: DateTime<Utc>) -> Self {
        let phase = state.phase(now);
        let end_time = state.end_time();
        let remaining_seconds = match (phase, end_time) {
            (ElectionPhase::Active, Some(end)) => (end - now).num_seconds(),
            _ => 0,
        };
        Self {
            phase,
            end_time,
            remaining_seconds,
        }
    }

    /// Close of polls as a Unix timestamp, zero if not started.
    pub fn end_timestamp(&self) -> i64 {
        self.end_time.map(|end| end.timestamp()).unwrap_or(0)
    }
}
