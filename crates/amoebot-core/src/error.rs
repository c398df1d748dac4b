//! Error types shared across the amoebot workspace.
//!
//! [`HistoryError`] covers every way a round-indexed read or write can
//! fall outside a recorded timeline. [`FieldError`] and
//! [`ParseValueError`] cover the string encoding used by persistence.

use thiserror::Error;

/// Errors from [`ValueHistory`](crate::ValueHistory) operations.
///
/// Boundary errors (`RoundOutOfRange`, `NoEarlierRound`, `NoLaterRound`)
/// are non-fatal: the history is left unchanged. `RecordBeforeLast` and
/// `RecordBeforeMarker` indicate a scheduler bug.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The requested round lies outside the recorded range.
    #[error("round {round} is outside the recorded range [{earliest}, {latest}]")]
    RoundOutOfRange {
        /// The requested round.
        round: u64,
        /// First recorded round.
        earliest: u64,
        /// Last recorded round.
        latest: u64,
    },
    /// The marker is already at the earliest recorded round.
    #[error("cannot step back past the earliest round {round}")]
    NoEarlierRound {
        /// The earliest recorded round.
        round: u64,
    },
    /// The marker is already at the last recorded round.
    #[error("cannot step forward past the latest round {round}")]
    NoLaterRound {
        /// The last recorded round.
        round: u64,
    },
    /// A value was recorded for a round older than the last recorded one.
    #[error("cannot record round {round}: last recorded round is {last}")]
    RecordBeforeLast {
        /// The round that was written.
        round: u64,
        /// The last recorded round.
        last: u64,
    },
    /// A value was recorded before the marker while tracking was paused.
    #[error("cannot record round {round} before the marker at round {marker}")]
    RecordBeforeMarker {
        /// The round that was written.
        round: u64,
        /// The current marker.
        marker: u64,
    },
    /// Shifting the timescale would move a round below zero or past `u64::MAX`.
    #[error("shifting the timescale by {offset} rounds leaves the valid round range")]
    TimescaleOutOfRange {
        /// The requested offset.
        offset: i64,
    },
    /// Entries handed to `from_entries` are not strictly increasing.
    #[error("history entries are not strictly increasing at round {round}")]
    Unordered {
        /// The first offending round.
        round: u64,
    },
    /// A history must always hold at least one entry.
    #[error("a history needs at least one entry")]
    Empty,
}

/// Errors from assigning named fields through
/// [`HasNamedFields`](crate::HasNamedFields).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The type has no field with this name.
    #[error("unknown field '{name}'")]
    UnknownField {
        /// The requested field name.
        name: String,
    },
    /// The string could not be parsed into the field's type.
    #[error("cannot parse '{value}' as {expected} for field '{name}'")]
    Unparsable {
        /// The field name.
        name: String,
        /// The rejected string.
        value: String,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },
}

/// A string could not be parsed into one of the workspace's value types.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot parse '{input}' as {expected}")]
pub struct ParseValueError {
    /// The rejected input.
    pub input: String,
    /// Human-readable name of the expected type.
    pub expected: &'static str,
}

impl ParseValueError {
    /// Create a parse error for `input`.
    pub fn new(input: impl Into<String>, expected: &'static str) -> Self {
        Self {
            input: input.into(),
            expected,
        }
    }
}
