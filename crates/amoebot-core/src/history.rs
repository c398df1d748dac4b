//! Sparse, round-indexed value timelines with a movable read marker.
//!
//! Every mutable field of every particle lives in a [`ValueHistory`].
//! The history stores only the rounds in which the value changed, so a
//! field that stays constant for a thousand rounds costs one entry.
//!
//! Two read positions exist:
//!
//! - **tracking**: the history follows the live simulation and reads
//!   return the latest value.
//! - **paused**: the marker sits on some recorded round and reads return
//!   the value that was current at that round. Recording while paused
//!   discards the old future first, since a new action invalidates it.

use crate::error::HistoryError;

/// A value with its full recorded history.
///
/// Invariants:
/// - `rounds` and `values` have the same non-zero length.
/// - `rounds` is strictly increasing and `rounds[0]` is the earliest round.
/// - Consecutive entries hold different values.
/// - `last_round >= rounds[last]`; the last value stays valid up to it.
/// - While paused, `rounds[0] <= marker <= last_round`.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueHistory<T> {
    rounds: Vec<u64>,
    values: Vec<T>,
    last_round: u64,
    marker: u64,
    tracking: bool,
}

impl<T: Clone + PartialEq> ValueHistory<T> {
    /// Start a history holding `value` from `round` on, in tracking mode.
    pub fn new(value: T, round: u64) -> Self {
        Self {
            rounds: vec![round],
            values: vec![value],
            last_round: round,
            marker: round,
            tracking: true,
        }
    }

    /// Rebuild a history from persisted `(round, value)` entries.
    ///
    /// Entries must be strictly increasing in round and `last_round` must
    /// not precede the final entry. Repeated values are collapsed. The
    /// result is in tracking mode.
    pub fn from_entries(entries: Vec<(u64, T)>, last_round: u64) -> Result<Self, HistoryError> {
        let mut iter = entries.into_iter();
        let (first_round, first_value) = iter.next().ok_or(HistoryError::Empty)?;
        let mut history = Self::new(first_value, first_round);
        for (round, value) in iter {
            if round <= history.last_round {
                return Err(HistoryError::Unordered { round });
            }
            history.push_change(value, round);
        }
        if last_round < history.last_round {
            return Err(HistoryError::Unordered { round: last_round });
        }
        history.last_round = last_round;
        history.marker = last_round;
        Ok(history)
    }

    /// First recorded round.
    pub fn earliest_round(&self) -> u64 {
        self.rounds[0]
    }

    /// Last round this history holds a value for.
    pub fn last_round(&self) -> u64 {
        self.last_round
    }

    /// The round reads currently refer to.
    pub fn marked_round(&self) -> u64 {
        if self.tracking {
            self.last_round
        } else {
            self.marker
        }
    }

    /// Whether the history follows the live round.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// The most recently recorded value, regardless of the marker.
    pub fn latest(&self) -> &T {
        &self.values[self.values.len() - 1]
    }

    /// Number of stored change entries.
    pub fn entry_count(&self) -> usize {
        self.rounds.len()
    }

    /// Stored change entries in round order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.rounds.iter().copied().zip(self.values.iter())
    }

    /// Record `value` as the value in `round`.
    ///
    /// Writing the last recorded round again overwrites it. While paused,
    /// `round` must not precede the marker; everything after the marker
    /// is cut off and tracking resumes before the value is stored.
    pub fn record_value_in_round(&mut self, value: T, round: u64) -> Result<(), HistoryError> {
        if !self.tracking {
            if round < self.marker {
                return Err(HistoryError::RecordBeforeMarker {
                    round,
                    marker: self.marker,
                });
            }
            self.cut_off_at_marker();
            self.tracking = true;
        }
        if round < self.last_round {
            return Err(HistoryError::RecordBeforeLast {
                round,
                last: self.last_round,
            });
        }

        let last = self.values.len() - 1;
        if self.rounds[last] == round {
            self.values[last] = value;
            // Overwriting may make the entry redundant with its predecessor.
            if last > 0 && self.values[last - 1] == self.values[last] {
                self.values.pop();
                self.rounds.pop();
            }
        } else {
            self.push_change(value, round);
        }
        self.last_round = round;
        self.marker = round;
        Ok(())
    }

    /// The value that was current in `round`.
    pub fn value_in_round(&self, round: u64) -> Result<&T, HistoryError> {
        self.check_range(round)?;
        Ok(&self.values[self.index_at(round)])
    }

    /// The value at the marker.
    pub fn marked_value(&self) -> &T {
        if self.tracking {
            self.latest()
        } else {
            &self.values[self.index_at(self.marker)]
        }
    }

    /// Pause tracking and move the marker to `round`.
    pub fn set_marker_to_round(&mut self, round: u64) -> Result<(), HistoryError> {
        self.check_range(round)?;
        self.marker = round;
        self.tracking = false;
        Ok(())
    }

    /// Move the marker one round back, pausing tracking.
    pub fn step_back(&mut self) -> Result<(), HistoryError> {
        let current = self.marked_round();
        if current <= self.earliest_round() {
            return Err(HistoryError::NoEarlierRound {
                round: self.earliest_round(),
            });
        }
        self.marker = current - 1;
        self.tracking = false;
        Ok(())
    }

    /// Move the marker one round forward, pausing tracking.
    pub fn step_forward(&mut self) -> Result<(), HistoryError> {
        let current = self.marked_round();
        if current >= self.last_round {
            return Err(HistoryError::NoLaterRound {
                round: self.last_round,
            });
        }
        self.marker = current + 1;
        self.tracking = false;
        Ok(())
    }

    /// Resume tracking at the last recorded round.
    pub fn continue_tracking(&mut self) {
        self.marker = self.last_round;
        self.tracking = true;
    }

    /// Drop every entry after the marker. The marker becomes the last round.
    ///
    /// Does nothing while tracking. The tracking flag itself is unchanged.
    pub fn cut_off_at_marker(&mut self) {
        if self.tracking {
            return;
        }
        let keep = self.index_at(self.marker) + 1;
        self.rounds.truncate(keep);
        self.values.truncate(keep);
        self.last_round = self.marker;
    }

    /// Add `offset` to every round number.
    ///
    /// Fails without modifying anything if a round would leave `u64`.
    pub fn shift_timescale(&mut self, offset: i64) -> Result<(), HistoryError> {
        let shift = |round: u64| {
            round
                .checked_add_signed(offset)
                .ok_or(HistoryError::TimescaleOutOfRange { offset })
        };
        // Earliest and last bound every stored round.
        shift(self.earliest_round())?;
        let last_round = shift(self.last_round)?;
        let marker = shift(self.marker)?;
        for round in &mut self.rounds {
            *round = shift(*round)?;
        }
        self.last_round = last_round;
        self.marker = marker;
        Ok(())
    }

    fn push_change(&mut self, value: T, round: u64) {
        if *self.latest() != value {
            self.rounds.push(round);
            self.values.push(value);
        }
        self.last_round = round;
    }

    fn check_range(&self, round: u64) -> Result<(), HistoryError> {
        if round < self.earliest_round() || round > self.last_round {
            return Err(HistoryError::RoundOutOfRange {
                round,
                earliest: self.earliest_round(),
                latest: self.last_round,
            });
        }
        Ok(())
    }

    /// Index of the latest entry at or before `round`. `round` must not
    /// precede the earliest entry.
    fn index_at(&self, round: u64) -> usize {
        self.rounds
            .partition_point(|&r| r <= round)
            .saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> ValueHistory<i32> {
        // 0..=2 -> 10, 3..=4 -> 20, 5..=7 -> 30
        let mut h = ValueHistory::new(10, 0);
        for r in 1..=7 {
            let v = match r {
                0..=2 => 10,
                3..=4 => 20,
                _ => 30,
            };
            h.record_value_in_round(v, r).unwrap();
        }
        h
    }

    // ── Recording ───────────────────────────────────────────────

    #[test]
    fn unchanged_values_stay_sparse() {
        let h = sample();
        assert_eq!(h.entry_count(), 3);
        assert_eq!(h.last_round(), 7);
        assert_eq!(h.earliest_round(), 0);
    }

    #[test]
    fn overwrite_same_round() {
        let mut h = ValueHistory::new(1, 0);
        h.record_value_in_round(2, 1).unwrap();
        h.record_value_in_round(3, 1).unwrap();
        assert_eq!(*h.value_in_round(1).unwrap(), 3);
        assert_eq!(h.entry_count(), 2);
    }

    #[test]
    fn overwrite_back_to_previous_value_collapses() {
        let mut h = ValueHistory::new(1, 0);
        h.record_value_in_round(2, 1).unwrap();
        h.record_value_in_round(1, 1).unwrap();
        assert_eq!(h.entry_count(), 1);
        assert_eq!(h.last_round(), 1);
        assert_eq!(*h.value_in_round(1).unwrap(), 1);
    }

    #[test]
    fn record_before_last_fails() {
        let mut h = sample();
        let err = h.record_value_in_round(99, 6).unwrap_err();
        assert_eq!(err, HistoryError::RecordBeforeLast { round: 6, last: 7 });
        assert_eq!(*h.latest(), 30);
    }

    // ── Reading ─────────────────────────────────────────────────

    #[test]
    fn value_in_round_finds_latest_change() {
        let h = sample();
        assert_eq!(*h.value_in_round(0).unwrap(), 10);
        assert_eq!(*h.value_in_round(2).unwrap(), 10);
        assert_eq!(*h.value_in_round(3).unwrap(), 20);
        assert_eq!(*h.value_in_round(4).unwrap(), 20);
        assert_eq!(*h.value_in_round(7).unwrap(), 30);
    }

    #[test]
    fn value_in_round_out_of_range() {
        let h = sample();
        assert_eq!(
            h.value_in_round(8).unwrap_err(),
            HistoryError::RoundOutOfRange {
                round: 8,
                earliest: 0,
                latest: 7
            }
        );
    }

    #[test]
    fn history_starting_late_rejects_earlier_rounds() {
        let h = ValueHistory::new('a', 5);
        assert!(h.value_in_round(4).is_err());
        assert_eq!(*h.value_in_round(5).unwrap(), 'a');
    }

    // ── Marker ──────────────────────────────────────────────────

    #[test]
    fn marker_reads_past_values() {
        let mut h = sample();
        h.set_marker_to_round(3).unwrap();
        assert!(!h.is_tracking());
        assert_eq!(*h.marked_value(), 20);
        assert_eq!(*h.latest(), 30);
    }

    #[test]
    fn set_marker_out_of_range_leaves_state() {
        let mut h = sample();
        assert!(h.set_marker_to_round(42).is_err());
        assert!(h.is_tracking());
        assert_eq!(h.marked_round(), 7);
    }

    #[test]
    fn step_back_and_forward() {
        let mut h = sample();
        h.step_back().unwrap();
        h.step_back().unwrap();
        assert_eq!(h.marked_round(), 5);
        h.step_back().unwrap();
        assert_eq!(*h.marked_value(), 20);
        h.step_forward().unwrap();
        assert_eq!(*h.marked_value(), 30);
    }

    #[test]
    fn step_bounds() {
        let mut h = ValueHistory::new(0u8, 2);
        h.record_value_in_round(1, 3).unwrap();
        assert_eq!(
            h.step_forward().unwrap_err(),
            HistoryError::NoLaterRound { round: 3 }
        );
        h.step_back().unwrap();
        assert_eq!(
            h.step_back().unwrap_err(),
            HistoryError::NoEarlierRound { round: 2 }
        );
        assert_eq!(h.marked_round(), 2);
    }

    #[test]
    fn continue_tracking_returns_to_latest() {
        let mut h = sample();
        h.set_marker_to_round(1).unwrap();
        h.continue_tracking();
        assert!(h.is_tracking());
        assert_eq!(*h.marked_value(), 30);
        assert_eq!(h.marked_round(), 7);
    }

    // ── Cut-off ─────────────────────────────────────────────────

    #[test]
    fn cut_off_discards_future() {
        let mut h = sample();
        h.set_marker_to_round(3).unwrap();
        h.cut_off_at_marker();
        assert_eq!(h.last_round(), 3);
        assert_eq!(h.entry_count(), 2);
        assert!(h.value_in_round(4).is_err());
    }

    #[test]
    fn cut_off_while_tracking_is_noop() {
        let mut h = sample();
        h.cut_off_at_marker();
        assert_eq!(h.last_round(), 7);
    }

    #[test]
    fn recording_while_paused_rewrites_future() {
        let mut h = sample();
        h.set_marker_to_round(3).unwrap();
        h.record_value_in_round(99, 4).unwrap();
        assert!(h.is_tracking());
        assert_eq!(h.last_round(), 4);
        assert_eq!(*h.value_in_round(3).unwrap(), 20);
        assert_eq!(*h.value_in_round(4).unwrap(), 99);
    }

    #[test]
    fn recording_before_paused_marker_fails() {
        let mut h = sample();
        h.set_marker_to_round(3).unwrap();
        assert_eq!(
            h.record_value_in_round(5, 2).unwrap_err(),
            HistoryError::RecordBeforeMarker {
                round: 2,
                marker: 3
            }
        );
        assert_eq!(h.last_round(), 7);
    }

    // ── Timescale ───────────────────────────────────────────────

    #[test]
    fn shift_timescale_moves_every_round() {
        let mut h = sample();
        h.shift_timescale(10).unwrap();
        assert_eq!(h.earliest_round(), 10);
        assert_eq!(h.last_round(), 17);
        assert_eq!(*h.value_in_round(13).unwrap(), 20);
        h.shift_timescale(-10).unwrap();
        assert_eq!(h, sample());
    }

    #[test]
    fn shift_below_zero_is_rejected() {
        let mut h = ValueHistory::new(1, 3);
        assert_eq!(
            h.shift_timescale(-4).unwrap_err(),
            HistoryError::TimescaleOutOfRange { offset: -4 }
        );
        assert_eq!(h.earliest_round(), 3);
    }

    // ── Persistence ─────────────────────────────────────────────

    #[test]
    fn from_entries_roundtrip() {
        let h = sample();
        let entries: Vec<(u64, i32)> = h.entries().map(|(r, v)| (r, *v)).collect();
        let rebuilt = ValueHistory::from_entries(entries, h.last_round()).unwrap();
        assert_eq!(rebuilt, h);
    }

    #[test]
    fn from_entries_rejects_bad_input() {
        assert_eq!(
            ValueHistory::<i32>::from_entries(vec![], 0).unwrap_err(),
            HistoryError::Empty
        );
        assert_eq!(
            ValueHistory::from_entries(vec![(2, 1), (2, 3)], 4).unwrap_err(),
            HistoryError::Unordered { round: 2 }
        );
        assert_eq!(
            ValueHistory::from_entries(vec![(0, 1), (5, 3)], 4).unwrap_err(),
            HistoryError::Unordered { round: 4 }
        );
    }

    // ── Properties ──────────────────────────────────────────────

    proptest! {
        #[test]
        fn record_then_read_returns_value(values in prop::collection::vec(0u8..4, 1..40)) {
            let mut h = ValueHistory::new(values[0], 0);
            for (round, v) in values.iter().enumerate().skip(1) {
                h.record_value_in_round(*v, round as u64).unwrap();
                prop_assert_eq!(*h.value_in_round(round as u64).unwrap(), *v);
            }
            for (round, v) in values.iter().enumerate() {
                prop_assert_eq!(*h.value_in_round(round as u64).unwrap(), *v);
            }
        }

        #[test]
        fn marker_agrees_with_value_in_round(
            values in prop::collection::vec(0u8..4, 1..40),
            pick in 0usize..40,
        ) {
            let mut h = ValueHistory::new(values[0], 0);
            for (round, v) in values.iter().enumerate().skip(1) {
                h.record_value_in_round(*v, round as u64).unwrap();
            }
            let target = (pick % values.len()) as u64;
            h.set_marker_to_round(target).unwrap();
            prop_assert_eq!(*h.marked_value(), values[target as usize]);
        }

        #[test]
        fn stored_rounds_strictly_increase(values in prop::collection::vec(0u8..3, 1..60)) {
            let mut h = ValueHistory::new(values[0], 0);
            for (round, v) in values.iter().enumerate().skip(1) {
                h.record_value_in_round(*v, round as u64).unwrap();
            }
            let rounds: Vec<u64> = h.entries().map(|(r, _)| r).collect();
            prop_assert!(rounds.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
