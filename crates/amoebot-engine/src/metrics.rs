//! Per-round performance and activity metrics.
//!
//! [`RoundMetrics`] captures timing and activity data for a single
//! committed round.

/// Timing and activity metrics collected during a single round.
///
/// All durations are in microseconds. The system populates these fields
/// after each committed round; read them through
/// [`ParticleSystem::last_metrics`](crate::ParticleSystem::last_metrics)
/// or the [`RoundReport`](crate::RoundReport).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundMetrics {
    /// Wall-clock time for the entire round, in microseconds.
    pub total_us: u64,
    /// Time spent in `activate_move` calls, in microseconds.
    pub move_phase_us: u64,
    /// Time spent resolving joint movement, in microseconds.
    pub resolution_us: u64,
    /// Time spent in `activate_beep` calls, in microseconds.
    pub beep_phase_us: u64,
    /// Time spent building circuits and delivering signals, in microseconds.
    pub circuit_us: u64,
    /// Time spent recording the round into the histories, in microseconds.
    pub commit_us: u64,
    /// Number of particles whose placement changed.
    pub moved_particles: usize,
    /// Number of circuits.
    pub circuits: usize,
    /// Number of circuits that carried a beep or message.
    pub active_circuits: usize,
    /// Number of partition sets that received a message.
    pub messages_delivered: usize,
    /// Number of message pairs on one circuit that had no order.
    pub ambiguous_messages: usize,
}
