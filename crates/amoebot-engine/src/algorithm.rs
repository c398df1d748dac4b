//! The contract between the engine and distributed algorithms.

use crate::context::{BeepContext, MoveContext, ParticleSetup};
use crate::error::ActionError;
use crate::particle::ParticleView;

/// The per-particle behaviour of a distributed algorithm.
///
/// One instance runs on every particle. Instances take `&self`: any
/// state that must survive a round lives in attributes declared through
/// [`ParticleSetup`], so that moving the system's round marker rewinds
/// the algorithm together with the particles.
///
/// Returning an error from either activation rejects the whole round.
pub trait ParticleAlgorithm: Send + 'static {
    /// Decide on bonds and movement.
    fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError>;

    /// Decide on the pin configuration and send signals.
    fn activate_beep(&self, ctx: &mut BeepContext<'_>) -> Result<(), ActionError>;

    /// Whether this particle has terminated.
    ///
    /// The system is finished once every particle reports `true`.
    fn is_finished(&self, _particle: &ParticleView<'_>) -> bool {
        false
    }
}

/// Builds the algorithm instance of every particle of a run.
pub trait AlgorithmFactory {
    /// Name recorded with saved runs.
    fn name(&self) -> &str;

    /// Pins on every edge of every particle, fixed for the run.
    fn pins_per_edge(&self) -> usize {
        1
    }

    /// Declare the particle's attributes and build its algorithm.
    fn create(&self, setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError>;
}
