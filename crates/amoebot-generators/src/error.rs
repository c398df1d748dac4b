//! Error types for particle generation.

use amoebot_space::SpaceError;
use thiserror::Error;

/// Errors raised while producing an initial placement.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// A parameter has a different kind than the generator expects.
    #[error("parameter '{name}' must be {expected}, got {found}")]
    WrongKind {
        /// Parameter name.
        name: String,
        /// Kind the generator reads.
        expected: &'static str,
        /// Kind that was supplied.
        found: &'static str,
    },
    /// A parameter value is outside the accepted range.
    #[error("parameter '{name}' is out of range: {reason}")]
    OutOfRange {
        /// Parameter name.
        name: String,
        /// What is wrong with the value.
        reason: String,
    },
    /// The generator cannot place the requested number of particles.
    #[error("cannot place {requested} particles, at most {available} fit")]
    TooManyParticles {
        /// Requested particle count.
        requested: usize,
        /// Particles the generator can place.
        available: usize,
    },
    /// The shape to fill is unusable.
    #[error(transparent)]
    Shape(#[from] SpaceError),
}
