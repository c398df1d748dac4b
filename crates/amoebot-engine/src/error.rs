//! Error types for particle actions, rounds and movement resolution.

use amoebot_circuit::CircuitError;
use amoebot_core::{FieldError, HistoryError, ParticleId};
use amoebot_space::{Direction, GridCoord, SpaceError};
use std::fmt;
use thiserror::Error;

/// The phase of a round in which an algorithm ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Movement and bond decisions.
    Move,
    /// Pin configuration and signal decisions.
    Beep,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "move"),
            Self::Beep => write!(f, "beep"),
        }
    }
}

/// An action an algorithm attempted that is invalid in the particle's
/// current state. Nothing is changed when one of these is returned.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ActionError {
    /// Expansion requires a contracted particle.
    #[error("particle is already expanded")]
    AlreadyExpanded,
    /// Contraction or pull handover requires an expanded particle.
    #[error("particle is not expanded")]
    NotExpanded,
    /// A direction or port does not exist.
    #[error(transparent)]
    Space(#[from] SpaceError),
    /// A handover or neighbor query expected a neighbor that is not there.
    #[error("no neighbor in direction {direction} of the {part}")]
    NoNeighbor {
        /// Local direction.
        direction: Direction,
        /// `"head"` or `"tail"`.
        part: &'static str,
    },
    /// A handover partner has the wrong expansion state.
    #[error("handover partner {partner} must be {required}")]
    HandoverPartnerState {
        /// The neighbor.
        partner: ParticleId,
        /// `"expanded"` or `"contracted"`.
        required: &'static str,
    },
    /// An attribute name was registered twice for one particle.
    #[error("attribute '{name}' already exists")]
    DuplicateAttribute {
        /// The attribute name.
        name: String,
    },
    /// An attribute handle was read or written with the wrong type.
    #[error("attribute '{name}' holds {found}, not {expected}")]
    AttributeType {
        /// The attribute name.
        name: String,
        /// The type the handle expects.
        expected: String,
        /// The type stored in the slot.
        found: String,
    },
    /// An attribute handle does not belong to this particle.
    #[error("attribute slot {index} does not exist")]
    UnknownAttribute {
        /// The handle's slot index.
        index: usize,
    },
    /// A pin configuration or partition set operation failed.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    /// Recording an initial value failed.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// Algorithm-specific failure.
    #[error("{0}")]
    Algorithm(String),
}

/// A reason the scheduled movements of a round cannot all happen.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MovementConflict {
    /// An expansion targets a node held by a particle that is neither
    /// bonded to the expanding part nor its handover partner.
    #[error("particle {particle} cannot expand into {node}: occupied by {occupant}")]
    ExpansionBlocked {
        /// The expanding particle.
        particle: ParticleId,
        /// The target node.
        node: GridCoord,
        /// The particle holding the node.
        occupant: ParticleId,
    },
    /// A handover whose partner does not perform the complementary action.
    #[error("particle {particle} has no matching handover partner at {node}")]
    HandoverMismatch {
        /// The particle that scheduled the handover.
        particle: ParticleId,
        /// The node the handover goes through.
        node: GridCoord,
        /// The particle found at the node, if any.
        partner: Option<ParticleId>,
    },
    /// Bonds require two different translations for one particle.
    #[error(
        "bonds between {first} and {second} disagree: {second} must move by {expected} but moves by {actual}"
    )]
    BondDisagreement {
        /// The particle whose translation was already fixed.
        first: ParticleId,
        /// The particle with contradicting constraints.
        second: ParticleId,
        /// The translation implied by the bond being checked.
        expected: GridCoord,
        /// The translation assigned earlier.
        actual: GridCoord,
    },
    /// Two particles end the round on the same node.
    #[error("particles {first} and {second} both end on {node}")]
    Overlap {
        /// The contested node.
        node: GridCoord,
        /// Lower particle id.
        first: ParticleId,
        /// Higher particle id.
        second: ParticleId,
    },
}

/// Why a round could not be completed. The system state is unchanged.
#[derive(Debug, Error)]
pub enum RoundError {
    /// An algorithm call returned an error.
    #[error("particle {particle} failed in the {phase} phase: {source}")]
    InvalidAction {
        /// The active particle.
        particle: ParticleId,
        /// The phase it ran in.
        phase: Phase,
        /// The reported error.
        #[source]
        source: ActionError,
    },
    /// Movement resolution found conflicts.
    #[error("round {round} rejected with {} movement conflict(s)", .conflicts.len())]
    MovementConflict {
        /// The round that was being simulated.
        round: u64,
        /// Every conflict found.
        conflicts: Vec<MovementConflict>,
    },
    /// Pin configurations could not be wired into circuits.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    /// Committing the round to the histories failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Errors detected while building a system from a [`SystemConfig`](crate::SystemConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration has no particles.
    #[error("a particle system needs at least one particle")]
    NoParticles,
    /// More particles than `u32` ids can address.
    #[error("{count} particles exceed the id range")]
    TooManyParticles {
        /// The configured count.
        count: usize,
    },
    /// A particle's compass or head direction is not cardinal.
    #[error("particle {particle}: {source}")]
    Direction {
        /// The offending particle.
        particle: ParticleId,
        /// The rejected direction.
        #[source]
        source: SpaceError,
    },
    /// Two particles share a node.
    #[error("particles {first} and {second} both occupy {node}")]
    Overlap {
        /// The contested node.
        node: GridCoord,
        /// First particle.
        first: ParticleId,
        /// Second particle.
        second: ParticleId,
    },
    /// The anchor id is not a particle.
    #[error("anchor {anchor} is out of range for {count} particles")]
    AnchorOutOfRange {
        /// The configured anchor.
        anchor: ParticleId,
        /// Number of particles.
        count: usize,
    },
    /// The algorithm reports an unsupported number of pins per edge.
    #[error("pins per edge must be in 1..={max}, got {value}")]
    InvalidPinsPerEdge {
        /// The reported value.
        value: usize,
        /// Largest supported value.
        max: usize,
    },
    /// No particle with this id exists.
    #[error("particle {particle} does not exist")]
    UnknownParticle {
        /// The requested id.
        particle: ParticleId,
    },
    /// A named attribute could not be assigned.
    #[error("particle {particle}: {source}")]
    Field {
        /// The edited particle.
        particle: ParticleId,
        /// Underlying field error.
        #[source]
        source: FieldError,
    },
    /// The algorithm factory failed for one particle.
    #[error("setting up particle {particle} failed: {source}")]
    Setup {
        /// The particle being built.
        particle: ParticleId,
        /// The factory's error.
        #[source]
        source: ActionError,
    },
    /// A history operation failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Structural problems that make a persisted run unusable.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The record was written by a different algorithm.
    #[error("record was written by algorithm '{found}', not '{expected}'")]
    AlgorithmMismatch {
        /// The factory's algorithm name.
        expected: String,
        /// The recorded algorithm name.
        found: String,
    },
    /// The record uses a different number of pins per edge.
    #[error("record uses {found} pins per edge, algorithm uses {expected}")]
    PinsPerEdgeMismatch {
        /// The factory's value.
        expected: usize,
        /// The recorded value.
        found: usize,
    },
    /// Position data of a particle cannot be used.
    #[error("particle {particle}: unusable {field} history: {reason}")]
    Placement {
        /// The particle.
        particle: ParticleId,
        /// `"tail"` or `"expansion"`.
        field: &'static str,
        /// What is wrong.
        reason: String,
    },
    /// The recorded round bounds are inconsistent.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// Rebuilding the initial system failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
