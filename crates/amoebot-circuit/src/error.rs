//! Error types for pin configurations and circuits.

use amoebot_space::{Direction, SpaceError};
use thiserror::Error;

/// Errors from pin configuration edits and circuit construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// `pins_per_edge` is zero or above [`MAX_PINS_PER_EDGE`](crate::MAX_PINS_PER_EDGE).
    #[error("pins per edge must be in 1..={max}, got {pins_per_edge}")]
    InvalidPinsPerEdge {
        /// The rejected value.
        pins_per_edge: usize,
        /// The supported maximum.
        max: usize,
    },
    /// A pin id is outside the configuration.
    #[error("pin {pin} does not exist in a configuration with {count} pins")]
    PinOutOfRange {
        /// The requested pin.
        pin: usize,
        /// Number of pins.
        count: usize,
    },
    /// A partition set id is outside the configuration.
    #[error("partition set {set} does not exist in a configuration with {count} sets")]
    PartitionSetOutOfRange {
        /// The requested set.
        set: usize,
        /// Number of partition set ids.
        count: usize,
    },
    /// A pin offset is not smaller than the number of pins per edge.
    #[error("pin offset {offset} exceeds {pins_per_edge} pins per edge")]
    OffsetOutOfRange {
        /// The requested offset.
        offset: usize,
        /// Pins per edge of the configuration.
        pins_per_edge: usize,
    },
    /// The requested port does not exist for the expansion state.
    #[error(transparent)]
    Space(#[from] SpaceError),
    /// A configuration was used with a particle in a different expansion state.
    #[error("configuration expects head direction {found:?}, particle has {expected:?}")]
    ExpansionMismatch {
        /// The particle's local head direction.
        expected: Option<Direction>,
        /// The configuration's head direction.
        found: Option<Direction>,
    },
    /// A configuration was built for a different number of pins per edge.
    #[error("configuration has {found} pins per edge, expected {expected}")]
    PinsPerEdgeMismatch {
        /// Pins per edge of the run.
        expected: usize,
        /// Pins per edge of the configuration.
        found: usize,
    },
    /// A persisted configuration string could not be parsed.
    #[error("malformed pin configuration '{input}'")]
    Malformed {
        /// The rejected input.
        input: String,
    },
    /// No message type with this name is registered.
    #[error("unknown message type '{type_name}'")]
    UnknownMessageType {
        /// The persisted type name.
        type_name: String,
    },
}
