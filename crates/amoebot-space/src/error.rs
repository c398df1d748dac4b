//! Error types for grid geometry.

use crate::direction::Direction;
use thiserror::Error;

/// Errors arising from grid construction or geometric queries.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// A cardinal direction was required.
    #[error("direction {direction} is not cardinal")]
    NotCardinal {
        /// The offending direction.
        direction: Direction,
    },
    /// A port does not exist for the particle's expansion state.
    #[error("no port in direction {direction} on the {part}")]
    InvalidPort {
        /// Local port direction.
        direction: Direction,
        /// `"head"` or `"tail"`.
        part: &'static str,
    },
    /// A shape description is structurally invalid.
    #[error("invalid shape: {reason}")]
    InvalidShape {
        /// What went wrong.
        reason: String,
    },
    /// A shape document could not be parsed or written.
    #[error("shape format error: {reason}")]
    ShapeFormat {
        /// Message from the JSON layer.
        reason: String,
    },
}
