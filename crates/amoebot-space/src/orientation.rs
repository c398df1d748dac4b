//! Mapping between particle-local and global directions.

use crate::direction::Direction;
use crate::error::SpaceError;
use serde::{Deserialize, Serialize};

/// A particle's fixed frame of reference.
///
/// `compass` is the global direction the particle calls local east.
/// `chirality` is its sense of rotation: `true` means the particle's
/// counter-clockwise is the grid's counter-clockwise, `false` means the
/// particle's frame is mirrored.
///
/// Both are chosen when the particle is created and never change.
///
/// # Examples
///
/// ```
/// use amoebot_space::{Direction, Orientation};
///
/// let frame = Orientation::new(Direction::Nne, false).unwrap();
/// // Local east is the compass direction.
/// assert_eq!(frame.to_global(Direction::E), Direction::Nne);
/// // Mirrored frame: local counter-clockwise is global clockwise.
/// assert_eq!(frame.to_global(Direction::Nne), Direction::E);
/// assert_eq!(frame.to_local(Direction::E), Direction::Nne);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Orientation {
    compass: Direction,
    chirality: bool,
}

impl Orientation {
    /// The identity frame: compass east, counter-clockwise chirality.
    pub const GLOBAL: Self = Self {
        compass: Direction::E,
        chirality: true,
    };

    /// A frame with the given compass direction and chirality.
    ///
    /// Returns `Err(SpaceError::NotCardinal)` if `compass` is a half
    /// direction.
    pub fn new(compass: Direction, chirality: bool) -> Result<Self, SpaceError> {
        if !compass.is_cardinal() {
            return Err(SpaceError::NotCardinal { direction: compass });
        }
        Ok(Self { compass, chirality })
    }

    /// Global direction of local east.
    pub fn compass(self) -> Direction {
        self.compass
    }

    /// Whether local counter-clockwise is global counter-clockwise.
    pub fn chirality(self) -> bool {
        self.chirality
    }

    /// Convert a local direction to the global grid frame.
    pub fn to_global(self, local: Direction) -> Direction {
        let steps = if self.chirality {
            local.index()
        } else {
            (12 - local.index()) % 12
        };
        Direction::from_index(steps + self.compass.index())
    }

    /// Convert a global direction to this particle's local frame.
    pub fn to_local(self, global: Direction) -> Direction {
        let steps = self.compass.steps_to(global);
        Direction::from_index(if self.chirality {
            steps
        } else {
            (12 - steps) % 12
        })
    }

    /// Convert a local rotation (in 30° steps, counter-clockwise positive)
    /// to the corresponding global rotation.
    pub fn rotation_to_global(self, steps: i32) -> i32 {
        if self.chirality {
            steps
        } else {
            -steps
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::GLOBAL
    }
}
