//! The twelve grid directions.

use crate::coord::GridCoord;
use amoebot_core::ParseValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cardinal unit vectors in axial `(x, y)` order: E, NNE, NNW, W, SSW, SSE.
const CARDINAL_OFFSETS: [(i32, i32); 6] = [
    (1, 0),   // E
    (0, 1),   // NNE
    (-1, 1),  // NNW
    (-1, 0),  // W
    (0, -1),  // SSW
    (1, -1),  // SSE
];

/// A direction on the triangular grid.
///
/// Variants are ordered counter-clockwise in 30° steps starting at east.
/// Even positions are the six **cardinal** directions along grid edges;
/// odd positions are the six **half** directions between them, used to
/// address the corners between two edges.
///
/// Directions carry no frame of their own: the same value is a global
/// direction on the grid or a local direction in some particle's frame,
/// depending on context. [`Orientation`](crate::Orientation) converts
/// between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// East (0°), cardinal.
    E,
    /// East-north-east (30°).
    Ene,
    /// North-north-east (60°), cardinal.
    Nne,
    /// North (90°).
    N,
    /// North-north-west (120°), cardinal.
    Nnw,
    /// West-north-west (150°).
    Wnw,
    /// West (180°), cardinal.
    W,
    /// West-south-west (210°).
    Wsw,
    /// South-south-west (240°), cardinal.
    Ssw,
    /// South (270°).
    S,
    /// South-south-east (300°), cardinal.
    Sse,
    /// East-south-east (330°).
    Ese,
}

impl Direction {
    /// All twelve directions in counter-clockwise order from east.
    pub const ALL: [Self; 12] = [
        Self::E,
        Self::Ene,
        Self::Nne,
        Self::N,
        Self::Nnw,
        Self::Wnw,
        Self::W,
        Self::Wsw,
        Self::Ssw,
        Self::S,
        Self::Sse,
        Self::Ese,
    ];

    /// The six cardinal directions in counter-clockwise order from east.
    pub const CARDINAL: [Self; 6] = [
        Self::E,
        Self::Nne,
        Self::Nnw,
        Self::W,
        Self::Ssw,
        Self::Sse,
    ];

    /// Position in [`ALL`](Self::ALL), i.e. the angle in 30° steps.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The direction `index` 30° steps counter-clockwise from east.
    /// Wraps modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Whether this direction runs along a grid edge.
    pub fn is_cardinal(self) -> bool {
        self.index() % 2 == 0
    }

    /// Position among directions of the same kind (`0..6`).
    ///
    /// For cardinal directions this is the 60° step count from east;
    /// for half directions it is the step count from ENE.
    pub fn to_int(self) -> usize {
        self.index() / 2
    }

    /// Inverse of [`to_int`](Self::to_int). Wraps modulo 6.
    pub fn from_int(value: usize, cardinal: bool) -> Self {
        Self::from_index((value % 6) * 2 + usize::from(!cardinal))
    }

    /// Rotate by `steps` × 30°, counter-clockwise for positive steps.
    pub fn rotate30(self, steps: i32) -> Self {
        Self::from_index((self.index() as i32 + steps).rem_euclid(12) as usize)
    }

    /// Rotate by `steps` × 60°, counter-clockwise for positive steps.
    pub fn rotate60(self, steps: i32) -> Self {
        self.rotate30(2 * steps)
    }

    /// The direction rotated by 180°.
    pub fn opposite(self) -> Self {
        self.rotate30(6)
    }

    /// Counter-clockwise 30° steps needed to turn `self` into `to` (`0..12`).
    pub fn steps_to(self, to: Self) -> usize {
        (to.index() + 12 - self.index()) % 12
    }

    /// Grid offset of this direction.
    ///
    /// Cardinal directions give the unit vector to the adjacent node. Half
    /// directions give the sum of the two neighbouring cardinal vectors,
    /// the node across the shared corner.
    pub fn offset(self) -> GridCoord {
        if self.is_cardinal() {
            let (x, y) = CARDINAL_OFFSETS[self.to_int()];
            GridCoord::new(x, y)
        } else {
            self.rotate30(-1).offset() + self.rotate30(1).offset()
        }
    }

    /// The cardinal direction whose unit vector is `offset`, if any.
    pub fn from_offset(offset: GridCoord) -> Option<Self> {
        CARDINAL_OFFSETS
            .iter()
            .position(|&(x, y)| x == offset.x && y == offset.y)
            .map(|i| Self::from_int(i, true))
    }

    /// Short upper-case name (`"E"`, `"ENE"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::Ene => "ENE",
            Self::Nne => "NNE",
            Self::N => "N",
            Self::Nnw => "NNW",
            Self::Wnw => "WNW",
            Self::W => "W",
            Self::Wsw => "WSW",
            Self::Ssw => "SSW",
            Self::S => "S",
            Self::Sse => "SSE",
            Self::Ese => "ESE",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseValueError::new(s, "direction"))
    }
}
