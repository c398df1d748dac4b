//! Axial node coordinates on the triangular grid.

use crate::direction::Direction;
use amoebot_core::ParseValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Vertical distance between two grid rows in world units.
const ROW_HEIGHT: f32 = 0.866_025_4;

/// A node of the triangular grid in axial coordinates.
///
/// The x axis points east and the y axis north-north-east, so the six
/// neighbours of a node differ by the cardinal offsets of
/// [`Direction::offset`]. Grid distance is
/// `(|dx| + |dy| + |dx + dy|) / 2`.
///
/// # Examples
///
/// ```
/// use amoebot_space::{Direction, GridCoord};
///
/// let a = GridCoord::new(2, -1);
/// let b = a.neighbor(Direction::Nnw);
/// assert_eq!(b, GridCoord::new(1, 0));
/// assert_eq!(a.distance(b), 1);
/// assert_eq!(a.direction_to(b), Some(Direction::Nnw));
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    /// East axis.
    pub x: i32,
    /// North-north-east axis.
    pub y: i32,
}

impl GridCoord {
    /// The grid origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// A coordinate from its axial components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The node one step away in `dir`.
    ///
    /// For half directions this is the node across the corner, two edges away.
    pub fn neighbor(self, dir: Direction) -> Self {
        self + dir.offset()
    }

    /// Number of grid edges on a shortest path to `other`.
    pub fn distance(self, other: Self) -> u32 {
        let d = other - self;
        (d.x.unsigned_abs() + d.y.unsigned_abs() + (d.x + d.y).unsigned_abs()) / 2
    }

    /// Whether `other` is one of the six neighbours of this node.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }

    /// The cardinal direction from this node to an adjacent node.
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::from_offset(other - self)
    }

    /// Rotate around the origin by `steps` × 60°, counter-clockwise for
    /// positive steps.
    pub fn rotate(self, steps: i32) -> Self {
        let rot = steps.rem_euclid(6);
        let x_axis = Direction::from_int(rot as usize, true).offset();
        let y_axis = Direction::from_int(rot as usize + 1, true).offset();
        x_axis * self.x + y_axis * self.y
    }

    /// Cartesian position with unit edge length, for drawing.
    pub fn to_world(self) -> (f32, f32) {
        (
            self.x as f32 + self.y as f32 / 2.0,
            self.y as f32 * ROW_HEIGHT,
        )
    }
}

impl Add for GridCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for GridCoord {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for GridCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for GridCoord {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for GridCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for GridCoord {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for GridCoord {
    type Err = ParseValueError;

    /// Parses `(x, y)` or `x,y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::new(s, "grid coordinate");
        let inner = s.trim();
        let inner = inner
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(inner);
        let (x, y) = inner.split_once(',').ok_or_else(err)?;
        Ok(Self::new(
            x.trim().parse().map_err(|_| err())?,
            y.trim().parse().map_err(|_| err())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(x: i32, y: i32) -> GridCoord {
        GridCoord::new(x, y)
    }

    #[test]
    fn neighbours_are_adjacent() {
        for d in Direction::CARDINAL {
            let n = c(3, -2).neighbor(d);
            assert!(c(3, -2).is_adjacent(n));
            assert_eq!(c(3, -2).direction_to(n), Some(d));
        }
    }

    #[test]
    fn half_direction_is_two_steps() {
        for d in Direction::ALL.into_iter().filter(|d| !d.is_cardinal()) {
            assert_eq!(GridCoord::ORIGIN.distance(GridCoord::ORIGIN.neighbor(d)), 2);
        }
    }

    #[test]
    fn distance_examples() {
        assert_eq!(c(0, 0).distance(c(0, 0)), 0);
        assert_eq!(c(0, 0).distance(c(3, 0)), 3);
        assert_eq!(c(0, 0).distance(c(2, -2)), 2);
        assert_eq!(c(0, 0).distance(c(2, 2)), 4);
    }

    #[test]
    fn rotate_matches_direction_rotation() {
        for d in Direction::CARDINAL {
            assert_eq!(d.offset().rotate(1), d.rotate60(1).offset());
            assert_eq!(d.offset().rotate(-2), d.rotate60(-2).offset());
        }
    }

    #[test]
    fn rotate_full_turn_is_identity() {
        assert_eq!(c(4, -7).rotate(6), c(4, -7));
        assert_eq!(c(4, -7).rotate(3), c(-4, 7));
    }

    #[test]
    fn parse_forms() {
        assert_eq!("(3, -4)".parse::<GridCoord>().unwrap(), c(3, -4));
        assert_eq!("3,-4".parse::<GridCoord>().unwrap(), c(3, -4));
        assert!("3".parse::<GridCoord>().is_err());
        assert!("(a, 1)".parse::<GridCoord>().is_err());
    }

    #[test]
    fn world_position_of_unit_vectors() {
        let (x, y) = c(0, 1).to_world();
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y - ROW_HEIGHT).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn distance_is_metric(
            ax in -50i32..50, ay in -50i32..50,
            bx in -50i32..50, by in -50i32..50,
            cx in -50i32..50, cy in -50i32..50,
        ) {
            let (a, b, cc) = (c(ax, ay), c(bx, by), c(cx, cy));
            prop_assert_eq!(a.distance(b), b.distance(a));
            prop_assert!(a.distance(cc) <= a.distance(b) + b.distance(cc));
            prop_assert_eq!(a.distance(a), 0);
        }

        #[test]
        fn rotation_preserves_distance(x in -50i32..50, y in -50i32..50, r in -6i32..6) {
            let p = c(x, y);
            prop_assert_eq!(GridCoord::ORIGIN.distance(p.rotate(r)), GridCoord::ORIGIN.distance(p));
        }

        #[test]
        fn display_parse_roundtrip(x in -1000i32..1000, y in -1000i32..1000) {
            prop_assert_eq!(c(x, y).to_string().parse::<GridCoord>().unwrap(), c(x, y));
        }
    }
}
