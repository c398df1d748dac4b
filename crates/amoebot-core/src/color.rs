//! RGBA color values.

use crate::error::ParseValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A color as four `f32` channels in `[0, 1]`.
///
/// Particles carry a main color for visualisation. The engine only stores
/// and replays it; channel values are not clamped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque black, the default particle color.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::rgb(1.0, 0.92, 0.016);
    /// Opaque grey.
    pub const GREY: Self = Self::rgb(0.5, 0.5, 0.5);

    /// A color from all four channels.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Bit patterns of the four channels, for hashing.
    pub fn to_bits(self) -> [u32; 4] {
        [
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = ParseValueError;

    /// Parses `r,g,b` or `r,g,b,a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::new(s, "color");
        let channels = s
            .split(',')
            .map(|c| c.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| err())?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        let c = Color::rgba(0.25, 0.5, 0.75, 0.125);
        let parsed: Color = c.to_string().parse().unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn parse_rgb_defaults_alpha() {
        let c: Color = "1, 0, 0".parse().unwrap();
        assert_eq!(c, Color::RED);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("1,2".parse::<Color>().is_err());
        assert!("a,b,c".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }
}
