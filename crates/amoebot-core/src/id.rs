//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a particle within a particle system.
///
/// Particles are created with the system and assigned sequential IDs.
/// `ParticleId(n)` is the n-th particle of the system configuration and
/// doubles as its index into per-particle storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

impl ParticleId {
    /// The ID as a slice index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ParticleId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
