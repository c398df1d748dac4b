//! System configuration and validation.
//!
//! [`SystemConfig`] is the input for building a
//! [`ParticleSystem`](crate::ParticleSystem). [`validate()`](SystemConfig::validate)
//! checks every structural invariant up front so that construction only
//! fails on algorithm setup errors.

use crate::error::ConfigError;
use crate::occupancy::overlaps;
use crate::particle::Placement;
use amoebot_circuit::MAX_PINS_PER_EDGE;
use amoebot_core::ParticleId;
use amoebot_space::{Direction, GridCoord, Orientation, SpaceError};
use serde::{Deserialize, Serialize};

// ── InitialParticle ─────────────────────────────────────────────────

/// Placement and frame of one particle at the start of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialParticle {
    /// Tail node.
    pub tail: GridCoord,
    /// Global head direction, `None` for a contracted particle.
    pub head_direction: Option<Direction>,
    /// Global direction of the particle's local east.
    pub compass: Direction,
    /// Whether local counter-clockwise is global counter-clockwise.
    pub chirality: bool,
}

impl InitialParticle {
    /// A contracted particle in the global frame.
    pub fn contracted(node: GridCoord) -> Self {
        Self {
            tail: node,
            head_direction: None,
            compass: Direction::E,
            chirality: true,
        }
    }

    /// An expanded particle in the global frame.
    pub fn expanded(tail: GridCoord, head_direction: Direction) -> Self {
        Self {
            head_direction: Some(head_direction),
            ..Self::contracted(tail)
        }
    }

    /// The same particle with another local frame.
    pub fn with_orientation(self, compass: Direction, chirality: bool) -> Self {
        Self {
            compass,
            chirality,
            ..self
        }
    }

    /// Global placement.
    pub fn placement(&self) -> Placement {
        Placement {
            tail: self.tail,
            head_direction: self.head_direction,
        }
    }

    /// The particle's frame, if the compass is cardinal.
    pub fn orientation(&self) -> Result<Orientation, SpaceError> {
        Orientation::new(self.compass, self.chirality)
    }
}

// ── ActivationOrder ─────────────────────────────────────────────────

/// Order in which particles are activated within each phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationOrder {
    /// Ascending particle id.
    #[default]
    Sequential,
    /// A permutation drawn per round from the run seed and the round
    /// number, so a round activates the same way when it is simulated
    /// again after a rewind.
    Shuffled,
}

// ── SystemConfig ────────────────────────────────────────────────────

/// Everything needed to build a particle system besides the algorithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Initial particles; index `i` becomes `ParticleId(i)`.
    pub particles: Vec<InitialParticle>,
    /// Activation order.
    #[serde(default)]
    pub activation_order: ActivationOrder,
    /// Seed for shuffled activation.
    #[serde(default)]
    pub seed: u64,
    /// Round number of the initial state.
    #[serde(default)]
    pub start_round: u64,
    /// The particle that stays in place when its bonded group moves.
    /// Defaults to particle 0.
    #[serde(default)]
    pub anchor: Option<ParticleId>,
}

impl SystemConfig {
    /// A sequential configuration starting at round 0.
    pub fn new(particles: Vec<InitialParticle>) -> Self {
        Self {
            particles,
            activation_order: ActivationOrder::Sequential,
            seed: 0,
            start_round: 0,
            anchor: None,
        }
    }

    /// Check structural invariants for an algorithm with the given
    /// number of pins per edge.
    pub fn validate(&self, pins_per_edge: usize) -> Result<(), ConfigError> {
        // 1. At least one particle.
        if self.particles.is_empty() {
            return Err(ConfigError::NoParticles);
        }
        // 2. Particle count must fit in u32 (ParticleId is u32).
        if u32::try_from(self.particles.len()).is_err() {
            return Err(ConfigError::TooManyParticles {
                count: self.particles.len(),
            });
        }
        for (i, p) in self.particles.iter().enumerate() {
            let particle = ParticleId(i as u32);
            // 3. Compass must be cardinal.
            p.orientation()
                .map_err(|source| ConfigError::Direction { particle, source })?;
            // 4. Head must be cardinal, hence adjacent to the tail.
            if let Some(direction) = p.head_direction.filter(|d| !d.is_cardinal()) {
                return Err(ConfigError::Direction {
                    particle,
                    source: SpaceError::NotCardinal { direction },
                });
            }
        }
        // 5. No two particles share a node.
        let placements: Vec<Placement> = self.particles.iter().map(InitialParticle::placement).collect();
        if let Some((node, ids)) = overlaps(&placements).into_iter().next() {
            return Err(ConfigError::Overlap {
                node,
                first: ids[0],
                second: ids[1],
            });
        }
        // 6. Anchor must name a particle.
        if let Some(anchor) = self.anchor {
            if anchor.index() >= self.particles.len() {
                return Err(ConfigError::AnchorOutOfRange {
                    anchor,
                    count: self.particles.len(),
                });
            }
        }
        // 7. Pins per edge within what pin configurations support.
        if pins_per_edge == 0 || pins_per_edge > MAX_PINS_PER_EDGE {
            return Err(ConfigError::InvalidPinsPerEdge {
                value: pins_per_edge,
                max: MAX_PINS_PER_EDGE,
            });
        }
        Ok(())
    }
}
