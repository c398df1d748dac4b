//! Random connected blobs.

use crate::error::GenerationError;
use crate::params::GenerationParams;
use crate::{randomize_orientation, GenerationMethod};
use amoebot_engine::InitialParticle;
use amoebot_space::{Direction, GridCoord};
use indexmap::IndexSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Grows a connected blob of particles around the origin.
///
/// The first particle sits on the origin. Every further particle takes a
/// random free node adjacent to the blob and, with probability
/// `expanded_fraction`, expands into a random free neighbor of that node.
///
/// Parameters:
///
/// | name | kind | default | meaning |
/// |------|------|---------|---------|
/// | `expanded_fraction` | float or range | `0.0` | probability that a particle is expanded |
/// | `random_orientation` | bool | `false` | random compass and chirality |
#[derive(Clone, Copy, Debug, Default)]
pub struct BlobGenerator;

/// Occupied nodes and the free nodes next to them.
struct Growth {
    occupied: HashSet<GridCoord>,
    // Insertion-ordered so a seed always picks the same node.
    frontier: IndexSet<GridCoord>,
}

impl Growth {
    fn new() -> Self {
        Self {
            occupied: HashSet::new(),
            frontier: IndexSet::from([GridCoord::ORIGIN]),
        }
    }

    fn occupy(&mut self, node: GridCoord) {
        self.occupied.insert(node);
        self.frontier.shift_remove(&node);
        for dir in Direction::CARDINAL {
            let next = node.neighbor(dir);
            if !self.occupied.contains(&next) {
                self.frontier.insert(next);
            }
        }
    }

    fn pick_frontier<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridCoord> {
        let i = rng.random_range(0..self.frontier.len().max(1));
        self.frontier.get_index(i).copied()
    }

    fn free_directions(&self, node: GridCoord) -> Vec<Direction> {
        Direction::CARDINAL
            .into_iter()
            .filter(|d| !self.occupied.contains(&node.neighbor(*d)))
            .collect()
    }
}

impl GenerationMethod for BlobGenerator {
    fn name(&self) -> &str {
        "blob"
    }

    fn generate(
        &self,
        count: usize,
        params: &GenerationParams,
        seed: u64,
    ) -> Result<Vec<InitialParticle>, GenerationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let fraction = params.number("expanded_fraction", 0.0, &mut rng)?;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(GenerationError::OutOfRange {
                name: "expanded_fraction".into(),
                reason: format!("{fraction} is not a probability"),
            });
        }

        let mut growth = Growth::new();
        let mut particles = Vec::with_capacity(count);
        while particles.len() < count {
            let Some(tail) = growth.pick_frontier(&mut rng) else {
                break;
            };
            growth.occupy(tail);
            let mut particle = InitialParticle::contracted(tail);
            if fraction > 0.0 && rng.random_bool(fraction) {
                let free = growth.free_directions(tail);
                if !free.is_empty() {
                    let dir = free[rng.random_range(0..free.len())];
                    growth.occupy(tail.neighbor(dir));
                    particle.head_direction = Some(dir);
                }
            }
            particles.push(particle);
        }

        if params.bool("random_orientation", false)? {
            randomize_orientation(&mut particles, &mut rng);
        }
        let expanded = particles.iter().filter(|p| p.head_direction.is_some()).count();
        tracing::debug!(count, expanded, seed, "generated blob");
        Ok(particles)
    }
}
