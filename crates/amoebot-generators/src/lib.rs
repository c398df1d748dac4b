//! Initial particle placements for amoebot simulations.
//!
//! A [`GenerationMethod`] turns a particle count, a set of named
//! [`GenerationParams`] and a seed into the [`InitialParticle`]s of a
//! [`SystemConfig`]. The same inputs always produce the same placement.
//!
//! - [`LineGenerator`]: particles in a straight line
//! - [`BlobGenerator`]: a random connected blob grown from the origin
//! - [`ShapeGenerator`]: particles on the nodes of a shape document

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod blob;
pub mod error;
pub mod line;
pub mod params;
pub mod shape;

pub use blob::BlobGenerator;
pub use error::GenerationError;
pub use line::LineGenerator;
pub use params::{GenerationParams, MinMax, ParamValue};
pub use shape::ShapeGenerator;

use amoebot_engine::{InitialParticle, SystemConfig};
use amoebot_space::Direction;
use rand::Rng;

/// A way of placing the particles of a new system.
pub trait GenerationMethod {
    /// Short name used in logs and saved runs.
    fn name(&self) -> &str;

    /// Place `count` particles.
    ///
    /// Every random choice is drawn from a generator seeded with `seed`.
    fn generate(
        &self,
        count: usize,
        params: &GenerationParams,
        seed: u64,
    ) -> Result<Vec<InitialParticle>, GenerationError>;

    /// A sequential [`SystemConfig`] holding the generated particles,
    /// with the same seed for shuffled activation.
    fn config(
        &self,
        count: usize,
        params: &GenerationParams,
        seed: u64,
    ) -> Result<SystemConfig, GenerationError> {
        let mut config = SystemConfig::new(self.generate(count, params, seed)?);
        config.seed = seed;
        Ok(config)
    }
}

/// Read a cardinal direction parameter given by name (`"E"`, `"NNE"`, ...).
pub(crate) fn cardinal_param(
    params: &GenerationParams,
    name: &str,
    default: Direction,
) -> Result<Direction, GenerationError> {
    let value = params.enum_name(name, default.name())?;
    let direction: Direction = value.parse().map_err(|_| GenerationError::OutOfRange {
        name: name.to_string(),
        reason: format!("'{value}' is not a direction"),
    })?;
    if !direction.is_cardinal() {
        return Err(GenerationError::OutOfRange {
            name: name.to_string(),
            reason: format!("{direction} is not cardinal"),
        });
    }
    Ok(direction)
}

/// Give every particle a random compass direction and chirality.
pub(crate) fn randomize_orientation<R: Rng + ?Sized>(particles: &mut [InitialParticle], rng: &mut R) {
    for p in particles {
        let compass = Direction::CARDINAL[rng.random_range(0..Direction::CARDINAL.len())];
        *p = p.with_orientation(compass, rng.random_bool(0.5));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use amoebot_engine::InitialParticle;
    use amoebot_space::GridCoord;
    use std::collections::HashSet;

    /// Every node occupied by the particles, panicking on overlap.
    pub fn occupied(particles: &[InitialParticle]) -> HashSet<GridCoord> {
        let mut nodes = HashSet::new();
        for p in particles {
            assert!(nodes.insert(p.tail), "tail {} used twice", p.tail);
            if let Some(dir) = p.head_direction {
                let head = p.tail.neighbor(dir);
                assert!(nodes.insert(head), "head {head} used twice");
            }
        }
        nodes
    }

    /// Whether the occupied nodes form one connected component.
    pub fn connected(nodes: &HashSet<GridCoord>) -> bool {
        let Some(&start) = nodes.iter().next() else {
            return true;
        };
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for dir in amoebot_space::Direction::CARDINAL {
                let next = node.neighbor(dir);
                if nodes.contains(&next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.len() == nodes.len()
    }
}
