//! Particles in a straight line.

use crate::error::GenerationError;
use crate::params::GenerationParams;
use crate::{cardinal_param, randomize_orientation, GenerationMethod};
use amoebot_engine::InitialParticle;
use amoebot_space::{Direction, GridCoord};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Places particles in a line starting at the origin.
///
/// Parameters:
///
/// | name | kind | default | meaning |
/// |------|------|---------|---------|
/// | `direction` | enum | `E` | cardinal direction of the line |
/// | `gap` | int | `0` | empty nodes between consecutive particles |
/// | `expanded` | bool | `false` | expand every particle along the line |
/// | `random_orientation` | bool | `false` | random compass and chirality |
#[derive(Clone, Copy, Debug, Default)]
pub struct LineGenerator;

impl GenerationMethod for LineGenerator {
    fn name(&self) -> &str {
        "line"
    }

    fn generate(
        &self,
        count: usize,
        params: &GenerationParams,
        seed: u64,
    ) -> Result<Vec<InitialParticle>, GenerationError> {
        let direction = cardinal_param(params, "direction", Direction::E)?;
        let gap = params.int("gap", 0)?;
        if !(0..=i64::from(u16::MAX)).contains(&gap) {
            return Err(GenerationError::OutOfRange {
                name: "gap".into(),
                reason: format!("{gap} is not in 0..={}", u16::MAX),
            });
        }
        let expanded = params.bool("expanded", false)?;
        let step = gap as i32 + if expanded { 2 } else { 1 };
        let available = (i32::MAX / step) as usize;
        if count > available {
            return Err(GenerationError::TooManyParticles {
                requested: count,
                available,
            });
        }

        let mut particles: Vec<InitialParticle> = (0..count as i32)
            .map(|i| {
                let tail = GridCoord::ORIGIN + direction.offset() * (i * step);
                if expanded {
                    InitialParticle::expanded(tail, direction)
                } else {
                    InitialParticle::contracted(tail)
                }
            })
            .collect();
        if params.bool("random_orientation", false)? {
            randomize_orientation(&mut particles, &mut ChaCha8Rng::seed_from_u64(seed));
        }
        tracing::debug!(count, %direction, gap, expanded, "generated line");
        Ok(particles)
    }
}
