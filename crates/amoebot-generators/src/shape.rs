//! Particles on the nodes of a shape document.

use crate::error::GenerationError;
use crate::params::GenerationParams;
use crate::{randomize_orientation, GenerationMethod};
use amoebot_engine::InitialParticle;
use amoebot_space::{Direction, GridCoord, Shape};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};

/// Places one contracted particle on each node of a [`Shape`].
///
/// When fewer particles than nodes are requested, nodes are filled in
/// breadth-first order from the shape's first node, so a connected shape
/// yields a connected partial fill.
///
/// Parameters:
///
/// | name | kind | default | meaning |
/// |------|------|---------|---------|
/// | `rotation` | int or range | `0` | counter-clockwise 60° steps around the shape origin |
/// | `offset_x`, `offset_y` | int | `0` | translation applied after rotating |
/// | `random_orientation` | bool | `false` | random compass and chirality |
#[derive(Clone, Debug)]
pub struct ShapeGenerator {
    shape: Shape,
}

impl ShapeGenerator {
    /// A generator for an already validated shape.
    pub fn new(shape: Shape) -> Result<Self, GenerationError> {
        shape.validate()?;
        Ok(Self { shape })
    }

    /// A generator for a shape JSON document.
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        Ok(Self {
            shape: Shape::from_json(json)?,
        })
    }

    /// The shape being filled.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Node indices in breadth-first order from node 0, followed by any
    /// nodes not reachable from it.
    fn fill_order(&self) -> Vec<usize> {
        let nodes = &self.shape.nodes;
        let index: HashMap<GridCoord, usize> = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        let mut visited = vec![false; nodes.len()];
        let mut order = Vec::with_capacity(nodes.len());
        for start in 0..nodes.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut queue = VecDeque::from([start]);
            while let Some(i) = queue.pop_front() {
                order.push(i);
                for dir in Direction::CARDINAL {
                    if let Some(&j) = index.get(&nodes[i].neighbor(dir)) {
                        if !visited[j] {
                            visited[j] = true;
                            queue.push_back(j);
                        }
                    }
                }
            }
        }
        order
    }
}

impl GenerationMethod for ShapeGenerator {
    fn name(&self) -> &str {
        "shape"
    }

    fn generate(
        &self,
        count: usize,
        params: &GenerationParams,
        seed: u64,
    ) -> Result<Vec<InitialParticle>, GenerationError> {
        if count > self.shape.node_count() {
            return Err(GenerationError::TooManyParticles {
                requested: count,
                available: self.shape.node_count(),
            });
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rotation = params.int_or_range("rotation", 0, &mut rng)?.rem_euclid(6) as i32;
        let offset = GridCoord::new(offset_param(params, "offset_x")?, offset_param(params, "offset_y")?);
        let placed = self.shape.rotated(rotation).translated(offset);

        let mut particles: Vec<InitialParticle> = self
            .fill_order()
            .into_iter()
            .take(count)
            .map(|i| InitialParticle::contracted(placed.nodes[i]))
            .collect();
        if params.bool("random_orientation", false)? {
            randomize_orientation(&mut particles, &mut rng);
        }
        tracing::debug!(
            count,
            nodes = self.shape.node_count(),
            rotation,
            %offset,
            "generated particles on shape"
        );
        Ok(particles)
    }
}

fn offset_param(params: &GenerationParams, name: &str) -> Result<i32, GenerationError> {
    let value = params.int(name, 0)?;
    i32::try_from(value).map_err(|_| GenerationError::OutOfRange {
        name: name.to_string(),
        reason: format!("{value} does not fit a grid coordinate"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MinMax, ParamValue};
    use crate::testing::{connected, occupied};
    use amoebot_space::SpaceError;

    const THREE_TRIANGLES: &str = r#"{"shape": {"nodes": [{"x": 0, "y": 0}, {"x": 0, "y": 1}, {"x": 1, "y": 0}, {"x": 1, "y": -1}, {"x": 2, "y": -1}, {"x": 1, "y": 1}, {"x": 2, "y": 0}], "edges": [{"u": 1, "v": 0}, {"u": 1, "v": 2}, {"u": 0, "v": 2}, {"u": 2, "v": 3}, {"u": 2, "v": 4}, {"u": 3, "v": 4}, {"u": 5, "v": 2}, {"u": 5, "v": 6}, {"u": 2, "v": 6}], "faces": [{"u": 1, "v": 0, "w": 2}, {"u": 2, "v": 3, "w": 4}, {"u": 5, "v": 2, "w": 6}]}, "constituents": [], "dependencyTree": []}"#;

    fn generator() -> ShapeGenerator {
        ShapeGenerator::from_json(THREE_TRIANGLES).unwrap()
    }

    #[test]
    fn fills_every_node() {
        let particles = generator().generate(7, &GenerationParams::new(), 0).unwrap();
        let tails: Vec<GridCoord> = particles.iter().map(|p| p.tail).collect();
        assert_eq!(tails.len(), 7);
        for node in &generator().shape().nodes {
            assert!(tails.contains(node));
        }
    }

    #[test]
    fn partial_fill_stays_connected() {
        for count in 1..=7 {
            let particles = generator().generate(count, &GenerationParams::new(), 0).unwrap();
            assert!(connected(&occupied(&particles)), "count {count}");
        }
    }

    #[test]
    fn too_many_particles() {
        assert_eq!(
            generator().generate(8, &GenerationParams::new(), 0),
            Err(GenerationError::TooManyParticles {
                requested: 8,
                available: 7,
            })
        );
    }

    #[test]
    fn rotation_and_offset_move_the_shape() {
        let params = GenerationParams::new()
            .with("rotation", ParamValue::Int(3))
            .with("offset_x", ParamValue::Int(10))
            .with("offset_y", ParamValue::Int(-2));
        let particles = generator().generate(7, &params, 0).unwrap();
        // Node (1, 0) turned by 180° lands on (-1, 0), then moves.
        assert!(particles.iter().any(|p| p.tail == GridCoord::new(9, -2)));
        assert_eq!(particles[0].tail, GridCoord::new(10, -2));
    }

    #[test]
    fn random_rotation_is_seeded() {
        let params = GenerationParams::new().with("rotation", ParamValue::Range(MinMax::new(0.0, 6.0)));
        assert_eq!(
            generator().generate(7, &params, 17).unwrap(),
            generator().generate(7, &params, 17).unwrap()
        );
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let bad = r#"{"nodes":[{"x":0,"y":0},{"x":0,"y":0}]}"#;
        assert!(matches!(
            ShapeGenerator::from_json(bad),
            Err(GenerationError::Shape(SpaceError::InvalidShape { .. }))
        ));
        assert!(matches!(
            ShapeGenerator::from_json("not json"),
            Err(GenerationError::Shape(SpaceError::ShapeFormat { .. }))
        ));
    }
}
