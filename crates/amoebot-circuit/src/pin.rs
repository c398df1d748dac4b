//! Individual pins.

use amoebot_space::Direction;

/// One pin of a particle.
///
/// Pins are identified by `label × pins_per_edge + offset`, where `label`
/// is the port label of the edge the pin sits on and `offset` counts pins
/// along that edge in the particle's local counter-clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pin {
    /// Pin id within its configuration.
    pub id: usize,
    /// Port label of the pin's edge.
    pub label: usize,
    /// Position along the edge, `0..pins_per_edge`.
    pub offset: usize,
    /// Local direction of the pin's edge.
    pub direction: Direction,
    /// Whether the edge leaves the head.
    pub on_head: bool,
}

impl Pin {
    /// Whether the edge leaves the tail. Always `false` for pins of a
    /// contracted particle.
    pub fn is_on_tail(&self) -> bool {
        !self.on_head
    }
}
