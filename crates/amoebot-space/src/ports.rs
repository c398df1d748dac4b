//! Port labelling for contracted and expanded particles.
//!
//! A port is an edge leaving one of a particle's occupied nodes. A
//! contracted particle has six ports, one per cardinal direction. An
//! expanded particle has ten: five around its head and five around its
//! tail, excluding the internal edge between them.
//!
//! Labels enumerate ports counter-clockwise along the particle's outline.
//! For an expanded particle with head direction `h` (pointing from tail
//! to head) the order is:
//!
//! ```text
//! label  0    1    2    3    4    5    6    7    8    9
//! part   head head head tail tail tail tail tail head head
//! dir    h    h+1  h+2  h+1  h+2  h+3  h+4  h+5  h+4  h+5
//! ```
//!
//! where `h+k` is `h` rotated by `k` × 60°. All functions here are frame
//! agnostic: directions and head direction just have to be given in the
//! same frame.

use crate::direction::Direction;
use smallvec::SmallVec;

/// Number of ports of a contracted particle.
pub const CONTRACTED_PORTS: usize = 6;

/// Number of ports of an expanded particle.
pub const EXPANDED_PORTS: usize = 10;

/// One edge leaving a particle.
///
/// For contracted particles head and tail coincide and `on_head` is
/// always `true`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Port {
    /// Cardinal direction of the edge.
    pub direction: Direction,
    /// Whether the edge leaves the head (`true`) or the tail.
    pub on_head: bool,
}

impl Port {
    /// A port on the given part.
    pub fn new(direction: Direction, on_head: bool) -> Self {
        Self { direction, on_head }
    }

    /// `"head"` or `"tail"`, for messages.
    pub fn part_name(self) -> &'static str {
        if self.on_head {
            "head"
        } else {
            "tail"
        }
    }
}

/// Number of ports for the given expansion state.
pub fn port_count(head_direction: Option<Direction>) -> usize {
    match head_direction {
        None => CONTRACTED_PORTS,
        Some(_) => EXPANDED_PORTS,
    }
}

/// The port with the given label, if the label exists.
///
/// `head_direction` is `None` for contracted particles and must be a
/// cardinal direction otherwise.
pub fn port_of_label(label: usize, head_direction: Option<Direction>) -> Option<Port> {
    match head_direction {
        None => (label < CONTRACTED_PORTS).then(|| Port::new(Direction::from_int(label, true), true)),
        Some(h) => {
            let (steps, on_head) = match label {
                0..=2 => (label, true),
                3..=7 => (label - 2, false),
                8 | 9 => (label - 4, true),
                _ => return None,
            };
            Some(Port::new(h.rotate60(steps as i32), on_head))
        }
    }
}

/// The label of `port`, or `None` if the particle has no such port.
///
/// For contracted particles `port.on_head` is ignored. For expanded
/// particles the head port towards the tail and the tail port towards the
/// head do not exist.
pub fn label_of_port(port: Port, head_direction: Option<Direction>) -> Option<usize> {
    if !port.direction.is_cardinal() {
        return None;
    }
    match head_direction {
        None => Some(port.direction.to_int()),
        Some(h) => {
            let steps = h.steps_to(port.direction) / 2;
            match (port.on_head, steps) {
                (true, 0..=2) => Some(steps),
                (true, 4 | 5) => Some(steps + 4),
                (false, 1..=5) => Some(steps + 2),
                _ => None,
            }
        }
    }
}

/// All ports in label order.
pub fn ports(head_direction: Option<Direction>) -> SmallVec<[Port; EXPANDED_PORTS]> {
    (0..port_count(head_direction))
        .filter_map(|label| port_of_label(label, head_direction))
        .collect()
}

/// Whether the node behind `port` is adjacent to both parts of an expanded
/// particle.
///
/// These are the head ports `h±2` and the tail ports `h±1`. Contracted
/// particles have no such ports.
pub fn faces_both_parts(port: Port, head_direction: Option<Direction>) -> bool {
    let Some(h) = head_direction else {
        return false;
    };
    let steps = h.steps_to(port.direction) / 2;
    if port.on_head {
        steps == 2 || steps == 4
    } else {
        steps == 1 || steps == 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;
    use proptest::prelude::*;

    #[test]
    fn contracted_labels_follow_cardinals() {
        let p = ports(None);
        assert_eq!(p.len(), 6);
        for (i, port) in p.iter().enumerate() {
            assert_eq!(port.direction, Direction::from_int(i, true));
            assert_eq!(label_of_port(*port, None), Some(i));
        }
    }

    #[test]
    fn contracted_label_ignores_part() {
        assert_eq!(label_of_port(Port::new(Direction::W, false), None), Some(3));
    }

    #[test]
    fn expanded_layout_east() {
        let p = ports(Some(Direction::E));
        let expected = [
            (Direction::E, true),
            (Direction::Nne, true),
            (Direction::Nnw, true),
            (Direction::Nne, false),
            (Direction::Nnw, false),
            (Direction::W, false),
            (Direction::Ssw, false),
            (Direction::Sse, false),
            (Direction::Ssw, true),
            (Direction::Sse, true),
        ];
        assert_eq!(p.len(), 10);
        for (port, (dir, head)) in p.iter().zip(expected) {
            assert_eq!(*port, Port::new(dir, head));
        }
    }

    #[test]
    fn internal_edges_have_no_label() {
        let h = Some(Direction::Nnw);
        assert_eq!(label_of_port(Port::new(Direction::Sse, true), h), None);
        assert_eq!(label_of_port(Port::new(Direction::Nnw, false), h), None);
        assert_eq!(label_of_port(Port::new(Direction::N, true), h), None);
        assert_eq!(port_of_label(10, h), None);
        assert_eq!(port_of_label(6, None), None);
    }

    #[test]
    fn shared_ports_touch_both_nodes() {
        // Tail at origin, head east.
        let h = Direction::E;
        let tail = GridCoord::ORIGIN;
        let head = tail.neighbor(h);
        for port in ports(Some(h)) {
            let from = if port.on_head { head } else { tail };
            let node = from.neighbor(port.direction);
            let touches_both = node.is_adjacent(head) && node.is_adjacent(tail);
            assert_eq!(faces_both_parts(port, Some(h)), touches_both, "{port:?}");
        }
        assert!(!faces_both_parts(Port::new(Direction::E, true), None));
    }

    #[test]
    fn outline_is_counter_clockwise() {
        // Consecutive labels reach nodes that are adjacent or identical,
        // walking around the particle without crossing it.
        let h = Direction::Nne;
        let tail = GridCoord::new(2, 3);
        let head = tail.neighbor(h);
        let nodes: Vec<GridCoord> = ports(Some(h))
            .iter()
            .map(|p| {
                let from = if p.on_head { head } else { tail };
                from.neighbor(p.direction)
            })
            .collect();
        for i in 0..nodes.len() {
            let a = nodes[i];
            let b = nodes[(i + 1) % nodes.len()];
            assert!(a == b || a.is_adjacent(b), "labels {i} and {}", i + 1);
        }
    }

    proptest! {
        #[test]
        fn label_bijection(h in 0usize..7) {
            let head_direction = (h < 6).then(|| Direction::from_int(h, true));
            for label in 0..port_count(head_direction) {
                let port = port_of_label(label, head_direction).unwrap();
                prop_assert_eq!(label_of_port(port, head_direction), Some(label));
            }
        }
    }
}
