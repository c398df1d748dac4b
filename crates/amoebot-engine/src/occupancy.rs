//! Node-to-particle lookup for one set of placements.

use crate::particle::Placement;
use amoebot_core::ParticleId;
use amoebot_space::GridCoord;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The particle part found on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occupant {
    /// The particle.
    pub particle: ParticleId,
    /// Whether the node holds the particle's head. Contracted particles
    /// report `true`.
    pub on_head: bool,
}

/// Which particle occupies each node.
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    nodes: HashMap<GridCoord, Occupant>,
}

impl Occupancy {
    /// Index a consistent set of placements, indexed by particle id.
    ///
    /// If two placements share a node the later particle wins; use
    /// [`overlaps`] first when the input is not known to be consistent.
    pub fn rebuild(placements: &[Placement]) -> Self {
        let mut nodes = HashMap::with_capacity(placements.len() * 2);
        for (i, placement) in placements.iter().enumerate() {
            for (node, on_head) in placement.nodes() {
                nodes.insert(
                    node,
                    Occupant {
                        particle: ParticleId(i as u32),
                        on_head,
                    },
                );
            }
        }
        Self { nodes }
    }

    /// The occupant of `node`.
    pub fn at(&self, node: GridCoord) -> Option<Occupant> {
        self.nodes.get(&node).copied()
    }

    /// Whether any particle occupies `node`.
    pub fn is_occupied(&self, node: GridCoord) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Number of occupied nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is occupied.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Every node claimed by more than one placement, with the claimants in
/// id order. The result is sorted by node.
pub fn overlaps(placements: &[Placement]) -> Vec<(GridCoord, SmallVec<[ParticleId; 2]>)> {
    let mut claims: HashMap<GridCoord, SmallVec<[ParticleId; 2]>> =
        HashMap::with_capacity(placements.len() * 2);
    for (i, placement) in placements.iter().enumerate() {
        for (node, _) in placement.nodes() {
            claims.entry(node).or_default().push(ParticleId(i as u32));
        }
    }
    let mut result: Vec<_> = claims
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect();
    result.sort_by_key(|(node, _)| *node);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use amoebot_space::Direction;

    #[test]
    fn lookup_reports_parts() {
        let placements = [
            Placement::expanded(GridCoord::ORIGIN, Direction::E),
            Placement::contracted(GridCoord::new(0, 1)),
        ];
        let occ = Occupancy::rebuild(&placements);
        assert_eq!(occ.len(), 3);
        assert_eq!(
            occ.at(GridCoord::new(1, 0)),
            Some(Occupant {
                particle: ParticleId(0),
                on_head: true
            })
        );
        assert!(!occ.at(GridCoord::ORIGIN).unwrap().on_head);
        assert!(occ.at(GridCoord::new(0, 1)).unwrap().on_head);
        assert!(!occ.is_occupied(GridCoord::new(5, 5)));
    }

    #[test]
    fn overlaps_are_listed() {
        let placements = [
            Placement::expanded(GridCoord::ORIGIN, Direction::E),
            Placement::contracted(GridCoord::new(1, 0)),
            Placement::contracted(GridCoord::new(3, 0)),
        ];
        let found = overlaps(&placements);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, GridCoord::new(1, 0));
        assert_eq!(found[0].1.as_slice(), &[ParticleId(0), ParticleId(1)]);
        assert!(overlaps(&placements[1..]).is_empty());
    }
}
