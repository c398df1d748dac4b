//! Joint movement resolution.
//!
//! After every particle scheduled its movement, the resolver decides
//! where every particle ends up. Each particle has a *stationary part*
//! (the node that keeps its place relative to the particle) and each of
//! its ports an *offset*: the displacement of the port's node relative
//! to the stationary part. A bond between port `a` of `p` and port `b`
//! of `q` forces the group translations to satisfy
//!
//! ```text
//! T(q) = T(p) + off(a) - off(b)
//! ```
//!
//! and handover partners must satisfy `T(p) = T(q)`. Only a push handover
//! or a pull handover pairs two particles; a plain expansion into a node
//! that a plain contraction vacates goes through their bond instead, and
//! is blocked when that bond is released. Translations are
//! solved by a breadth-first pass over every connected group, rooted at
//! the anchor for the anchor's group and at the lowest id otherwise.
//! Every conflict found along the way is reported; the resolution only
//! succeeds if there are none.

use crate::error::MovementConflict;
use crate::occupancy::{overlaps, Occupancy};
use crate::particle::Placement;
use crate::round::{MovementAction, RoundState};
use amoebot_core::ParticleId;
use amoebot_space::ports::{faces_both_parts, label_of_port, ports, EXPANDED_PORTS};
use amoebot_space::{Direction, GridCoord, Orientation, Port};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::trace;

/// Movement input of one particle, indexed by particle id.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MoveRequest {
    pub placement: Placement,
    pub orientation: Orientation,
    pub action: Option<MovementAction>,
    pub released: [bool; EXPANDED_PORTS],
    pub marked: [bool; EXPANDED_PORTS],
}

impl MoveRequest {
    pub(crate) fn new(placement: Placement, orientation: Orientation, state: &RoundState) -> Self {
        Self {
            placement,
            orientation,
            action: state.movement(),
            released: *state.released(),
            marked: *state.marked(),
        }
    }

    /// Local label of a port given in global terms.
    fn label(&self, port: Port) -> Option<usize> {
        let local = Port::new(self.orientation.to_local(port.direction), port.on_head);
        let head = self
            .placement
            .head_direction
            .map(|d| self.orientation.to_local(d));
        label_of_port(local, head)
    }
}

/// Outcome of a successful resolution.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Resolution {
    /// Final placement of every particle.
    pub placements: Vec<Placement>,
    /// Number of particles whose placement changed.
    pub moved: usize,
}

/// A movement in global terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motion {
    Stay,
    Expand(Direction),
    ContractTail,
    ContractHead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Handover {
    None,
    Push,
    Pull(Direction),
}

#[derive(Clone, Copy, Debug)]
struct Plan {
    motion: Motion,
    handover: Handover,
}

impl Plan {
    fn of(req: &MoveRequest) -> Self {
        let g = |d: Direction| req.orientation.to_global(d);
        let (motion, handover) = match (req.action, req.placement.is_expanded()) {
            (Some(MovementAction::Expand(d)), false) => (Motion::Expand(g(d)), Handover::None),
            (Some(MovementAction::PushHandover(d)), false) => (Motion::Expand(g(d)), Handover::Push),
            (Some(MovementAction::ContractTail), true) => (Motion::ContractTail, Handover::None),
            (Some(MovementAction::ContractHead), true) => (Motion::ContractHead, Handover::None),
            (Some(MovementAction::PullHandoverTail(d)), true) => {
                (Motion::ContractTail, Handover::Pull(g(d)))
            }
            (Some(MovementAction::PullHandoverHead(d)), true) => {
                (Motion::ContractHead, Handover::Pull(g(d)))
            }
            // The move context rejects every other combination.
            _ => (Motion::Stay, Handover::None),
        };
        Self { motion, handover }
    }

    /// Node given up by a contraction.
    fn vacated(&self, placement: &Placement) -> Option<GridCoord> {
        match self.motion {
            Motion::ContractTail => Some(placement.head()),
            Motion::ContractHead => Some(placement.tail),
            _ => None,
        }
    }

    /// Node entered by an expansion.
    fn entered(&self, placement: &Placement) -> Option<GridCoord> {
        match self.motion {
            Motion::Expand(d) => Some(placement.tail.neighbor(d)),
            _ => None,
        }
    }

    /// Node of the neighbor a pull handover hands its node to.
    fn pull_target(&self, placement: &Placement) -> Option<GridCoord> {
        match (self.handover, self.motion) {
            (Handover::Pull(d), Motion::ContractTail) => Some(placement.head().neighbor(d)),
            (Handover::Pull(d), Motion::ContractHead) => Some(placement.tail.neighbor(d)),
            _ => None,
        }
    }

    /// Displacement of the node behind `port` relative to the stationary part.
    fn offset(&self, req: &MoveRequest, port: Port, label: usize) -> GridCoord {
        let marked = req.marked[label];
        match (self.motion, req.placement.head_direction) {
            (Motion::Stay, _) => GridCoord::ORIGIN,
            (Motion::Expand(d), _) => {
                let along = port.direction == d
                    || (marked && (port.direction == d.rotate60(1) || port.direction == d.rotate60(-1)));
                if along {
                    d.offset()
                } else {
                    GridCoord::ORIGIN
                }
            }
            (Motion::ContractTail, Some(e)) => {
                if port.on_head && (marked || !faces_both_parts(port, Some(e))) {
                    -e.offset()
                } else {
                    GridCoord::ORIGIN
                }
            }
            (Motion::ContractHead, Some(e)) => {
                if !port.on_head && (marked || !faces_both_parts(port, Some(e))) {
                    e.offset()
                } else {
                    GridCoord::ORIGIN
                }
            }
            _ => GridCoord::ORIGIN,
        }
    }

    /// Where the particle ends up when its stationary part moves by `t`.
    fn finish(&self, placement: Placement, t: GridCoord) -> Placement {
        match self.motion {
            Motion::Stay => placement.translated(t),
            Motion::Expand(d) => Placement::expanded(placement.tail + t, d),
            Motion::ContractTail => Placement::contracted(placement.tail + t),
            Motion::ContractHead => Placement::contracted(placement.head() + t),
        }
    }
}

/// Resolve the joint movement of a round.
///
/// `requests` holds one entry per particle in id order and `occupancy`
/// indexes their start-of-round placements.
pub(crate) fn resolve(
    requests: &[MoveRequest],
    occupancy: &Occupancy,
    anchor: ParticleId,
) -> Result<Resolution, Vec<MovementConflict>> {
    let n = requests.len();
    let plans: Vec<Plan> = requests.iter().map(Plan::of).collect();
    let mut conflicts = Vec::new();

    // ── Handover pairing and expansion targets ──────────────────────

    let mut partners: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (i, (req, plan)) in requests.iter().zip(&plans).enumerate() {
        if let Motion::Expand(direction) = plan.motion {
            let node = req.placement.tail.neighbor(direction);
            let occupant = occupancy.at(node).map(|o| o.particle.index());
            match occupant {
                None if plan.handover == Handover::Push => {
                    conflicts.push(MovementConflict::HandoverMismatch {
                        particle: ParticleId(i as u32),
                        node,
                        partner: None,
                    });
                }
                None => {}
                Some(j) => {
                    let q = &plans[j];
                    let q_place = &requests[j].placement;
                    // Only handover actions pair up.
                    let pulled = q.pull_target(q_place) == Some(req.placement.tail);
                    let pushed = plan.handover == Handover::Push && q.pull_target(q_place).is_none();
                    let hands_over = q.vacated(q_place) == Some(node) && (pulled || pushed);
                    if hands_over {
                        partners.insert((i.min(j), i.max(j)));
                    } else if plan.handover == Handover::Push {
                        conflicts.push(MovementConflict::HandoverMismatch {
                            particle: ParticleId(i as u32),
                            node,
                            partner: Some(ParticleId(j as u32)),
                        });
                    } else if !bonded(requests, occupancy, i, Port::new(direction, true)) {
                        conflicts.push(MovementConflict::ExpansionBlocked {
                            particle: ParticleId(i as u32),
                            node,
                            occupant: ParticleId(j as u32),
                        });
                    }
                }
            }
        }
        if let (Some(target), Some(vacated)) = (plan.pull_target(&req.placement), plan.vacated(&req.placement)) {
            let occupant = occupancy.at(target).map(|o| o.particle.index());
            let paired = occupant.filter(|&j| {
                let q_place = &requests[j].placement;
                plans[j].entered(q_place) == Some(vacated) && q_place.tail == target
            });
            match paired {
                Some(j) => {
                    partners.insert((i.min(j), i.max(j)));
                }
                None => conflicts.push(MovementConflict::HandoverMismatch {
                    particle: ParticleId(i as u32),
                    node: vacated,
                    partner: occupant.map(|j| ParticleId(j as u32)),
                }),
            }
        }
    }

    // ── Bond graph ──────────────────────────────────────────────────

    let mut edges: Vec<Vec<(usize, GridCoord)>> = vec![Vec::new(); n];
    for (i, req) in requests.iter().enumerate() {
        for port in ports(req.placement.head_direction) {
            let node = req.placement.part(port.on_head).neighbor(port.direction);
            let Some(occupant) = occupancy.at(node) else {
                continue;
            };
            let j = occupant.particle.index();
            if j <= i || partners.contains(&(i, j)) {
                continue;
            }
            let q = &requests[j];
            let back = Port::new(port.direction.opposite(), occupant.on_head);
            let (Some(a), Some(b)) = (req.label(port), q.label(back)) else {
                continue;
            };
            if req.released[a] || q.released[b] {
                continue;
            }
            let delta = plans[i].offset(req, port, a) - plans[j].offset(q, back, b);
            edges[i].push((j, delta));
            edges[j].push((i, -delta));
        }
    }
    for &(i, j) in &partners {
        edges[i].push((j, GridCoord::ORIGIN));
        edges[j].push((i, GridCoord::ORIGIN));
    }

    // ── Translations ────────────────────────────────────────────────

    let mut translation: Vec<Option<GridCoord>> = vec![None; n];
    let mut reported: HashSet<(usize, usize)> = HashSet::new();
    let mut queue = VecDeque::new();
    let roots = std::iter::once(anchor.index())
        .filter(|&a| a < n)
        .chain(0..n);
    let mut disagreements = Vec::new();
    for root in roots {
        if translation[root].is_some() {
            continue;
        }
        translation[root] = Some(GridCoord::ORIGIN);
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            let tu = translation[u].unwrap_or_default();
            for &(w, delta) in &edges[u] {
                let expected = tu + delta;
                match translation[w] {
                    None => {
                        translation[w] = Some(expected);
                        queue.push_back(w);
                    }
                    Some(actual) if actual != expected => {
                        if reported.insert((u.min(w), u.max(w))) {
                            disagreements.push(MovementConflict::BondDisagreement {
                                first: ParticleId(u as u32),
                                second: ParticleId(w as u32),
                                expected,
                                actual,
                            });
                        }
                    }
                    Some(_) => {}
                }
            }
        }
    }
    let solved = disagreements.is_empty();
    conflicts.extend(disagreements);

    // ── Final placements ────────────────────────────────────────────

    let placements: Vec<Placement> = requests
        .iter()
        .zip(&plans)
        .zip(&translation)
        .map(|((req, plan), t)| plan.finish(req.placement, t.unwrap_or_default()))
        .collect();
    if solved {
        for (node, ids) in overlaps(&placements) {
            conflicts.push(MovementConflict::Overlap {
                node,
                first: ids[0],
                second: ids[1],
            });
        }
    }

    if !conflicts.is_empty() {
        trace!(conflicts = conflicts.len(), "movement rejected");
        return Err(conflicts);
    }
    let moved = placements
        .iter()
        .zip(requests)
        .filter(|(after, req)| **after != req.placement)
        .count();
    trace!(moved, partners = partners.len(), "movement resolved");
    Ok(Resolution { placements, moved })
}

/// Whether the bond at `port` of particle `i` exists and is kept by both sides.
fn bonded(requests: &[MoveRequest], occupancy: &Occupancy, i: usize, port: Port) -> bool {
    let req = &requests[i];
    let node = req.placement.part(port.on_head).neighbor(port.direction);
    let Some(occupant) = occupancy.at(node) else {
        return false;
    };
    let q = &requests[occupant.particle.index()];
    let back = Port::new(port.direction.opposite(), occupant.on_head);
    match (req.label(port), q.label(back)) {
        (Some(a), Some(b)) => !req.released[a] && !q.released[b],
        _ => false,
    }
}
