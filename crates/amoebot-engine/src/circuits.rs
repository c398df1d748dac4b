//! Wiring of pin configurations across neighboring particles.

use crate::occupancy::Occupancy;
use crate::particle::{Particle, Placement};
use amoebot_circuit::{facing_offset, CircuitBuilder, CircuitError, CircuitOutcome, PinConfiguration};
use amoebot_space::ports::{label_of_port, port_count, port_of_label};
use amoebot_space::Port;

/// Build the circuits of a round and deliver its signals.
///
/// `configs[i]` is the configuration particle `i` uses this round; its
/// expansion must match `placements[i]`. Every pair of particles that
/// shares an edge is wired pin by pin.
pub(crate) fn connect(
    particles: &[Particle],
    placements: &[Placement],
    occupancy: &Occupancy,
    configs: &[PinConfiguration],
    pins_per_edge: usize,
) -> Result<CircuitOutcome, CircuitError> {
    let mut builder = CircuitBuilder::new(configs.iter().collect());
    for (i, (particle, placement)) in particles.iter().zip(placements).enumerate() {
        let frame = particle.orientation();
        let head = placement.head_direction.map(|d| frame.to_local(d));
        for label in 0..port_count(head) {
            let Some(port) = port_of_label(label, head) else {
                continue;
            };
            let global = frame.to_global(port.direction);
            let node = placement.part(port.on_head).neighbor(global);
            let Some(occupant) = occupancy.at(node) else {
                continue;
            };
            let j = occupant.particle.index();
            if j <= i {
                continue;
            }
            let other = &particles[j];
            let other_frame = other.orientation();
            let other_head = placements[j]
                .head_direction
                .map(|d| other_frame.to_local(d));
            let back = Port::new(other_frame.to_local(global.opposite()), occupant.on_head);
            let Some(other_label) = label_of_port(back, other_head) else {
                continue;
            };
            for offset in 0..pins_per_edge {
                let facing = facing_offset(
                    offset,
                    pins_per_edge,
                    frame.chirality(),
                    other_frame.chirality(),
                );
                builder.connect(
                    i,
                    label * pins_per_edge + offset,
                    j,
                    other_label * pins_per_edge + facing,
                )?;
            }
        }
    }
    Ok(builder.resolve())
}
