//! Hashing of the simulation state at the round marker.
//!
//! Uses FNV-1a for fast, deterministic hashing. These hashes are not
//! cryptographically secure; they detect divergence between a saved and
//! a restored run, or between two runs that should be identical.

use amoebot_engine::record::MessageRecord;
use amoebot_engine::{Particle, ParticleSystem};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Running FNV-1a state.
#[derive(Clone, Copy, Debug)]
struct Fnv(u64);

impl Fnv {
    fn new() -> Self {
        Self(FNV_OFFSET)
    }

    #[inline]
    fn byte(&mut self, byte: u8) {
        self.0 = (self.0 ^ byte as u64).wrapping_mul(FNV_PRIME);
    }

    fn bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.byte(b);
        }
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }

    /// Length-prefixed, so adjacent strings cannot run into each other.
    fn str(&mut self, s: &str) {
        self.u64(s.len() as u64);
        self.bytes(s.as_bytes());
    }
}

/// Hash the state of every particle at the current round marker.
///
/// Covers the marker round, the anchor, and for each particle its
/// position, frame, pin configuration, received signals, color and
/// attribute values. Two systems that read the same at their markers
/// hash equal, whatever their histories look like elsewhere.
pub fn state_hash(system: &ParticleSystem) -> u64 {
    let mut h = Fnv::new();
    h.u64(system.current_round());
    h.u32(system.anchor().0);
    h.u64(system.particles().len() as u64);
    for particle in system.particles() {
        hash_particle(&mut h, particle);
    }
    h.0
}

fn hash_particle(h: &mut Fnv, p: &Particle) {
    h.u32(p.id().0);
    h.i32(p.tail().x);
    h.i32(p.tail().y);
    match p.global_head_direction() {
        Some(d) => h.byte(d.index() as u8),
        None => h.byte(0xFF),
    }
    h.byte(p.compass_dir().index() as u8);
    h.byte(u8::from(p.chirality()));

    h.str(&p.pin_configuration().to_string());
    h.u64(p.received_beeps().len() as u64);
    for &beep in p.received_beeps() {
        h.byte(u8::from(beep));
    }
    for message in p.received_messages() {
        match message {
            Some(m) => {
                let record = MessageRecord::capture(m);
                h.byte(1);
                h.str(&record.type_name);
                for (name, value) in &record.fields {
                    h.str(name);
                    h.str(value);
                }
            }
            None => h.byte(0),
        }
    }

    for bits in p.main_color().to_bits() {
        h.u32(bits);
    }
    h.byte(u8::from(p.main_color_set()));
    for slot in p.attributes().slots() {
        h.str(slot.name());
        h.str(&slot.value().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amoebot_core::ParticleId;
    use amoebot_space::Direction;
    use amoebot_test_utils::fixtures::{CounterFactory, ScriptedFactory, Step};
    use amoebot_test_utils::{line_config, system_with};

    #[test]
    fn same_run_same_hash() {
        let mut a = system_with(&line_config(3), &CounterFactory::new(5));
        let mut b = system_with(&line_config(3), &CounterFactory::new(5));
        a.run(3).unwrap();
        b.run(3).unwrap();
        assert_eq!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn hash_follows_the_marker() {
        let mut system = system_with(&line_config(2), &CounterFactory::new(5));
        let initial = state_hash(&system);
        system.run(2).unwrap();
        let after = state_hash(&system);
        assert_ne!(initial, after);

        system.set_marker_to_round(0).unwrap();
        assert_eq!(state_hash(&system), initial);
        system.set_marker_to_round(2).unwrap();
        assert_eq!(state_hash(&system), after);
    }

    #[test]
    fn movement_changes_the_hash() {
        let still = ScriptedFactory::new();
        let moving = ScriptedFactory::new().at(ParticleId(0), 1, Step::Expand(Direction::W));
        let mut a = system_with(&line_config(2), &still);
        let mut b = system_with(&line_config(2), &moving);
        a.simulate_round().unwrap();
        b.simulate_round().unwrap();
        assert_ne!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn length_prefix_separates_strings() {
        let mut a = Fnv::new();
        a.str("ab");
        a.str("c");
        let mut b = Fnv::new();
        b.str("a");
        b.str("bc");
        assert_ne!(a.0, b.0);
    }
}
