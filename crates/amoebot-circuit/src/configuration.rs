//! Pin configurations: the grouping of a particle's pins into partition sets.

use crate::error::CircuitError;
use crate::message::{Message, MessageBox};
use crate::pin::Pin;
use amoebot_space::ports::{port_count, port_of_label};
use amoebot_space::{Direction, SpaceError};
use std::fmt;

/// Upper bound on pins per edge accepted by any configuration.
pub const MAX_PINS_PER_EDGE: usize = 8;

#[derive(Clone, Debug, Default, PartialEq)]
struct Signal {
    beep: bool,
    message: Option<MessageBox>,
}

/// A partition of a particle's pins into partition sets.
///
/// A configuration with `n` pins always has exactly `n` partition set ids
/// (`0..n`). Every pin belongs to exactly one set, so some sets are empty
/// whenever two pins share a set. The configuration is tied to one
/// expansion state: the local head direction it was created for.
///
/// Besides the partition, a configuration carries the beeps and messages
/// planned for the current round. They are cleared when the
/// configuration is committed.
///
/// # Examples
///
/// ```
/// use amoebot_circuit::PinConfiguration;
/// use amoebot_space::Direction;
///
/// let mut pc = PinConfiguration::singleton(2, None).unwrap();
/// assert_eq!(pc.pin_count(), 12);
///
/// // Join the two pins on the east edge.
/// let a = pc.pin_at(Direction::E, 0, true).unwrap().id;
/// let b = pc.pin_at(Direction::E, 1, true).unwrap().id;
/// pc.make_partition_set(&[a, b], 0).unwrap();
/// assert!(pc.pins_in_same_set(a, b).unwrap());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PinConfiguration {
    pins_per_edge: usize,
    head_direction: Option<Direction>,
    set_of_pin: Vec<usize>,
    signals: Vec<Signal>,
}

impl PinConfiguration {
    /// Every pin in its own partition set, set id equal to pin id.
    ///
    /// `head_direction` is the particle's local head direction, `None` if
    /// contracted.
    pub fn singleton(
        pins_per_edge: usize,
        head_direction: Option<Direction>,
    ) -> Result<Self, CircuitError> {
        let count = Self::checked_pin_count(pins_per_edge, head_direction)?;
        Ok(Self {
            pins_per_edge,
            head_direction,
            set_of_pin: (0..count).collect(),
            signals: vec![Signal::default(); count],
        })
    }

    /// All pins in partition set 0.
    pub fn global(
        pins_per_edge: usize,
        head_direction: Option<Direction>,
    ) -> Result<Self, CircuitError> {
        let mut pc = Self::singleton(pins_per_edge, head_direction)?;
        pc.set_of_pin.fill(0);
        Ok(pc)
    }

    /// Rebuild a configuration from its partition vector (`set_of_pin[i]`
    /// is the set of pin `i`).
    pub fn from_partition(
        pins_per_edge: usize,
        head_direction: Option<Direction>,
        set_of_pin: Vec<usize>,
    ) -> Result<Self, CircuitError> {
        let count = Self::checked_pin_count(pins_per_edge, head_direction)?;
        if set_of_pin.len() != count {
            return Err(CircuitError::PinOutOfRange {
                pin: set_of_pin.len(),
                count,
            });
        }
        if let Some(&set) = set_of_pin.iter().find(|&&s| s >= count) {
            return Err(CircuitError::PartitionSetOutOfRange { set, count });
        }
        Ok(Self {
            pins_per_edge,
            head_direction,
            set_of_pin,
            signals: vec![Signal::default(); count],
        })
    }

    fn checked_pin_count(
        pins_per_edge: usize,
        head_direction: Option<Direction>,
    ) -> Result<usize, CircuitError> {
        if pins_per_edge == 0 || pins_per_edge > MAX_PINS_PER_EDGE {
            return Err(CircuitError::InvalidPinsPerEdge {
                pins_per_edge,
                max: MAX_PINS_PER_EDGE,
            });
        }
        if let Some(direction) = head_direction.filter(|d| !d.is_cardinal()) {
            return Err(SpaceError::NotCardinal { direction }.into());
        }
        Ok(port_count(head_direction) * pins_per_edge)
    }

    // ── Shape ───────────────────────────────────────────────────────

    /// Pins on every edge.
    pub fn pins_per_edge(&self) -> usize {
        self.pins_per_edge
    }

    /// Local head direction the configuration was made for.
    pub fn head_direction(&self) -> Option<Direction> {
        self.head_direction
    }

    /// Whether the configuration belongs to an expanded particle.
    pub fn is_expanded(&self) -> bool {
        self.head_direction.is_some()
    }

    /// Total number of pins, which is also the number of set ids.
    pub fn pin_count(&self) -> usize {
        self.set_of_pin.len()
    }

    /// Check that the configuration fits a particle with the given state.
    pub fn check_compatible(
        &self,
        pins_per_edge: usize,
        head_direction: Option<Direction>,
    ) -> Result<(), CircuitError> {
        if self.pins_per_edge != pins_per_edge {
            return Err(CircuitError::PinsPerEdgeMismatch {
                expected: pins_per_edge,
                found: self.pins_per_edge,
            });
        }
        if self.head_direction != head_direction {
            return Err(CircuitError::ExpansionMismatch {
                expected: head_direction,
                found: self.head_direction,
            });
        }
        Ok(())
    }

    // ── Pins ────────────────────────────────────────────────────────

    /// The pin with the given id.
    pub fn pin(&self, id: usize) -> Result<Pin, CircuitError> {
        self.check_pin(id)?;
        let label = id / self.pins_per_edge;
        let port = port_of_label(label, self.head_direction).ok_or(CircuitError::PinOutOfRange {
            pin: id,
            count: self.pin_count(),
        })?;
        Ok(Pin {
            id,
            label,
            offset: id % self.pins_per_edge,
            direction: port.direction,
            on_head: port.on_head,
        })
    }

    /// The pin at `offset` on the edge in local `direction`, leaving the
    /// head or the tail. `on_head` is ignored for contracted particles.
    pub fn pin_at(
        &self,
        direction: Direction,
        offset: usize,
        on_head: bool,
    ) -> Result<Pin, CircuitError> {
        if offset >= self.pins_per_edge {
            return Err(CircuitError::OffsetOutOfRange {
                offset,
                pins_per_edge: self.pins_per_edge,
            });
        }
        let port = amoebot_space::Port::new(direction, on_head);
        let label = amoebot_space::ports::label_of_port(port, self.head_direction).ok_or(
            SpaceError::InvalidPort {
                direction,
                part: port.part_name(),
            },
        )?;
        self.pin(label * self.pins_per_edge + offset)
    }

    /// All pins in id order.
    pub fn pins(&self) -> impl Iterator<Item = Pin> + '_ {
        (0..self.pin_count()).filter_map(|id| self.pin(id).ok())
    }

    fn check_pin(&self, pin: usize) -> Result<(), CircuitError> {
        if pin >= self.pin_count() {
            return Err(CircuitError::PinOutOfRange {
                pin,
                count: self.pin_count(),
            });
        }
        Ok(())
    }

    fn check_set(&self, set: usize) -> Result<(), CircuitError> {
        if set >= self.pin_count() {
            return Err(CircuitError::PartitionSetOutOfRange {
                set,
                count: self.pin_count(),
            });
        }
        Ok(())
    }

    // ── Partition sets ──────────────────────────────────────────────

    /// Id of the partition set containing `pin`.
    pub fn partition_set_of(&self, pin: usize) -> Result<usize, CircuitError> {
        self.check_pin(pin)?;
        Ok(self.set_of_pin[pin])
    }

    /// A view of partition set `id`.
    pub fn partition_set(&self, id: usize) -> Result<PartitionSet<'_>, CircuitError> {
        self.check_set(id)?;
        Ok(PartitionSet { config: self, id })
    }

    /// All non-empty partition sets in id order.
    pub fn partition_sets(&self) -> impl Iterator<Item = PartitionSet<'_>> + '_ {
        (0..self.pin_count())
            .map(|id| PartitionSet { config: self, id })
            .filter(|set| !set.is_empty())
    }

    /// The partition vector: entry `i` is the set id of pin `i`.
    pub fn partition(&self) -> &[usize] {
        &self.set_of_pin
    }

    /// Whether two pins share a partition set.
    pub fn pins_in_same_set(&self, a: usize, b: usize) -> Result<bool, CircuitError> {
        Ok(self.partition_set_of(a)? == self.partition_set_of(b)?)
    }

    /// Move every pin in `pins` into set `set`. Pins not listed keep
    /// their sets. Nothing changes if any id is out of range.
    pub fn make_partition_set(&mut self, pins: &[usize], set: usize) -> Result<(), CircuitError> {
        self.check_set(set)?;
        for &pin in pins {
            self.check_pin(pin)?;
        }
        for &pin in pins {
            self.set_of_pin[pin] = set;
        }
        Ok(())
    }

    /// Move a single pin into set `set`.
    pub fn add_pin(&mut self, set: usize, pin: usize) -> Result<(), CircuitError> {
        self.make_partition_set(&[pin], set)
    }

    /// Take `pin` out of its set and put it into an empty one. Does
    /// nothing if the pin is already alone. Prefers the set whose id
    /// equals the pin id.
    pub fn remove_pin(&mut self, pin: usize) -> Result<(), CircuitError> {
        let current = self.partition_set_of(pin)?;
        if self.set_size(current) == 1 {
            return Ok(());
        }
        let target = if self.set_size(pin) == 0 {
            pin
        } else {
            // A set with more than one pin leaves at least one id empty.
            match (0..self.pin_count()).find(|&s| self.set_size(s) == 0) {
                Some(s) => s,
                None => return Ok(()),
            }
        };
        self.set_of_pin[pin] = target;
        Ok(())
    }

    /// Move every pin of set `from` into set `into`.
    pub fn merge_partition_sets(&mut self, into: usize, from: usize) -> Result<(), CircuitError> {
        self.check_set(into)?;
        self.check_set(from)?;
        for s in &mut self.set_of_pin {
            if *s == from {
                *s = into;
            }
        }
        Ok(())
    }

    /// Put every pin into its own set again.
    pub fn set_to_singleton(&mut self) {
        for (pin, s) in self.set_of_pin.iter_mut().enumerate() {
            *s = pin;
        }
    }

    /// Put every pin into set `set`.
    pub fn set_to_global(&mut self, set: usize) -> Result<(), CircuitError> {
        self.check_set(set)?;
        self.set_of_pin.fill(set);
        Ok(())
    }

    fn set_size(&self, set: usize) -> usize {
        self.set_of_pin.iter().filter(|&&s| s == set).count()
    }

    // ── Signals ─────────────────────────────────────────────────────

    /// Plan a beep on partition set `set`.
    pub fn send_beep(&mut self, set: usize) -> Result<(), CircuitError> {
        self.check_set(set)?;
        self.signals[set].beep = true;
        Ok(())
    }

    /// Plan a message on partition set `set`, replacing any earlier one.
    pub fn send_message(&mut self, set: usize, message: MessageBox) -> Result<(), CircuitError> {
        self.check_set(set)?;
        self.signals[set].message = Some(message);
        Ok(())
    }

    /// Whether a beep is planned on set `set`. Out of range ids read as
    /// not beeping.
    pub fn is_beeping(&self, set: usize) -> bool {
        self.signals.get(set).is_some_and(|s| s.beep)
    }

    /// The message planned on set `set`, if any.
    pub fn message(&self, set: usize) -> Option<&dyn Message> {
        self.signals
            .get(set)
            .and_then(|s| s.message.as_ref())
            .map(MessageBox::get)
    }

    /// Whether any beep or message is planned.
    pub fn has_signals(&self) -> bool {
        self.signals.iter().any(|s| s.beep || s.message.is_some())
    }

    /// Drop all planned beeps and messages.
    pub fn clear_signals(&mut self) {
        self.signals.fill(Signal::default());
    }

    /// A copy with the same partition and no planned signals.
    pub fn without_signals(&self) -> Self {
        let mut copy = self.clone();
        copy.clear_signals();
        copy
    }
}

/// `pins_per_edge|head|s0,s1,...` with `-` for a contracted particle.
/// Signals are not part of the text form.
impl fmt::Display for PinConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head_direction.map_or("-", Direction::name);
        write!(f, "{}|{}|", self.pins_per_edge, head)?;
        for (i, s) in self.set_of_pin.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for PinConfiguration {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CircuitError::Malformed {
            input: s.to_string(),
        };
        let mut parts = s.trim().splitn(3, '|');
        let (Some(k), Some(head), Some(sets)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let pins_per_edge: usize = k.parse().map_err(|_| malformed())?;
        let head_direction = match head {
            "-" => None,
            name => Some(name.parse::<Direction>().map_err(|_| malformed())?),
        };
        let set_of_pin = sets
            .split(',')
            .map(|v| v.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;
        Self::from_partition(pins_per_edge, head_direction, set_of_pin)
    }
}

/// Read-only view of one partition set.
#[derive(Clone, Copy, Debug)]
pub struct PartitionSet<'a> {
    config: &'a PinConfiguration,
    id: usize,
}

impl<'a> PartitionSet<'a> {
    /// Set id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Ids of the pins in this set, ascending.
    pub fn pin_ids(&self) -> impl Iterator<Item = usize> + 'a {
        let id = self.id;
        self.config
            .set_of_pin
            .iter()
            .enumerate()
            .filter(move |&(_, &s)| s == id)
            .map(|(pin, _)| pin)
    }

    /// The pins in this set, ascending by id.
    pub fn pins(&self) -> impl Iterator<Item = Pin> + 'a {
        let config = self.config;
        self.pin_ids().filter_map(move |id| config.pin(id).ok())
    }

    /// Whether `pin` belongs to this set.
    pub fn contains_pin(&self, pin: usize) -> bool {
        self.config.set_of_pin.get(pin) == Some(&self.id)
    }

    /// Number of pins in the set.
    pub fn len(&self) -> usize {
        self.config.set_size(self.id)
    }

    /// Whether the set has no pins.
    pub fn is_empty(&self) -> bool {
        !self.config.set_of_pin.contains(&self.id)
    }

    /// Whether a beep is planned on this set.
    pub fn is_beeping(&self) -> bool {
        self.config.is_beeping(self.id)
    }

    /// The message planned on this set, if any.
    pub fn message(&self) -> Option<&'a dyn Message> {
        self.config.message(self.id)
    }
}
