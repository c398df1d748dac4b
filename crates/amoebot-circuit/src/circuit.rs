//! Circuit construction and signal delivery.
//!
//! Each partition set of each particle is a node of a union-find forest.
//! Connecting two pins across an edge unions their partition sets; the
//! resulting components are the circuits. Beeps are OR-ed over a circuit
//! and messages are reduced to the greatest one.

use crate::configuration::PinConfiguration;
use crate::error::CircuitError;
use crate::message::{Message, MessageBox};
use tracing::warn;

/// Signals received by one particle, indexed by partition set id.
///
/// Empty partition sets receive nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Delivery {
    /// Whether the set's circuit carried a beep or message.
    pub beeps: Vec<bool>,
    /// The greatest message sent on the set's circuit.
    pub messages: Vec<Option<MessageBox>>,
}

impl Delivery {
    /// Whether anything was received on any set.
    pub fn is_empty(&self) -> bool {
        !self.beeps.iter().any(|&b| b)
    }
}

/// Result of [`CircuitBuilder::resolve`].
#[derive(Clone, Debug, Default)]
pub struct CircuitOutcome {
    /// One delivery per configuration, in builder order.
    pub deliveries: Vec<Delivery>,
    /// Circuit id of every partition set, `None` for empty sets.
    pub circuit_ids: Vec<Vec<Option<usize>>>,
    /// Number of circuits.
    pub circuit_count: usize,
    /// Circuits that carried a beep or message.
    pub active_circuits: usize,
    /// Partition sets that received a message.
    pub messages_delivered: usize,
    /// Message pairs on one circuit that were neither equal nor ordered.
    pub ambiguous_messages: usize,
}

/// Builds the circuits of one round from the planned pin configurations.
///
/// Configurations are addressed by their index in the slice given to
/// [`new`](Self::new); the engine uses particle ids.
pub struct CircuitBuilder<'a> {
    configs: Vec<&'a PinConfiguration>,
    base: Vec<usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl<'a> CircuitBuilder<'a> {
    /// One union-find node per partition set id of every configuration.
    pub fn new(configs: Vec<&'a PinConfiguration>) -> Self {
        let mut base = Vec::with_capacity(configs.len());
        let mut total = 0;
        for pc in &configs {
            base.push(total);
            total += pc.pin_count();
        }
        Self {
            configs,
            base,
            parent: (0..total).collect(),
            rank: vec![0; total],
        }
    }

    /// Number of configurations.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the builder has no configurations.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Wire pin `pin_a` of configuration `a` to pin `pin_b` of
    /// configuration `b`.
    pub fn connect(
        &mut self,
        a: usize,
        pin_a: usize,
        b: usize,
        pin_b: usize,
    ) -> Result<(), CircuitError> {
        let na = self.node(a, pin_a)?;
        let nb = self.node(b, pin_b)?;
        self.union(na, nb);
        Ok(())
    }

    fn node(&self, config: usize, pin: usize) -> Result<usize, CircuitError> {
        let pc = self
            .configs
            .get(config)
            .ok_or(CircuitError::PinOutOfRange { pin, count: 0 })?;
        Ok(self.base[config] + pc.partition_set_of(pin)?)
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Number the circuits and deliver every planned beep and message.
    ///
    /// Circuit ids follow the first partition set in configuration order.
    pub fn resolve(mut self) -> CircuitOutcome {
        let mut circuit_of_root = vec![None; self.parent.len()];
        let mut circuit_ids = Vec::with_capacity(self.configs.len());
        let mut count = 0;
        for (i, pc) in self.configs.clone().into_iter().enumerate() {
            let mut ids = vec![None; pc.pin_count()];
            for set in pc.partition_sets() {
                let root = self.find(self.base[i] + set.id());
                let id = *circuit_of_root[root].get_or_insert_with(|| {
                    count += 1;
                    count - 1
                });
                ids[set.id()] = Some(id);
            }
            circuit_ids.push(ids);
        }

        let mut active = vec![false; count];
        let mut best: Vec<Option<&dyn Message>> = vec![None; count];
        let mut ambiguous = 0;
        for (pc, ids) in self.configs.iter().zip(&circuit_ids) {
            for (set, id) in ids.iter().enumerate() {
                let Some(c) = *id else { continue };
                if pc.is_beeping(set) {
                    active[c] = true;
                }
                let Some(msg) = pc.message(set) else { continue };
                active[c] = true;
                best[c] = match best[c] {
                    None => Some(msg),
                    Some(current) if msg.greater_than(current) => Some(msg),
                    Some(current) => {
                        if !current.greater_than(msg) && !current.equals(msg) {
                            ambiguous += 1;
                            warn!(
                                circuit = c,
                                kept = current.type_name(),
                                dropped = msg.type_name(),
                                "messages on one circuit are not ordered, keeping the first"
                            );
                        }
                        Some(current)
                    }
                };
            }
        }

        let mut delivered = 0;
        let deliveries = circuit_ids
            .iter()
            .map(|ids| {
                let beeps = ids.iter().map(|id| id.is_some_and(|c| active[c])).collect();
                let messages = ids
                    .iter()
                    .map(|id| {
                        let msg = id.and_then(|c| best[c])?;
                        delivered += 1;
                        Some(MessageBox::from_boxed(msg.copy()))
                    })
                    .collect();
                Delivery { beeps, messages }
            })
            .collect();

        CircuitOutcome {
            deliveries,
            circuit_count: count,
            active_circuits: active.iter().filter(|&&a| a).count(),
            messages_delivered: delivered,
            ambiguous_messages: ambiguous,
            circuit_ids,
        }
    }
}

/// Pin of the neighbour that faces pin `offset` across a shared edge.
///
/// Both particles count pin offsets along the edge in their own
/// counter-clockwise order, so the facing pin is at the mirrored position
/// in the global frame, converted back through each side's chirality.
pub fn facing_offset(
    offset: usize,
    pins_per_edge: usize,
    chirality: bool,
    neighbor_chirality: bool,
) -> usize {
    let last = pins_per_edge - 1;
    let global = if chirality { offset } else { last - offset };
    let partner = last - global;
    if neighbor_chirality {
        partner
    } else {
        last - partner
    }
}
