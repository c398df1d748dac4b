//! Serializable snapshots of a whole run and best-effort restore.
//!
//! A [`SystemRecord`] holds every history of every particle as ordered
//! `(round, value)` entries. Positions, colors and signals are stored as
//! typed values; pin configurations, attributes and messages as strings,
//! because reading them back needs the algorithm's declarations and a
//! [`MessageRegistry`].
//!
//! Restoring rebuilds the system through the algorithm factory, so every
//! attribute is declared exactly as in a fresh run, and then replaces the
//! histories. Structural damage (positions, anchor, particle count) is a
//! [`RestoreError`]. Everything else is collected in a [`RestoreReport`]
//! and the affected value keeps its default.

use std::fmt::Display;

use amoebot_circuit::{MessageBox, MessageRegistry, PinConfiguration};
use amoebot_core::{Color, FieldError, HistoryError, ParticleId, ValueHistory};
use amoebot_space::{Direction, GridCoord, Orientation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::algorithm::AlgorithmFactory;
use crate::attribute::AttributeValue;
use crate::config::{ActivationOrder, InitialParticle, SystemConfig};
use crate::error::{ConfigError, RestoreError};
use crate::occupancy::overlaps;
use crate::particle::Particle;
use crate::system::ParticleSystem;

// ── Records ─────────────────────────────────────────────────────────

/// One history as change entries plus the last round it is valid for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord<T> {
    /// `(round, value)` pairs in strictly increasing round order.
    pub entries: Vec<(u64, T)>,
    /// Last recorded round.
    pub last_round: u64,
}

impl<T: Clone + PartialEq> HistoryRecord<T> {
    /// Capture a history.
    pub fn capture(history: &ValueHistory<T>) -> Self {
        Self::capture_with(history, T::clone)
    }
}

impl<T> HistoryRecord<T> {
    /// Capture a history, converting every value.
    pub fn capture_with<S: Clone + PartialEq>(
        history: &ValueHistory<S>,
        mut convert: impl FnMut(&S) -> T,
    ) -> Self {
        Self {
            entries: history.entries().map(|(r, v)| (r, convert(v))).collect(),
            last_round: history.last_round(),
        }
    }

    /// First recorded round, if any.
    pub fn earliest_round(&self) -> Option<u64> {
        self.entries.first().map(|(r, _)| *r)
    }
}

/// A message in persisted form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// [`Message::type_name`](amoebot_circuit::Message::type_name) of the message.
    pub type_name: String,
    /// Field names and values in declaration order.
    pub fields: Vec<(String, String)>,
}

impl MessageRecord {
    /// Capture a message through its named fields.
    pub fn capture(message: &MessageBox) -> Self {
        let message = message.get();
        Self {
            type_name: message.type_name().to_string(),
            fields: message
                .named_fields()
                .into_iter()
                .map(|f| (f.name, f.value))
                .collect(),
        }
    }
}

/// One attribute slot in persisted form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Attribute name.
    pub name: String,
    /// Value type, `enum <type name>` for enums.
    pub tag: String,
    /// Values in their text form.
    pub history: HistoryRecord<String>,
}

/// One particle in persisted form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Global direction of local east.
    pub compass: Direction,
    /// Local sense of rotation.
    pub chirality: bool,
    /// Tail node.
    pub tail: HistoryRecord<GridCoord>,
    /// Local head direction.
    pub expansion: HistoryRecord<Option<Direction>>,
    /// Pin configurations in their text form.
    pub pin_configuration: HistoryRecord<String>,
    /// Received beeps by partition set.
    pub received_beeps: HistoryRecord<Vec<bool>>,
    /// Received messages by partition set.
    pub received_messages: HistoryRecord<Vec<Option<MessageRecord>>>,
    /// Display color.
    pub main_color: HistoryRecord<Color>,
    /// Whether the color was set by the algorithm.
    pub main_color_set: HistoryRecord<bool>,
    /// Attributes in declaration order.
    pub attributes: Vec<AttributeRecord>,
}

/// A whole run in persisted form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    /// Name reported by the algorithm factory.
    pub algorithm: String,
    /// Pins on every edge.
    pub pins_per_edge: usize,
    /// Activation order.
    pub activation_order: ActivationOrder,
    /// Seed of shuffled activation.
    pub seed: u64,
    /// First recorded round.
    pub earliest_round: u64,
    /// The round the marker was at.
    pub current_round: u64,
    /// Last recorded round.
    pub latest_round: u64,
    /// Anchor history.
    pub anchor: HistoryRecord<ParticleId>,
    /// Particles in id order.
    pub particles: Vec<ParticleRecord>,
}

// ── Restore report ──────────────────────────────────────────────────

/// A value that could not be restored and kept its default.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RestoreIssue {
    /// The algorithm does not declare an attribute of this name.
    #[error("particle {particle}: unknown attribute '{name}'")]
    UnknownAttribute {
        /// The particle.
        particle: ParticleId,
        /// Persisted name.
        name: String,
    },
    /// The attribute exists with a different type.
    #[error("particle {particle}: attribute '{name}' is {expected}, record holds {found}")]
    AttributeKind {
        /// The particle.
        particle: ParticleId,
        /// Attribute name.
        name: String,
        /// Declared type.
        expected: String,
        /// Persisted type.
        found: String,
    },
    /// A persisted value could not be parsed.
    #[error("particle {particle}: cannot read {field} '{value}' of round {round}")]
    Unparsable {
        /// The particle.
        particle: ParticleId,
        /// The affected field.
        field: String,
        /// Round of the entry.
        round: u64,
        /// Persisted text.
        value: String,
    },
    /// A history had unusable entries or bounds.
    #[error("particle {particle}: {field} history dropped: {reason}")]
    History {
        /// The particle.
        particle: ParticleId,
        /// The affected field.
        field: String,
        /// What was wrong.
        reason: String,
    },
    /// No message type of this name is registered.
    #[error("particle {particle}: unknown message type '{type_name}' in round {round}")]
    UnknownMessageType {
        /// The particle.
        particle: ParticleId,
        /// Round of the entry.
        round: u64,
        /// Persisted type name.
        type_name: String,
    },
    /// A message field could not be assigned.
    #[error("particle {particle}: message field in round {round}: {source}")]
    MessageField {
        /// The particle.
        particle: ParticleId,
        /// Round of the entry.
        round: u64,
        /// Underlying error.
        #[source]
        source: FieldError,
    },
}

/// Everything that had to be skipped during a restore.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Skipped values in discovery order.
    pub issues: Vec<RestoreIssue>,
}

impl RestoreReport {
    /// Whether everything was restored.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, issue: RestoreIssue) {
        self.issues.push(issue);
    }
}

// ── Capture ─────────────────────────────────────────────────────────

impl ParticleSystem {
    /// Capture the whole run, including rounds after the marker.
    pub fn to_record(&self) -> SystemRecord {
        SystemRecord {
            algorithm: self.algorithm_name.clone(),
            pins_per_edge: self.pins_per_edge,
            activation_order: self.activation_order,
            seed: self.seed,
            earliest_round: self.earliest_round(),
            current_round: self.current_round(),
            latest_round: self.latest_round(),
            anchor: HistoryRecord::capture(&self.anchor),
            particles: self.particles.iter().map(particle_record).collect(),
        }
    }

    /// Rebuild a run from a record.
    ///
    /// `factory` must be the algorithm the record was written with.
    /// Messages are rebuilt from `registry`.
    pub fn from_record(
        record: &SystemRecord,
        factory: &dyn AlgorithmFactory,
        registry: &MessageRegistry,
    ) -> Result<(Self, RestoreReport), RestoreError> {
        if record.algorithm != factory.name() {
            return Err(RestoreError::AlgorithmMismatch {
                expected: factory.name().to_string(),
                found: record.algorithm.clone(),
            });
        }
        if record.pins_per_edge != factory.pins_per_edge() {
            return Err(RestoreError::PinsPerEdgeMismatch {
                expected: factory.pins_per_edge(),
                found: record.pins_per_edge,
            });
        }
        let bounds = Bounds {
            earliest: record.earliest_round,
            latest: record.latest_round,
        };

        // Positions are structural: without them nothing else is usable.
        let mut tails = Vec::with_capacity(record.particles.len());
        let mut expansions = Vec::with_capacity(record.particles.len());
        let mut initial = Vec::with_capacity(record.particles.len());
        for (i, p) in record.particles.iter().enumerate() {
            let particle = ParticleId(i as u32);
            let structural = |field: &'static str| {
                move |reason: String| RestoreError::Placement {
                    particle,
                    field,
                    reason,
                }
            };
            let tail = bounds
                .rebuild(p.tail.entries.clone(), p.tail.last_round)
                .map_err(structural("tail"))?;
            let expansion = bounds
                .rebuild(p.expansion.entries.clone(), p.expansion.last_round)
                .map_err(structural("expansion"))?;
            let orientation = Orientation::new(p.compass, p.chirality)
                .map_err(|source| ConfigError::Direction { particle, source })?;
            let first_tail = *tail.value_in_round(bounds.earliest)?;
            let first_head = expansion
                .value_in_round(bounds.earliest)?
                .map(|d| orientation.to_global(d));
            initial.push(InitialParticle {
                tail: first_tail,
                head_direction: first_head,
                compass: p.compass,
                chirality: p.chirality,
            });
            tails.push(tail);
            expansions.push(expansion);
        }
        let anchor = bounds
            .rebuild(record.anchor.entries.clone(), record.anchor.last_round)
            .map_err(|reason| RestoreError::Placement {
                particle: ParticleId(0),
                field: "anchor",
                reason,
            })?;
        if let Some((_, &id)) = anchor.entries().find(|(_, id)| id.index() >= initial.len()) {
            return Err(ConfigError::AnchorOutOfRange {
                anchor: id,
                count: initial.len(),
            }
            .into());
        }

        let config = SystemConfig {
            particles: initial,
            activation_order: record.activation_order,
            seed: record.seed,
            start_round: bounds.earliest,
            anchor: Some(*anchor.value_in_round(bounds.earliest)?),
        };
        let mut system = ParticleSystem::new(&config, factory)?;
        let mut report = RestoreReport::default();
        let pins_per_edge = system.pins_per_edge;

        for (((particle, p), tail), expansion) in system
            .particles
            .iter_mut()
            .zip(&record.particles)
            .zip(tails)
            .zip(expansions)
        {
            particle.tail = tail;
            particle.expansion = expansion;
            let mut restorer = Restorer {
                particle: particle.id(),
                bounds,
                report: &mut report,
            };
            restorer.pins(particle, &p.pin_configuration, pins_per_edge)?;
            restorer.messages(particle, &p.received_messages, registry);
            if let Some(h) = restorer.typed("received beeps", &p.received_beeps) {
                particle.received_beeps = h;
            } else {
                particle.received_beeps = bounds.extend(particle.received_beeps.latest().clone())?;
            }
            if let Some(h) = restorer.typed("main color", &p.main_color) {
                particle.main_color = h;
            } else {
                particle.main_color = bounds.extend(particle.main_color())?;
            }
            if let Some(h) = restorer.typed("main color flag", &p.main_color_set) {
                particle.main_color_set = h;
            } else {
                particle.main_color_set = bounds.extend(particle.main_color_set())?;
            }
            restorer.attributes(particle, &p.attributes)?;
        }
        system.anchor = anchor;

        // Every history now spans the same rounds.
        if record.current_round < record.latest_round {
            system.set_marker_to_round(record.current_round)?;
        } else {
            system.continue_tracking();
        }
        if let Some((node, ids)) = overlaps(system.placements()).into_iter().next() {
            return Err(ConfigError::Overlap {
                node,
                first: ids[0],
                second: ids[1],
            }
            .into());
        }
        info!(
            algorithm = %record.algorithm,
            particles = system.particles.len(),
            rounds = bounds.latest - bounds.earliest,
            issues = report.issues.len(),
            "run restored"
        );
        Ok((system, report))
    }
}

fn particle_record(p: &Particle) -> ParticleRecord {
    ParticleRecord {
        compass: p.compass_dir(),
        chirality: p.chirality(),
        tail: HistoryRecord::capture(p.tail_history()),
        expansion: HistoryRecord::capture(p.expansion_history()),
        pin_configuration: HistoryRecord::capture_with(p.pin_configuration_history(), |pc| {
            pc.to_string()
        }),
        received_beeps: HistoryRecord::capture(p.received_beep_history()),
        received_messages: HistoryRecord::capture_with(p.received_message_history(), |sets| {
            sets.iter()
                .map(|m| m.as_ref().map(MessageRecord::capture))
                .collect()
        }),
        main_color: HistoryRecord::capture(p.main_color_history()),
        main_color_set: HistoryRecord::capture(p.main_color_set_history()),
        attributes: p
            .attributes()
            .slots()
            .iter()
            .map(|slot| AttributeRecord {
                name: slot.name().to_string(),
                tag: slot.tag().to_string(),
                history: HistoryRecord::capture_with(slot.history(), AttributeValue::to_string),
            })
            .collect(),
    }
}

// ── Restore helpers ─────────────────────────────────────────────────

/// The round range every restored history must span.
#[derive(Clone, Copy, Debug)]
struct Bounds {
    earliest: u64,
    latest: u64,
}

impl Bounds {
    /// Build a history from entries that must span exactly these bounds.
    fn rebuild<T: Clone + PartialEq>(
        self,
        entries: Vec<(u64, T)>,
        last_round: u64,
    ) -> Result<ValueHistory<T>, String> {
        let history = ValueHistory::from_entries(entries, last_round).map_err(|e| e.to_string())?;
        if history.earliest_round() != self.earliest || history.last_round() != self.latest {
            return Err(format!(
                "spans rounds {}..={}, run spans {}..={}",
                history.earliest_round(),
                history.last_round(),
                self.earliest,
                self.latest
            ));
        }
        Ok(history)
    }

    /// A constant history over these bounds.
    fn extend<T: Clone + PartialEq>(self, value: T) -> Result<ValueHistory<T>, HistoryError> {
        ValueHistory::from_entries(vec![(self.earliest, value)], self.latest)
    }
}

/// Restores the non-structural histories of one particle.
struct Restorer<'r> {
    particle: ParticleId,
    bounds: Bounds,
    report: &'r mut RestoreReport,
}

impl Restorer<'_> {
    fn issue_history(&mut self, field: &str, reason: impl Display) {
        self.report.push(RestoreIssue::History {
            particle: self.particle,
            field: field.to_string(),
            reason: reason.to_string(),
        });
    }

    fn typed<T: Clone + PartialEq>(
        &mut self,
        field: &str,
        record: &HistoryRecord<T>,
    ) -> Option<ValueHistory<T>> {
        match self.bounds.rebuild(record.entries.clone(), record.last_round) {
            Ok(history) => Some(history),
            Err(reason) => {
                self.issue_history(field, reason);
                None
            }
        }
    }

    /// Pin configurations; unreadable entries fall back to the singleton
    /// configuration of the expansion recorded for that round.
    fn pins(
        &mut self,
        particle: &mut Particle,
        record: &HistoryRecord<String>,
        pins_per_edge: usize,
    ) -> Result<(), RestoreError> {
        let mut entries = Vec::with_capacity(record.entries.len());
        for (round, text) in &record.entries {
            let head = particle
                .expansion
                .value_in_round(*round)
                .ok()
                .copied()
                .flatten();
            let parsed = text
                .parse::<PinConfiguration>()
                .ok()
                .filter(|pc| pc.check_compatible(pins_per_edge, head).is_ok());
            let pc = match parsed {
                Some(pc) => pc,
                None => {
                    self.report.push(RestoreIssue::Unparsable {
                        particle: self.particle,
                        field: "pin configuration".to_string(),
                        round: *round,
                        value: text.clone(),
                    });
                    PinConfiguration::singleton(pins_per_edge, head).map_err(|e| {
                        RestoreError::Placement {
                            particle: self.particle,
                            field: "pin configuration",
                            reason: e.to_string(),
                        }
                    })?
                }
            };
            entries.push((*round, pc));
        }
        match self.bounds.rebuild(entries, record.last_round) {
            Ok(history) => particle.pin_configuration = history,
            Err(reason) => {
                self.issue_history("pin configuration", reason);
                let head = *particle.expansion.value_in_round(self.bounds.earliest)?;
                let pc = PinConfiguration::singleton(pins_per_edge, head).map_err(|e| {
                    RestoreError::Placement {
                        particle: self.particle,
                        field: "pin configuration",
                        reason: e.to_string(),
                    }
                })?;
                particle.pin_configuration = self.bounds.extend(pc)?;
            }
        }
        Ok(())
    }

    fn messages(
        &mut self,
        particle: &mut Particle,
        record: &HistoryRecord<Vec<Option<MessageRecord>>>,
        registry: &MessageRegistry,
    ) {
        let mut entries = Vec::with_capacity(record.entries.len());
        for (round, sets) in &record.entries {
            let restored: Vec<Option<MessageBox>> = sets
                .iter()
                .map(|m| m.as_ref().and_then(|m| self.message(*round, m, registry)))
                .collect();
            entries.push((*round, restored));
        }
        match self.bounds.rebuild(entries, record.last_round) {
            Ok(history) => particle.received_messages = history,
            Err(reason) => {
                self.issue_history("received messages", reason);
                let empty = vec![None; particle.received_messages.latest().len()];
                if let Ok(history) = self.bounds.extend(empty) {
                    particle.received_messages = history;
                }
            }
        }
    }

    fn message(
        &mut self,
        round: u64,
        record: &MessageRecord,
        registry: &MessageRegistry,
    ) -> Option<MessageBox> {
        let fields = record.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()));
        match registry.restore(&record.type_name, fields) {
            Ok((message, errors)) => {
                for source in errors {
                    self.report.push(RestoreIssue::MessageField {
                        particle: self.particle,
                        round,
                        source,
                    });
                }
                Some(message)
            }
            Err(_) => {
                self.report.push(RestoreIssue::UnknownMessageType {
                    particle: self.particle,
                    round,
                    type_name: record.type_name.clone(),
                });
                None
            }
        }
    }

    /// Attributes by name. Declared attributes missing from the record,
    /// and those whose history is unusable, keep their initial value.
    fn attributes(
        &mut self,
        particle: &mut Particle,
        records: &[AttributeRecord],
    ) -> Result<(), HistoryError> {
        let mut restored = vec![false; particle.attributes.len()];
        for record in records {
            let Some(index) = particle.attributes.index_of(&record.name) else {
                self.report.push(RestoreIssue::UnknownAttribute {
                    particle: self.particle,
                    name: record.name.clone(),
                });
                continue;
            };
            let Some(slot) = particle.attributes.slot_mut(index) else {
                continue;
            };
            let expected = slot.tag().to_string();
            if expected != record.tag {
                self.report.push(RestoreIssue::AttributeKind {
                    particle: self.particle,
                    name: record.name.clone(),
                    expected,
                    found: record.tag.clone(),
                });
                continue;
            }
            // Unparsable entries are dropped, so the previous value carries on.
            let mut entries: Vec<(u64, AttributeValue)> = Vec::new();
            for (round, text) in &record.history.entries {
                match slot.parse(text) {
                    Some(value) => entries.push((*round, value)),
                    None => self.report.push(RestoreIssue::Unparsable {
                        particle: self.particle,
                        field: format!("attribute '{}'", record.name),
                        round: *round,
                        value: text.clone(),
                    }),
                }
            }
            if entries.first().is_some_and(|(r, _)| *r != self.bounds.earliest) {
                let initial = slot.history().latest().clone();
                entries.insert(0, (self.bounds.earliest, initial));
            }
            match self.bounds.rebuild(entries, record.history.last_round) {
                Ok(history) => {
                    slot.replace_history(history);
                    restored[index] = true;
                }
                Err(reason) => self.issue_history(&format!("attribute '{}'", record.name), reason),
            }
        }
        for (slot, done) in particle.attributes.slots_mut().zip(restored) {
            if !done {
                let initial = slot.history().latest().clone();
                slot.replace_history(self.bounds.extend(initial)?);
            }
        }
        Ok(())
    }
}
