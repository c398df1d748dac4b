//! Particles, their placement and their full state history.

use crate::attribute::{Attr, AttributeStore, AttributeType};
use crate::error::ActionError;
use amoebot_circuit::{MessageBox, PinConfiguration};
use amoebot_core::{Color, HistoryError, ParticleId, ValueHistory};
use amoebot_space::{Direction, GridCoord, Orientation};

// ── Placement ───────────────────────────────────────────────────────

/// Where a particle sits, in global terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Tail node. For contracted particles the only node.
    pub tail: GridCoord,
    /// Global direction from tail to head, `None` when contracted.
    pub head_direction: Option<Direction>,
}

impl Placement {
    /// A contracted particle at `node`.
    pub fn contracted(node: GridCoord) -> Self {
        Self {
            tail: node,
            head_direction: None,
        }
    }

    /// An expanded particle with tail at `tail` and head in `direction`.
    pub fn expanded(tail: GridCoord, direction: Direction) -> Self {
        Self {
            tail,
            head_direction: Some(direction),
        }
    }

    /// Head node; equals the tail when contracted.
    pub fn head(&self) -> GridCoord {
        self.head_direction
            .map_or(self.tail, |d| self.tail.neighbor(d))
    }

    /// Whether the particle occupies two nodes.
    pub fn is_expanded(&self) -> bool {
        self.head_direction.is_some()
    }

    /// Occupied nodes, head first.
    pub fn nodes(&self) -> impl Iterator<Item = (GridCoord, bool)> {
        let head = self.head();
        let tail = self.is_expanded().then_some((self.tail, false));
        std::iter::once((head, true)).chain(tail)
    }

    /// Node of the given part.
    pub fn part(&self, on_head: bool) -> GridCoord {
        if on_head {
            self.head()
        } else {
            self.tail
        }
    }

    /// The same placement moved by `offset`.
    pub fn translated(self, offset: GridCoord) -> Self {
        Self {
            tail: self.tail + offset,
            ..self
        }
    }
}

// ── Particle ────────────────────────────────────────────────────────

/// One particle with every mutable field kept in a [`ValueHistory`].
///
/// Accessors return the value at the system's round marker. Particles
/// are only changed by the system when a round is committed or the
/// marker moves, so every history shares the same marker while the
/// particle is at rest.
#[derive(Clone, Debug)]
pub struct Particle {
    id: ParticleId,
    orientation: Orientation,
    pub(crate) tail: ValueHistory<GridCoord>,
    pub(crate) expansion: ValueHistory<Option<Direction>>,
    pub(crate) pin_configuration: ValueHistory<PinConfiguration>,
    pub(crate) received_beeps: ValueHistory<Vec<bool>>,
    pub(crate) received_messages: ValueHistory<Vec<Option<MessageBox>>>,
    pub(crate) main_color: ValueHistory<Color>,
    pub(crate) main_color_set: ValueHistory<bool>,
    pub(crate) attributes: AttributeStore,
}

impl Particle {
    /// A particle created in `round`.
    ///
    /// `local_head` is the head direction in the particle's own frame.
    pub(crate) fn new(
        id: ParticleId,
        orientation: Orientation,
        tail: GridCoord,
        local_head: Option<Direction>,
        pins_per_edge: usize,
        round: u64,
    ) -> Result<Self, ActionError> {
        let pins = PinConfiguration::singleton(pins_per_edge, local_head)?;
        let sets = pins.pin_count();
        Ok(Self {
            id,
            orientation,
            tail: ValueHistory::new(tail, round),
            expansion: ValueHistory::new(local_head, round),
            pin_configuration: ValueHistory::new(pins, round),
            received_beeps: ValueHistory::new(vec![false; sets], round),
            received_messages: ValueHistory::new(vec![None; sets], round),
            main_color: ValueHistory::new(Color::BLACK, round),
            main_color_set: ValueHistory::new(false, round),
            attributes: AttributeStore::new(),
        })
    }

    /// Particle id, also its index in the system.
    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// The particle's fixed frame.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Global direction of local east.
    pub fn compass_dir(&self) -> Direction {
        self.orientation.compass()
    }

    /// Local sense of rotation.
    pub fn chirality(&self) -> bool {
        self.orientation.chirality()
    }

    /// Tail node.
    pub fn tail(&self) -> GridCoord {
        *self.tail.marked_value()
    }

    /// Head node.
    pub fn head(&self) -> GridCoord {
        self.placement().head()
    }

    /// Local head direction, `None` when contracted.
    pub fn head_direction(&self) -> Option<Direction> {
        *self.expansion.marked_value()
    }

    /// Global head direction, `None` when contracted.
    pub fn global_head_direction(&self) -> Option<Direction> {
        self.head_direction().map(|d| self.orientation.to_global(d))
    }

    /// Whether the particle occupies two nodes.
    pub fn is_expanded(&self) -> bool {
        self.head_direction().is_some()
    }

    /// Whether the particle occupies one node.
    pub fn is_contracted(&self) -> bool {
        !self.is_expanded()
    }

    /// Global placement.
    pub fn placement(&self) -> Placement {
        Placement {
            tail: self.tail(),
            head_direction: self.global_head_direction(),
        }
    }

    /// Committed pin configuration.
    pub fn pin_configuration(&self) -> &PinConfiguration {
        self.pin_configuration.marked_value()
    }

    /// Beeps received in the marked round, by partition set id.
    pub fn received_beeps(&self) -> &[bool] {
        self.received_beeps.marked_value()
    }

    /// Messages received in the marked round, by partition set id.
    pub fn received_messages(&self) -> &[Option<MessageBox>] {
        self.received_messages.marked_value()
    }

    /// Display color.
    pub fn main_color(&self) -> Color {
        *self.main_color.marked_value()
    }

    /// Whether an algorithm set the color.
    pub fn main_color_set(&self) -> bool {
        *self.main_color_set.marked_value()
    }

    /// Declared attributes.
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Read an attribute at the marker.
    pub fn attribute<T: AttributeType>(&self, attr: Attr<T>) -> Result<T, ActionError> {
        self.attributes.get(attr)
    }

    /// Round the histories are read at.
    pub fn marked_round(&self) -> u64 {
        self.tail.marked_round()
    }

    /// Full position history.
    pub fn tail_history(&self) -> &ValueHistory<GridCoord> {
        &self.tail
    }

    /// Full expansion history.
    pub fn expansion_history(&self) -> &ValueHistory<Option<Direction>> {
        &self.expansion
    }

    /// Full pin configuration history.
    pub fn pin_configuration_history(&self) -> &ValueHistory<PinConfiguration> {
        &self.pin_configuration
    }

    /// Full received beep history.
    pub fn received_beep_history(&self) -> &ValueHistory<Vec<bool>> {
        &self.received_beeps
    }

    /// Full received message history.
    pub fn received_message_history(&self) -> &ValueHistory<Vec<Option<MessageBox>>> {
        &self.received_messages
    }

    /// Full color history.
    pub fn main_color_history(&self) -> &ValueHistory<Color> {
        &self.main_color
    }

    /// Full color flag history.
    pub fn main_color_set_history(&self) -> &ValueHistory<bool> {
        &self.main_color_set
    }

    // ── Movement ────────────────────────────────────────────────────

    // The apply_* methods record directly into the position histories.
    // They are only called after the whole round's movement was resolved.

    pub(crate) fn apply_expand(
        &mut self,
        tail: GridCoord,
        local_head: Direction,
        round: u64,
    ) -> Result<(), HistoryError> {
        self.tail.record_value_in_round(tail, round)?;
        self.expansion.record_value_in_round(Some(local_head), round)
    }

    pub(crate) fn apply_contract_head(&mut self, node: GridCoord, round: u64) -> Result<(), HistoryError> {
        self.apply_contracted(node, round)
    }

    pub(crate) fn apply_contract_tail(&mut self, node: GridCoord, round: u64) -> Result<(), HistoryError> {
        self.apply_contracted(node, round)
    }

    fn apply_contracted(&mut self, node: GridCoord, round: u64) -> Result<(), HistoryError> {
        self.tail.record_value_in_round(node, round)?;
        self.expansion.record_value_in_round(None, round)
    }

    /// Record a final placement that did not change the expansion state.
    pub(crate) fn apply_translation(
        &mut self,
        placement: Placement,
        round: u64,
    ) -> Result<(), HistoryError> {
        let local = placement.head_direction.map(|d| self.orientation.to_local(d));
        self.tail.record_value_in_round(placement.tail, round)?;
        self.expansion.record_value_in_round(local, round)
    }

    // ── Timeline ────────────────────────────────────────────────────

    /// Apply a history operation to every history of this particle.
    pub(crate) fn for_each_history(
        &mut self,
        op: &dyn Fn(&mut dyn HistoryOps) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError> {
        op(&mut self.tail)?;
        op(&mut self.expansion)?;
        op(&mut self.pin_configuration)?;
        op(&mut self.received_beeps)?;
        op(&mut self.received_messages)?;
        op(&mut self.main_color)?;
        op(&mut self.main_color_set)?;
        self.attributes.for_each_history(|h| op(h as &mut dyn HistoryOps))
    }
}

/// Marker operations shared by histories of every value type.
pub(crate) trait HistoryOps {
    fn set_marker_to_round(&mut self, round: u64) -> Result<(), HistoryError>;
    fn continue_tracking(&mut self);
    fn cut_off_at_marker(&mut self);
    fn shift_timescale(&mut self, offset: i64) -> Result<(), HistoryError>;
}

impl<T: Clone + PartialEq> HistoryOps for ValueHistory<T> {
    fn set_marker_to_round(&mut self, round: u64) -> Result<(), HistoryError> {
        ValueHistory::set_marker_to_round(self, round)
    }

    fn continue_tracking(&mut self) {
        ValueHistory::continue_tracking(self);
    }

    fn cut_off_at_marker(&mut self) {
        ValueHistory::cut_off_at_marker(self);
    }

    fn shift_timescale(&mut self, offset: i64) -> Result<(), HistoryError> {
        ValueHistory::shift_timescale(self, offset)
    }
}

// ── ParticleView ────────────────────────────────────────────────────

/// Read-only view of a particle as another particle senses it.
///
/// Position data reflects the phase the view was taken in: the
/// start-of-round placement in the move phase, the post-movement
/// placement in the beep phase. Attributes and colors always read the
/// previous round.
#[derive(Clone, Copy, Debug)]
pub struct ParticleView<'a> {
    particle: &'a Particle,
    placement: Placement,
}

impl<'a> ParticleView<'a> {
    pub(crate) fn new(particle: &'a Particle, placement: Placement) -> Self {
        Self {
            particle,
            placement,
        }
    }

    /// A view at the particle's marked state.
    pub fn at_rest(particle: &'a Particle) -> Self {
        Self::new(particle, particle.placement())
    }

    /// Particle id.
    pub fn id(&self) -> ParticleId {
        self.particle.id
    }

    /// Head node.
    pub fn head(&self) -> GridCoord {
        self.placement.head()
    }

    /// Tail node.
    pub fn tail(&self) -> GridCoord {
        self.placement.tail
    }

    /// Whether the particle occupies two nodes.
    pub fn is_expanded(&self) -> bool {
        self.placement.is_expanded()
    }

    /// Whether the particle occupies one node.
    pub fn is_contracted(&self) -> bool {
        !self.is_expanded()
    }

    /// Global head direction.
    pub fn global_head_direction(&self) -> Option<Direction> {
        self.placement.head_direction
    }

    /// Display color of the previous round.
    pub fn main_color(&self) -> Color {
        self.particle.main_color()
    }

    /// Attribute value of the previous round.
    pub fn attribute<T: AttributeType>(&self, attr: Attr<T>) -> Result<T, ActionError> {
        self.particle.attribute(attr)
    }

    /// The underlying particle.
    pub fn particle(&self) -> &'a Particle {
        self.particle
    }
}
