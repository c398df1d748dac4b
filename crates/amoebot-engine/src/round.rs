//! Transient per-particle state of the round being simulated.
//!
//! A [`RoundState`] collects everything a particle decides during one
//! round: its scheduled movement, bond flags, pending attribute and color
//! writes, its planned pin configuration and an anchor claim. Nothing in
//! it is visible to other particles. The system flushes it into the
//! particle's histories when the round commits and discards it either way.

use crate::attribute::AttributeValue;
use amoebot_circuit::PinConfiguration;
use amoebot_core::Color;
use amoebot_space::ports::EXPANDED_PORTS;
use amoebot_space::Direction;

/// A movement a particle can schedule in the move phase.
///
/// Directions are local to the particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementAction {
    /// Expand from a contracted state into the empty or bonded neighbor
    /// node in the given direction.
    Expand(Direction),
    /// Contract into the head node.
    ContractHead,
    /// Contract into the tail node.
    ContractTail,
    /// Expand into a node currently held by an expanded neighbor that
    /// contracts away from it.
    PushHandover(Direction),
    /// Contract into the head while the contracted neighbor in the given
    /// direction of the tail expands into the tail node.
    PullHandoverHead(Direction),
    /// Contract into the tail while the contracted neighbor in the given
    /// direction of the head expands into the head node.
    PullHandoverTail(Direction),
}

impl MovementAction {
    /// Whether the particle ends the round with one more node.
    pub fn is_expansion(self) -> bool {
        matches!(self, Self::Expand(_) | Self::PushHandover(_))
    }

    /// Whether the particle ends the round with one node less.
    pub fn is_contraction(self) -> bool {
        !self.is_expansion()
    }

    /// Whether the action needs a neighbor performing the complementary
    /// action.
    pub fn is_handover(self) -> bool {
        matches!(
            self,
            Self::PushHandover(_) | Self::PullHandoverHead(_) | Self::PullHandoverTail(_)
        )
    }
}

/// A pending change of the display color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ColorWrite {
    Set(Color),
    Reset,
}

/// Decisions of one particle in the current round.
#[derive(Clone, Debug, Default)]
pub struct RoundState {
    movement: Option<MovementAction>,
    released: [bool; EXPANDED_PORTS],
    marked: [bool; EXPANDED_PORTS],
    attribute_writes: Vec<Option<AttributeValue>>,
    color: Option<ColorWrite>,
    planned_pins: Option<PinConfiguration>,
    claims_anchor: bool,
}

impl RoundState {
    /// An empty state for a particle with `attribute_count` attributes.
    pub(crate) fn new(attribute_count: usize) -> Self {
        Self {
            attribute_writes: vec![None; attribute_count],
            ..Self::default()
        }
    }

    /// Forget every decision.
    pub(crate) fn reset(&mut self) {
        self.movement = None;
        self.released = [false; EXPANDED_PORTS];
        self.marked = [false; EXPANDED_PORTS];
        self.attribute_writes.fill(None);
        self.color = None;
        self.planned_pins = None;
        self.claims_anchor = false;
    }

    /// The scheduled movement, if any.
    pub fn movement(&self) -> Option<MovementAction> {
        self.movement
    }

    /// Whether the bond at port `label` was released.
    pub fn is_released(&self, label: usize) -> bool {
        self.released.get(label).copied().unwrap_or(false)
    }

    /// Whether the bond at port `label` was marked to follow the moving part.
    pub fn is_marked(&self, label: usize) -> bool {
        self.marked.get(label).copied().unwrap_or(false)
    }

    /// Released flags by port label.
    pub fn released(&self) -> &[bool; EXPANDED_PORTS] {
        &self.released
    }

    /// Marked flags by port label.
    pub fn marked(&self) -> &[bool; EXPANDED_PORTS] {
        &self.marked
    }

    /// Whether the particle asked to become the anchor.
    pub fn claims_anchor(&self) -> bool {
        self.claims_anchor
    }

    /// The configuration planned for the beep phase.
    pub fn planned_pin_configuration(&self) -> Option<&PinConfiguration> {
        self.planned_pins.as_ref()
    }

    pub(crate) fn schedule(&mut self, action: MovementAction) {
        self.movement = Some(action);
    }

    pub(crate) fn set_released(&mut self, label: usize) {
        if let Some(flag) = self.released.get_mut(label) {
            *flag = true;
        }
    }

    pub(crate) fn set_marked(&mut self, label: usize) {
        if let Some(flag) = self.marked.get_mut(label) {
            *flag = true;
        }
    }

    pub(crate) fn claim_anchor(&mut self) {
        self.claims_anchor = true;
    }

    pub(crate) fn attribute_write(&self, index: usize) -> Option<&AttributeValue> {
        self.attribute_writes.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn write_attribute(&mut self, index: usize, value: AttributeValue) {
        if index >= self.attribute_writes.len() {
            self.attribute_writes.resize(index + 1, None);
        }
        self.attribute_writes[index] = Some(value);
    }

    pub(crate) fn take_attribute_writes(&mut self) -> impl Iterator<Item = (usize, AttributeValue)> + '_ {
        self.attribute_writes
            .iter_mut()
            .enumerate()
            .filter_map(|(i, w)| w.take().map(|v| (i, v)))
    }

    pub(crate) fn color(&self) -> Option<ColorWrite> {
        self.color
    }

    pub(crate) fn write_color(&mut self, write: ColorWrite) {
        self.color = Some(write);
    }

    pub(crate) fn plan_pins(&mut self, config: PinConfiguration) {
        self.planned_pins = Some(config);
    }

    /// The planned configuration, planning `fallback()` first if there is none.
    pub(crate) fn planned_pins_or_insert_with<E>(
        &mut self,
        fallback: impl FnOnce() -> Result<PinConfiguration, E>,
    ) -> Result<&mut PinConfiguration, E> {
        let pc = match self.planned_pins.take() {
            Some(pc) => pc,
            None => fallback()?,
        };
        Ok(self.planned_pins.insert(pc))
    }

    pub(crate) fn take_planned_pins(&mut self) -> Option<PinConfiguration> {
        self.planned_pins.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_everything() {
        let mut state = RoundState::new(2);
        state.schedule(MovementAction::ContractHead);
        state.set_released(3);
        state.set_marked(9);
        state.write_attribute(1, AttributeValue::Int(4));
        state.write_color(ColorWrite::Set(Color::RED));
        state.claim_anchor();
        assert!(state.is_released(3));
        assert!(state.is_marked(9));
        assert_eq!(state.attribute_write(1), Some(&AttributeValue::Int(4)));

        state.reset();
        assert_eq!(state.movement(), None);
        assert!(!state.is_released(3));
        assert!(!state.is_marked(9));
        assert_eq!(state.attribute_write(1), None);
        assert_eq!(state.color(), None);
        assert!(!state.claims_anchor());
        assert_eq!(state.attribute_writes.len(), 2);
    }

    #[test]
    fn last_schedule_wins() {
        let mut state = RoundState::new(0);
        state.schedule(MovementAction::Expand(Direction::E));
        state.schedule(MovementAction::Expand(Direction::W));
        assert_eq!(state.movement(), Some(MovementAction::Expand(Direction::W)));
    }

    #[test]
    fn out_of_range_labels_are_ignored() {
        let mut state = RoundState::new(0);
        state.set_released(42);
        assert!(!state.is_released(42));
    }

    #[test]
    fn taking_writes_drains_them() {
        let mut state = RoundState::new(3);
        state.write_attribute(0, AttributeValue::Bool(true));
        state.write_attribute(2, AttributeValue::Int(1));
        let taken: Vec<_> = state.take_attribute_writes().collect();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].0, 2);
        assert_eq!(state.take_attribute_writes().count(), 0);
    }

    #[test]
    fn classification() {
        assert!(MovementAction::PushHandover(Direction::E).is_expansion());
        assert!(MovementAction::PushHandover(Direction::E).is_handover());
        assert!(MovementAction::ContractTail.is_contraction());
        assert!(!MovementAction::ContractTail.is_handover());
    }
}
