//! Activation contexts handed to particle algorithms.
//!
//! Each activation receives exactly one context. It bundles a read-only
//! [`Sensor`] over the whole system with the active particle's own
//! mutable [`RoundState`]:
//!
//! - [`MoveContext`]: movement, bonds and the anchor claim.
//! - [`BeepContext`]: pin configuration and signals.
//! - [`ParticleSetup`]: attribute declaration while the factory builds
//!   the algorithm for one particle.
//!
//! Reads shared by both round contexts live on the [`ParticleSense`]
//! trait; writes to attributes and color on [`ParticleWrite`].
//!
//! # Snapshot semantics
//!
//! Other particles are only ever seen through [`ParticleView`], which
//! reads their previous-round values. The active particle additionally
//! sees its own pending writes through [`ParticleSense::get`]. Position
//! data follows the phase: start-of-round placements in the move phase,
//! post-movement placements in the beep phase.

use crate::attribute::{Attr, AttributeEnum, AttributeStore, AttributeType};
use crate::error::{ActionError, Phase};
use crate::occupancy::{Occupancy, Occupant};
use crate::particle::{Particle, ParticleView, Placement};
use crate::round::{ColorWrite, MovementAction, RoundState};
use amoebot_circuit::{CircuitError, Message, MessageBox, PinConfiguration};
use amoebot_core::{Color, ParticleId};
use amoebot_space::ports::{label_of_port, port_count, port_of_label};
use amoebot_space::{Direction, GridCoord, Port, SpaceError};

// ── Sensor ──────────────────────────────────────────────────────────

/// Read access to the system from the point of view of one particle.
///
/// Constructed by the system for every activation.
pub struct Sensor<'a> {
    particles: &'a [Particle],
    placements: &'a [Placement],
    occupancy: &'a Occupancy,
    pins_per_edge: usize,
    id: ParticleId,
    round: u64,
    phase: Phase,
}

impl<'a> Sensor<'a> {
    pub(crate) fn new(
        particles: &'a [Particle],
        placements: &'a [Placement],
        occupancy: &'a Occupancy,
        pins_per_edge: usize,
        round: u64,
        phase: Phase,
    ) -> Self {
        Self {
            particles,
            placements,
            occupancy,
            pins_per_edge,
            id: ParticleId(0),
            round,
            phase,
        }
    }

    /// The same view, focused on particle `id`.
    pub(crate) fn focus(&mut self, id: ParticleId) {
        self.id = id;
    }

    fn me(&self) -> &'a Particle {
        &self.particles[self.id.index()]
    }

    fn placement(&self) -> Placement {
        self.placements[self.id.index()]
    }

    fn local_head(&self) -> Option<Direction> {
        let orientation = self.me().orientation();
        self.placement()
            .head_direction
            .map(|d| orientation.to_local(d))
    }

    /// The committed configuration if it still fits the current expansion
    /// state, otherwise a fresh singleton one for that state.
    fn fitting_pin_configuration(&self) -> Result<PinConfiguration, CircuitError> {
        let head = self.local_head();
        let committed = self.me().pin_configuration();
        if committed
            .check_compatible(self.pins_per_edge, head)
            .is_ok()
        {
            Ok(committed.clone())
        } else {
            PinConfiguration::singleton(self.pins_per_edge, head)
        }
    }

    fn view(&self, id: ParticleId) -> ParticleView<'a> {
        ParticleView::new(&self.particles[id.index()], self.placements[id.index()])
    }

    /// Label of the local port `direction` on the given part.
    fn port_label(&self, direction: Direction, head: bool) -> Result<usize, ActionError> {
        if !direction.is_cardinal() {
            return Err(SpaceError::NotCardinal { direction }.into());
        }
        let port = Port::new(direction, head);
        label_of_port(port, self.local_head()).ok_or_else(|| {
            SpaceError::InvalidPort {
                direction,
                part: port.part_name(),
            }
            .into()
        })
    }

    /// Node behind a local port.
    fn node_at(&self, direction: Direction, head: bool) -> Result<GridCoord, ActionError> {
        self.port_label(direction, head)?;
        let global = self.me().orientation().to_global(direction);
        Ok(self.placement().part(head).neighbor(global))
    }

    /// Another particle behind a local port.
    fn occupant_at(&self, direction: Direction, head: bool) -> Result<Option<Occupant>, ActionError> {
        let node = self.node_at(direction, head)?;
        Ok(self.occupancy.at(node).filter(|o| o.particle != self.id))
    }

    fn check_set(&self, set: usize) -> Result<(), ActionError> {
        let count = self.me().received_beeps().len();
        if set >= count {
            return Err(CircuitError::PartitionSetOutOfRange { set, count }.into());
        }
        Ok(())
    }

    /// The post-movement placement implied by the scheduled movement,
    /// ignoring translations caused by other particles.
    fn predicted(&self, movement: Option<MovementAction>) -> Placement {
        let now = self.placement();
        if self.phase == Phase::Beep {
            return now;
        }
        let orientation = self.me().orientation();
        match movement {
            None => now,
            Some(MovementAction::Expand(d) | MovementAction::PushHandover(d)) => {
                Placement::expanded(now.tail, orientation.to_global(d))
            }
            Some(MovementAction::ContractHead | MovementAction::PullHandoverHead(_)) => {
                Placement::contracted(now.head())
            }
            Some(MovementAction::ContractTail | MovementAction::PullHandoverTail(_)) => {
                Placement::contracted(now.tail)
            }
        }
    }
}

/// A neighbor found by [`ParticleSense::find_first_neighbor`].
#[derive(Clone, Copy, Debug)]
pub struct NeighborHit<'a> {
    /// The neighbor.
    pub view: ParticleView<'a>,
    /// Local direction of the port it was found at.
    pub direction: Direction,
    /// Whether the port is on the head.
    pub at_head: bool,
}

// ── ParticleSense ───────────────────────────────────────────────────

/// Read queries available in both phases.
///
/// Directions are local to the active particle. For contracted
/// particles the `head` flag of port arguments is ignored.
pub trait ParticleSense {
    /// The underlying sensor.
    fn sensor(&self) -> &Sensor<'_>;

    /// The active particle's decisions so far.
    fn round_state(&self) -> &RoundState;

    /// Id of the active particle.
    fn particle_id(&self) -> ParticleId {
        self.sensor().id
    }

    /// The round being simulated.
    fn round(&self) -> u64 {
        self.sensor().round
    }

    /// Pins on every edge, fixed for the run.
    fn pins_per_edge(&self) -> usize {
        self.sensor().pins_per_edge
    }

    /// Global direction of local east.
    fn compass_dir(&self) -> Direction {
        self.sensor().me().compass_dir()
    }

    /// Local sense of rotation.
    fn chirality(&self) -> bool {
        self.sensor().me().chirality()
    }

    // ── Own state ───────────────────────────────────────────────────

    /// Whether the particle occupies two nodes.
    fn is_expanded(&self) -> bool {
        self.sensor().placement().is_expanded()
    }

    /// Whether the particle occupies one node.
    fn is_contracted(&self) -> bool {
        !self.is_expanded()
    }

    /// Local head direction, `None` when contracted.
    fn head_direction(&self) -> Option<Direction> {
        self.sensor().local_head()
    }

    /// Head node.
    fn head(&self) -> GridCoord {
        self.sensor().placement().head()
    }

    /// Tail node.
    fn tail(&self) -> GridCoord {
        self.sensor().placement().tail
    }

    /// The movement scheduled in this round.
    fn scheduled_movement(&self) -> Option<MovementAction> {
        self.round_state().movement()
    }

    /// Whether the particle will be expanded after the scheduled movement.
    fn is_expanded_after(&self) -> bool {
        self.sensor()
            .predicted(self.round_state().movement())
            .is_expanded()
    }

    /// Whether the particle will be contracted after the scheduled movement.
    fn is_contracted_after(&self) -> bool {
        !self.is_expanded_after()
    }

    /// Local head direction after the scheduled movement.
    fn head_direction_after(&self) -> Option<Direction> {
        let orientation = self.sensor().me().orientation();
        self.sensor()
            .predicted(self.round_state().movement())
            .head_direction
            .map(|d| orientation.to_local(d))
    }

    /// Head node after the scheduled movement.
    fn head_after(&self) -> GridCoord {
        self.sensor().predicted(self.round_state().movement()).head()
    }

    /// Tail node after the scheduled movement.
    fn tail_after(&self) -> GridCoord {
        self.sensor().predicted(self.round_state().movement()).tail
    }

    /// Display color, including a pending change.
    fn main_color(&self) -> Color {
        match self.round_state().color() {
            Some(ColorWrite::Set(color)) => color,
            Some(ColorWrite::Reset) => Color::BLACK,
            None => self.sensor().me().main_color(),
        }
    }

    /// Attribute value, including a pending write.
    fn get<T: AttributeType>(&self, attr: Attr<T>) -> Result<T, ActionError> {
        let store = self.sensor().me().attributes();
        match self.round_state().attribute_write(attr.index()) {
            Some(value) => AttributeStore::typed(store.slot(attr.index())?, value),
            None => store.get(attr),
        }
    }

    // ── Neighbors ───────────────────────────────────────────────────

    /// Whether another particle occupies the node behind a port.
    fn has_neighbor_at(&self, direction: Direction, head: bool) -> Result<bool, ActionError> {
        Ok(self.sensor().occupant_at(direction, head)?.is_some())
    }

    /// The particle behind a port.
    fn get_neighbor_at(
        &self,
        direction: Direction,
        head: bool,
    ) -> Result<Option<ParticleView<'_>>, ActionError> {
        let sensor = self.sensor();
        Ok(sensor
            .occupant_at(direction, head)?
            .map(|o| sensor.view(o.particle)))
    }

    /// Whether the node behind a port holds a neighbor's head. Contracted
    /// neighbors count as both head and tail.
    fn is_head_at(&self, direction: Direction, head: bool) -> Result<bool, ActionError> {
        Ok(self
            .sensor()
            .occupant_at(direction, head)?
            .is_some_and(|o| o.on_head))
    }

    /// Whether the node behind a port holds a neighbor's tail. Contracted
    /// neighbors count as both head and tail.
    fn is_tail_at(&self, direction: Direction, head: bool) -> Result<bool, ActionError> {
        let sensor = self.sensor();
        Ok(sensor
            .occupant_at(direction, head)?
            .is_some_and(|o| !o.on_head || !sensor.placements[o.particle.index()].is_expanded()))
    }

    /// Scan ports for the first neighbor.
    ///
    /// The scan starts at the given port and walks the port labels in
    /// ascending order (`with_chirality`) or descending order, visiting at
    /// most `max_number` ports (all ports if `None`).
    fn find_first_neighbor(
        &self,
        start_direction: Direction,
        start_at_head: bool,
        with_chirality: bool,
        max_number: Option<usize>,
    ) -> Result<Option<NeighborHit<'_>>, ActionError> {
        self.find_first_neighbor_with(
            start_direction,
            start_at_head,
            with_chirality,
            max_number,
            |_| true,
        )
    }

    /// Like [`find_first_neighbor`](Self::find_first_neighbor), skipping
    /// neighbors that do not satisfy `accept`.
    fn find_first_neighbor_with<F>(
        &self,
        start_direction: Direction,
        start_at_head: bool,
        with_chirality: bool,
        max_number: Option<usize>,
        accept: F,
    ) -> Result<Option<NeighborHit<'_>>, ActionError>
    where
        F: Fn(&ParticleView<'_>) -> bool,
    {
        let sensor = self.sensor();
        let head = sensor.local_head();
        let count = port_count(head);
        let start = sensor.port_label(start_direction, start_at_head)?;
        let limit = max_number.unwrap_or(count).min(count);
        for step in 0..limit {
            let label = if with_chirality {
                (start + step) % count
            } else {
                (start + count - step) % count
            };
            let Some(port) = port_of_label(label, head) else {
                continue;
            };
            let Some(occupant) = sensor.occupant_at(port.direction, port.on_head)? else {
                continue;
            };
            let view = sensor.view(occupant.particle);
            if accept(&view) {
                return Ok(Some(NeighborHit {
                    view,
                    direction: port.direction,
                    at_head: port.on_head,
                }));
            }
        }
        Ok(None)
    }

    // ── Circuits ────────────────────────────────────────────────────

    /// Whether a beep arrived on the partition set in the previous round.
    fn received_beep_on_partition_set(&self, set: usize) -> Result<bool, ActionError> {
        let sensor = self.sensor();
        sensor.check_set(set)?;
        Ok(sensor.me().received_beeps()[set])
    }

    /// A copy of the message that arrived on the partition set in the
    /// previous round.
    fn received_message_on_partition_set(
        &self,
        set: usize,
    ) -> Result<Option<MessageBox>, ActionError> {
        let sensor = self.sensor();
        sensor.check_set(set)?;
        Ok(sensor.me().received_messages()[set].clone())
    }

    /// Whether any partition set received a beep in the previous round.
    fn received_any_beep(&self) -> bool {
        self.sensor().me().received_beeps().iter().any(|&b| b)
    }

    /// A copy of the committed pin configuration. After an expansion or
    /// contraction in this round the committed layout no longer fits, and
    /// a singleton configuration for the new state is returned instead.
    fn current_pin_configuration(&self) -> PinConfiguration {
        let sensor = self.sensor();
        sensor
            .fitting_pin_configuration()
            .unwrap_or_else(|_| sensor.me().pin_configuration().clone())
    }
}

/// Writes available in both phases.
pub trait ParticleWrite: ParticleSense {
    /// The active particle's decisions, mutably.
    fn round_state_mut(&mut self) -> &mut RoundState;

    /// Stage an attribute write, committed with the round.
    fn set<T: AttributeType>(&mut self, attr: Attr<T>, value: T) -> Result<(), ActionError> {
        self.sensor().me().attributes().check_kind(attr)?;
        self.round_state_mut()
            .write_attribute(attr.index(), value.into_value());
        Ok(())
    }

    /// Stage a color change.
    fn set_main_color(&mut self, color: Color) {
        self.round_state_mut().write_color(ColorWrite::Set(color));
    }

    /// Stage a reset to the default color.
    fn reset_main_color(&mut self) {
        self.round_state_mut().write_color(ColorWrite::Reset);
    }
}

// ── MoveContext ─────────────────────────────────────────────────────

/// Context of the move phase.
pub struct MoveContext<'a> {
    sensor: Sensor<'a>,
    state: &'a mut RoundState,
}

impl<'a> MoveContext<'a> {
    pub(crate) fn new(sensor: Sensor<'a>, state: &'a mut RoundState) -> Self {
        Self { sensor, state }
    }

    /// Expand in a local cardinal direction.
    pub fn expand(&mut self, direction: Direction) -> Result<(), ActionError> {
        self.require_contracted()?;
        self.sensor.port_label(direction, true)?;
        self.state.schedule(MovementAction::Expand(direction));
        Ok(())
    }

    /// Contract into the head.
    pub fn contract_head(&mut self) -> Result<(), ActionError> {
        self.require_expanded()?;
        self.state.schedule(MovementAction::ContractHead);
        Ok(())
    }

    /// Contract into the tail.
    pub fn contract_tail(&mut self) -> Result<(), ActionError> {
        self.require_expanded()?;
        self.state.schedule(MovementAction::ContractTail);
        Ok(())
    }

    /// Expand into the node of an expanded neighbor, which has to
    /// contract away from it in the same round.
    pub fn push_handover(&mut self, direction: Direction) -> Result<(), ActionError> {
        self.require_contracted()?;
        self.require_neighbor(direction, true, true)?;
        self.state.schedule(MovementAction::PushHandover(direction));
        Ok(())
    }

    /// Contract into the head and hand the tail node to the contracted
    /// neighbor in `direction` of the tail.
    pub fn pull_handover_head(&mut self, direction: Direction) -> Result<(), ActionError> {
        self.require_expanded()?;
        self.require_neighbor(direction, false, false)?;
        self.state
            .schedule(MovementAction::PullHandoverHead(direction));
        Ok(())
    }

    /// Contract into the tail and hand the head node to the contracted
    /// neighbor in `direction` of the head.
    pub fn pull_handover_tail(&mut self, direction: Direction) -> Result<(), ActionError> {
        self.require_expanded()?;
        self.require_neighbor(direction, true, false)?;
        self.state
            .schedule(MovementAction::PullHandoverTail(direction));
        Ok(())
    }

    /// Release the bond at a port for this round.
    pub fn release_bond(&mut self, direction: Direction, head: bool) -> Result<(), ActionError> {
        let label = self.sensor.port_label(direction, head)?;
        self.state.set_released(label);
        Ok(())
    }

    /// Mark the bond at a port so it follows the moving part.
    pub fn mark_bond(&mut self, direction: Direction, head: bool) -> Result<(), ActionError> {
        let label = self.sensor.port_label(direction, head)?;
        self.state.set_marked(label);
        Ok(())
    }

    /// Whether the bond at a port was released this round.
    pub fn bond_released(&self, direction: Direction, head: bool) -> Result<bool, ActionError> {
        Ok(self
            .state
            .is_released(self.sensor.port_label(direction, head)?))
    }

    /// Whether the bond at a port was marked this round.
    pub fn bond_marked(&self, direction: Direction, head: bool) -> Result<bool, ActionError> {
        Ok(self
            .state
            .is_marked(self.sensor.port_label(direction, head)?))
    }

    /// Become the anchor. The last claim of a round wins and already
    /// applies to this round's movement.
    pub fn make_anchor(&mut self) {
        self.state.claim_anchor();
    }

    fn require_contracted(&self) -> Result<(), ActionError> {
        if self.is_expanded() {
            return Err(ActionError::AlreadyExpanded);
        }
        Ok(())
    }

    fn require_expanded(&self) -> Result<(), ActionError> {
        if self.is_contracted() {
            return Err(ActionError::NotExpanded);
        }
        Ok(())
    }

    fn require_neighbor(
        &self,
        direction: Direction,
        head: bool,
        expanded: bool,
    ) -> Result<(), ActionError> {
        let occupant = self
            .sensor
            .occupant_at(direction, head)?
            .ok_or(ActionError::NoNeighbor {
                direction,
                part: Port::new(direction, head).part_name(),
            })?;
        let partner = occupant.particle;
        if self.sensor.placements[partner.index()].is_expanded() != expanded {
            return Err(ActionError::HandoverPartnerState {
                partner,
                required: if expanded { "expanded" } else { "contracted" },
            });
        }
        Ok(())
    }
}

impl ParticleSense for MoveContext<'_> {
    fn sensor(&self) -> &Sensor<'_> {
        &self.sensor
    }

    fn round_state(&self) -> &RoundState {
        self.state
    }
}

impl ParticleWrite for MoveContext<'_> {
    fn round_state_mut(&mut self) -> &mut RoundState {
        self.state
    }
}

// ── BeepContext ─────────────────────────────────────────────────────

/// Context of the beep phase.
pub struct BeepContext<'a> {
    sensor: Sensor<'a>,
    state: &'a mut RoundState,
}

impl<'a> BeepContext<'a> {
    pub(crate) fn new(sensor: Sensor<'a>, state: &'a mut RoundState) -> Self {
        Self { sensor, state }
    }

    /// A fresh configuration for the post-movement state, every pin in
    /// its own partition set.
    pub fn singleton_pin_configuration(&self) -> Result<PinConfiguration, ActionError> {
        Ok(PinConfiguration::singleton(
            self.sensor.pins_per_edge,
            self.sensor.local_head(),
        )?)
    }

    /// A fresh configuration for the post-movement state with all pins in
    /// partition set 0.
    pub fn global_pin_configuration(&self) -> Result<PinConfiguration, ActionError> {
        Ok(PinConfiguration::global(
            self.sensor.pins_per_edge,
            self.sensor.local_head(),
        )?)
    }

    /// Plan the configuration to use from this round on.
    pub fn set_planned_pin_configuration(
        &mut self,
        config: PinConfiguration,
    ) -> Result<(), ActionError> {
        config.check_compatible(self.sensor.pins_per_edge, self.sensor.local_head())?;
        self.state.plan_pins(config);
        Ok(())
    }

    /// The configuration planned so far.
    pub fn planned_pin_configuration(&self) -> Option<&PinConfiguration> {
        self.state.planned_pin_configuration()
    }

    /// Send a beep on a partition set of the planned configuration.
    pub fn send_beep_on_partition_set(&mut self, set: usize) -> Result<(), ActionError> {
        Ok(self.plan()?.send_beep(set)?)
    }

    /// Send a message on a partition set of the planned configuration.
    pub fn send_message_on_partition_set(
        &mut self,
        set: usize,
        message: impl Message,
    ) -> Result<(), ActionError> {
        Ok(self.plan()?.send_message(set, MessageBox::new(message))?)
    }

    /// Send an already boxed message, e.g. one received earlier.
    pub fn forward_message_on_partition_set(
        &mut self,
        set: usize,
        message: MessageBox,
    ) -> Result<(), ActionError> {
        Ok(self.plan()?.send_message(set, message)?)
    }

    /// The planned configuration, planning a copy of the committed one if
    /// nothing was planned yet. A committed configuration that no longer
    /// fits the post-movement state is replaced by a singleton one.
    fn plan(&mut self) -> Result<&mut PinConfiguration, ActionError> {
        let sensor = &self.sensor;
        self.state
            .planned_pins_or_insert_with(|| -> Result<PinConfiguration, ActionError> {
                Ok(sensor.fitting_pin_configuration()?.without_signals())
            })
    }
}

impl ParticleSense for BeepContext<'_> {
    fn sensor(&self) -> &Sensor<'_> {
        &self.sensor
    }

    fn round_state(&self) -> &RoundState {
        self.state
    }
}

impl ParticleWrite for BeepContext<'_> {
    fn round_state_mut(&mut self) -> &mut RoundState {
        self.state
    }
}

// ── ParticleSetup ───────────────────────────────────────────────────

/// Context of [`AlgorithmFactory::create`](crate::AlgorithmFactory::create).
///
/// Declares the attributes of one particle. Every particle of a run is
/// built by the same factory, so declaring the same attributes in the
/// same order yields handles valid for every particle.
pub struct ParticleSetup<'a> {
    particle: &'a mut Particle,
    pins_per_edge: usize,
    round: u64,
}

impl<'a> ParticleSetup<'a> {
    pub(crate) fn new(particle: &'a mut Particle, pins_per_edge: usize, round: u64) -> Self {
        Self {
            particle,
            pins_per_edge,
            round,
        }
    }

    /// Id of the particle being built.
    pub fn particle_id(&self) -> ParticleId {
        self.particle.id()
    }

    /// Pins on every edge, fixed for the run.
    pub fn pins_per_edge(&self) -> usize {
        self.pins_per_edge
    }

    /// Whether the particle starts expanded.
    pub fn is_expanded(&self) -> bool {
        self.particle.is_expanded()
    }

    /// Local head direction of the initial placement.
    pub fn head_direction(&self) -> Option<Direction> {
        self.particle.head_direction()
    }

    /// Global direction of local east.
    pub fn compass_dir(&self) -> Direction {
        self.particle.compass_dir()
    }

    /// Local sense of rotation.
    pub fn chirality(&self) -> bool {
        self.particle.chirality()
    }

    /// Declare an attribute of any supported type.
    pub fn create_attribute<T: AttributeType>(
        &mut self,
        name: &str,
        initial: T,
    ) -> Result<Attr<T>, ActionError> {
        self.particle.attributes.add(name, initial, self.round)
    }

    /// Declare an integer attribute.
    pub fn create_attribute_int(&mut self, name: &str, initial: i32) -> Result<Attr<i32>, ActionError> {
        self.create_attribute(name, initial)
    }

    /// Declare a boolean attribute.
    pub fn create_attribute_bool(&mut self, name: &str, initial: bool) -> Result<Attr<bool>, ActionError> {
        self.create_attribute(name, initial)
    }

    /// Declare a float attribute.
    pub fn create_attribute_float(&mut self, name: &str, initial: f32) -> Result<Attr<f32>, ActionError> {
        self.create_attribute(name, initial)
    }

    /// Declare a text attribute.
    pub fn create_attribute_string(
        &mut self,
        name: &str,
        initial: impl Into<String>,
    ) -> Result<Attr<String>, ActionError> {
        self.create_attribute(name, initial.into())
    }

    /// Declare an optional direction attribute.
    pub fn create_attribute_direction(
        &mut self,
        name: &str,
        initial: Option<Direction>,
    ) -> Result<Attr<Option<Direction>>, ActionError> {
        self.create_attribute(name, initial)
    }

    /// Declare a color attribute.
    pub fn create_attribute_color(&mut self, name: &str, initial: Color) -> Result<Attr<Color>, ActionError> {
        self.create_attribute(name, initial)
    }

    /// Declare an enum attribute.
    pub fn create_attribute_enum<E>(&mut self, name: &str, initial: E) -> Result<Attr<E>, ActionError>
    where
        E: AttributeEnum + AttributeType,
    {
        self.create_attribute(name, initial)
    }

    /// Set the initial display color.
    pub fn set_main_color(&mut self, color: Color) -> Result<(), ActionError> {
        self.particle
            .main_color
            .record_value_in_round(color, self.round)?;
        self.particle
            .main_color_set
            .record_value_in_round(true, self.round)?;
        Ok(())
    }
}
