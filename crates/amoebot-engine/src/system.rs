//! The particle system and its round driver.
//!
//! [`ParticleSystem`] owns every particle, their algorithms and the
//! anchor history. Each call to [`simulate_round()`](ParticleSystem::simulate_round)
//! runs one complete round:
//!
//! move phase → movement resolution → beep phase → circuits → commit
//!
//! Everything before the commit works on borrowed snapshots and per-particle
//! [`RoundState`]s, so a round that fails at any point leaves the system
//! exactly as it was.
//!
//! # Timeline
//!
//! All histories of all particles share one marker. Moving it with
//! [`set_marker_to_round()`](ParticleSystem::set_marker_to_round) or the
//! step methods rewinds positions, pins, colors and attributes together.
//! Simulating while the marker is in the past discards the rounds after
//! it.

use std::time::Instant;

use amoebot_circuit::{CircuitError, CircuitOutcome, PinConfiguration};
use amoebot_core::{Color, HistoryError, ParticleId, ValueHistory};
use amoebot_space::GridCoord;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::algorithm::{AlgorithmFactory, ParticleAlgorithm};
use crate::attribute::AttributeValue;
use crate::circuits;
use crate::config::{ActivationOrder, SystemConfig};
use crate::context::{BeepContext, MoveContext, ParticleSetup, Sensor};
use crate::error::{ConfigError, Phase, RoundError};
use crate::metrics::RoundMetrics;
use crate::movement::{self, MoveRequest};
use crate::occupancy::Occupancy;
use crate::particle::{HistoryOps, Particle, ParticleView, Placement};
use crate::round::{ColorWrite, MovementAction, RoundState};

// Compile-time assertion: ParticleSystem is Send.
// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<ParticleSystem>();
    }
};

// ── RoundReport ─────────────────────────────────────────────────────

/// Result of a committed round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    /// The round that was recorded.
    pub round: u64,
    /// Whether every particle reports finished after the round.
    pub finished: bool,
    /// Timing and activity of the round.
    pub metrics: RoundMetrics,
}

// ── ParticleSystem ──────────────────────────────────────────────────

/// A set of particles running one algorithm in synchronous rounds.
pub struct ParticleSystem {
    pub(crate) particles: Vec<Particle>,
    pub(crate) algorithms: Vec<Box<dyn ParticleAlgorithm>>,
    pub(crate) algorithm_name: String,
    pub(crate) pins_per_edge: usize,
    pub(crate) activation_order: ActivationOrder,
    pub(crate) seed: u64,
    pub(crate) anchor: ValueHistory<ParticleId>,
    /// Placements at the marker, indexed by particle id.
    placements: Vec<Placement>,
    occupancy: Occupancy,
    states: Vec<RoundState>,
    last_metrics: RoundMetrics,
}

impl ParticleSystem {
    /// Build a system from a configuration.
    ///
    /// Validates the configuration, then asks the factory to set up every
    /// particle in id order. The initial state is recorded at
    /// `config.start_round`.
    pub fn new(config: &SystemConfig, factory: &dyn AlgorithmFactory) -> Result<Self, ConfigError> {
        let pins_per_edge = factory.pins_per_edge();
        config.validate(pins_per_edge)?;
        let round = config.start_round;

        let mut particles = Vec::with_capacity(config.particles.len());
        let mut algorithms = Vec::with_capacity(config.particles.len());
        for (i, init) in config.particles.iter().enumerate() {
            let id = ParticleId(i as u32);
            let orientation = init
                .orientation()
                .map_err(|source| ConfigError::Direction { particle: id, source })?;
            let local_head = init.head_direction.map(|d| orientation.to_local(d));
            let mut particle =
                Particle::new(id, orientation, init.tail, local_head, pins_per_edge, round)
                    .map_err(|source| ConfigError::Setup { particle: id, source })?;
            let algorithm = factory
                .create(&mut ParticleSetup::new(&mut particle, pins_per_edge, round))
                .map_err(|source| ConfigError::Setup { particle: id, source })?;
            particles.push(particle);
            algorithms.push(algorithm);
        }

        let anchor = config.anchor.unwrap_or(ParticleId(0));
        let system = Self::assemble(
            particles,
            algorithms,
            factory.name().to_string(),
            pins_per_edge,
            config.activation_order,
            config.seed,
            ValueHistory::new(anchor, round),
        );
        debug!(
            particles = system.particles.len(),
            algorithm = %system.algorithm_name,
            round,
            "particle system created"
        );
        Ok(system)
    }

    /// Put a system together from already built parts.
    pub(crate) fn assemble(
        particles: Vec<Particle>,
        algorithms: Vec<Box<dyn ParticleAlgorithm>>,
        algorithm_name: String,
        pins_per_edge: usize,
        activation_order: ActivationOrder,
        seed: u64,
        anchor: ValueHistory<ParticleId>,
    ) -> Self {
        let states = particles
            .iter()
            .map(|p| RoundState::new(p.attributes().len()))
            .collect();
        let mut system = Self {
            particles,
            algorithms,
            algorithm_name,
            pins_per_edge,
            activation_order,
            seed,
            anchor,
            placements: Vec::new(),
            occupancy: Occupancy::default(),
            states,
            last_metrics: RoundMetrics::default(),
        };
        system.refresh();
        system
    }

    // ── Round driver ────────────────────────────────────────────────

    /// Simulate the round after the marker and record it.
    ///
    /// # Errors
    ///
    /// [`RoundError::InvalidAction`] if an algorithm call fails and
    /// [`RoundError::MovementConflict`] if the scheduled movements are
    /// inconsistent. In both cases nothing was changed.
    pub fn simulate_round(&mut self) -> Result<RoundReport, RoundError> {
        let round_start = Instant::now();
        let round = self.current_round() + 1;
        let n = self.particles.len();
        let order = self.activation_sequence(round);
        let mut metrics = RoundMetrics::default();

        for state in &mut self.states {
            state.reset();
        }

        // ── Move phase ──────────────────────────────────────────────

        let move_start = Instant::now();
        let mut anchor = *self.anchor.marked_value();
        for &i in &order {
            let id = ParticleId(i as u32);
            let mut sensor = Sensor::new(
                &self.particles,
                &self.placements,
                &self.occupancy,
                self.pins_per_edge,
                round,
                Phase::Move,
            );
            sensor.focus(id);
            let mut ctx = MoveContext::new(sensor, &mut self.states[i]);
            if let Err(source) = self.algorithms[i].activate_move(&mut ctx) {
                warn!(round, particle = %id, error = %source, "move activation failed; round rejected");
                return Err(RoundError::InvalidAction {
                    particle: id,
                    phase: Phase::Move,
                    source,
                });
            }
            if self.states[i].claims_anchor() {
                anchor = id;
            }
        }
        metrics.move_phase_us = move_start.elapsed().as_micros() as u64;

        // ── Movement resolution ─────────────────────────────────────

        let resolution_start = Instant::now();
        let requests: Vec<MoveRequest> = self
            .particles
            .iter()
            .zip(&self.placements)
            .zip(&self.states)
            .map(|((particle, &placement), state)| {
                MoveRequest::new(placement, particle.orientation(), state)
            })
            .collect();
        let resolution = match movement::resolve(&requests, &self.occupancy, anchor) {
            Ok(resolution) => resolution,
            Err(conflicts) => {
                warn!(round, conflicts = conflicts.len(), "movement conflict; round rejected");
                return Err(RoundError::MovementConflict { round, conflicts });
            }
        };
        let placements = resolution.placements;
        let occupancy = Occupancy::rebuild(&placements);
        metrics.moved_particles = resolution.moved;
        metrics.resolution_us = resolution_start.elapsed().as_micros() as u64;

        // ── Beep phase ──────────────────────────────────────────────

        let beep_start = Instant::now();
        for &i in &order {
            let id = ParticleId(i as u32);
            let mut sensor = Sensor::new(
                &self.particles,
                &placements,
                &occupancy,
                self.pins_per_edge,
                round,
                Phase::Beep,
            );
            sensor.focus(id);
            let mut ctx = BeepContext::new(sensor, &mut self.states[i]);
            if let Err(source) = self.algorithms[i].activate_beep(&mut ctx) {
                warn!(round, particle = %id, error = %source, "beep activation failed; round rejected");
                return Err(RoundError::InvalidAction {
                    particle: id,
                    phase: Phase::Beep,
                    source,
                });
            }
        }
        metrics.beep_phase_us = beep_start.elapsed().as_micros() as u64;

        // ── Circuits ────────────────────────────────────────────────

        let circuit_start = Instant::now();
        let mut configs = Vec::with_capacity(n);
        for i in 0..n {
            let config = match self.states[i].take_planned_pins() {
                Some(planned) => planned,
                None => self.default_configuration(i, &placements[i]).map_err(|source| {
                    RoundError::InvalidAction {
                        particle: ParticleId(i as u32),
                        phase: Phase::Beep,
                        source: source.into(),
                    }
                })?,
            };
            configs.push(config);
        }
        let outcome = circuits::connect(
            &self.particles,
            &placements,
            &occupancy,
            &configs,
            self.pins_per_edge,
        )?;
        if outcome.ambiguous_messages > 0 {
            warn!(
                round,
                count = outcome.ambiguous_messages,
                "unordered messages on one circuit; kept the first sender"
            );
        }
        metrics.circuits = outcome.circuit_count;
        metrics.active_circuits = outcome.active_circuits;
        metrics.messages_delivered = outcome.messages_delivered;
        metrics.ambiguous_messages = outcome.ambiguous_messages;
        metrics.circuit_us = circuit_start.elapsed().as_micros() as u64;

        // ── Commit ──────────────────────────────────────────────────

        let commit_start = Instant::now();
        self.discard_future();
        self.commit(round, &requests, &placements, configs, outcome, anchor)?;
        self.placements = placements;
        self.occupancy = occupancy;
        metrics.commit_us = commit_start.elapsed().as_micros() as u64;
        metrics.total_us = round_start.elapsed().as_micros() as u64;

        debug!(
            round,
            moved = metrics.moved_particles,
            circuits = metrics.circuits,
            "round committed"
        );
        self.last_metrics = metrics.clone();
        Ok(RoundReport {
            round,
            finished: self.is_finished(),
            metrics,
        })
    }

    /// Simulate up to `max_rounds` rounds, stopping early once every
    /// particle is finished. Returns the number of rounds simulated.
    pub fn run(&mut self, max_rounds: u64) -> Result<u64, RoundError> {
        let mut simulated = 0;
        while simulated < max_rounds && !self.is_finished() {
            self.simulate_round()?;
            simulated += 1;
        }
        Ok(simulated)
    }

    /// Whether every particle's algorithm reports finished at the marker.
    pub fn is_finished(&self) -> bool {
        self.algorithms
            .iter()
            .zip(&self.particles)
            .zip(&self.placements)
            .all(|((algorithm, particle), &placement)| {
                algorithm.is_finished(&ParticleView::new(particle, placement))
            })
    }

    /// Metrics of the most recent committed round.
    pub fn last_metrics(&self) -> &RoundMetrics {
        &self.last_metrics
    }

    /// Activation order of `round`.
    fn activation_sequence(&self, round: u64) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.particles.len()).collect();
        if self.activation_order == ActivationOrder::Shuffled {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ round);
            order.shuffle(&mut rng);
        }
        order
    }

    /// Configuration of a particle that planned none: the committed one
    /// while it still fits, a fresh singleton one after an expansion change.
    fn default_configuration(
        &self,
        i: usize,
        placement: &Placement,
    ) -> Result<PinConfiguration, CircuitError> {
        let particle = &self.particles[i];
        let orientation = particle.orientation();
        let local_head = placement.head_direction.map(|d| orientation.to_local(d));
        let committed = particle.pin_configuration();
        if committed
            .check_compatible(self.pins_per_edge, local_head)
            .is_ok()
        {
            Ok(committed.without_signals())
        } else {
            PinConfiguration::singleton(self.pins_per_edge, local_head)
        }
    }

    /// Record a resolved round into every history.
    fn commit(
        &mut self,
        round: u64,
        requests: &[MoveRequest],
        placements: &[Placement],
        configs: Vec<PinConfiguration>,
        outcome: CircuitOutcome,
        anchor: ParticleId,
    ) -> Result<(), HistoryError> {
        let deliveries = outcome.deliveries.into_iter();
        for ((((particle, state), request), (&placement, config)), delivery) in self
            .particles
            .iter_mut()
            .zip(&mut self.states)
            .zip(requests)
            .zip(placements.iter().zip(configs))
            .zip(deliveries)
        {
            // Position.
            let before = request.placement;
            match (before.is_expanded(), placement.head_direction) {
                (false, Some(global)) => {
                    let local = particle.orientation().to_local(global);
                    particle.apply_expand(placement.tail, local, round)?;
                }
                (true, None) => match request.action {
                    Some(MovementAction::ContractHead | MovementAction::PullHandoverHead(_)) => {
                        particle.apply_contract_head(placement.tail, round)?
                    }
                    _ => particle.apply_contract_tail(placement.tail, round)?,
                },
                _ => particle.apply_translation(placement, round)?,
            }

            // Circuits.
            particle
                .pin_configuration
                .record_value_in_round(config.without_signals(), round)?;
            particle
                .received_beeps
                .record_value_in_round(delivery.beeps, round)?;
            particle
                .received_messages
                .record_value_in_round(delivery.messages, round)?;

            // Color.
            let (color, color_set) = match state.color() {
                Some(ColorWrite::Set(color)) => (color, true),
                Some(ColorWrite::Reset) => (Color::BLACK, false),
                None => (particle.main_color(), particle.main_color_set()),
            };
            particle.main_color.record_value_in_round(color, round)?;
            particle
                .main_color_set
                .record_value_in_round(color_set, round)?;

            // Attributes.
            let mut writes: Vec<Option<AttributeValue>> = vec![None; particle.attributes.len()];
            for (index, value) in state.take_attribute_writes() {
                if let Some(write) = writes.get_mut(index) {
                    *write = Some(value);
                }
            }
            for (slot, write) in particle.attributes.slots_mut().zip(writes) {
                let value = write.unwrap_or_else(|| slot.value().clone());
                slot.history_mut().record_value_in_round(value, round)?;
            }
        }
        self.anchor.record_value_in_round(anchor, round)
    }

    /// Drop recorded rounds after the marker and resume tracking there.
    fn discard_future(&mut self) {
        if self.is_tracking() {
            return;
        }
        info!(
            round = self.current_round(),
            discarded = self.latest_round() - self.current_round(),
            "discarding rounds after the marker"
        );
        self.cut_off_at_marker();
        self.continue_tracking();
    }

    /// Rebuild the placement cache and occupancy index at the marker.
    fn refresh(&mut self) {
        self.placements = self.particles.iter().map(Particle::placement).collect();
        self.occupancy = Occupancy::rebuild(&self.placements);
    }

    fn for_each_history(
        &mut self,
        op: &dyn Fn(&mut dyn HistoryOps) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError> {
        op(&mut self.anchor)?;
        for particle in &mut self.particles {
            particle.for_each_history(op)?;
        }
        Ok(())
    }

    // ── Timeline ────────────────────────────────────────────────────

    /// The round the system is read at.
    pub fn current_round(&self) -> u64 {
        self.anchor.marked_round()
    }

    /// First recorded round.
    pub fn earliest_round(&self) -> u64 {
        self.anchor.earliest_round()
    }

    /// Last recorded round.
    pub fn latest_round(&self) -> u64 {
        self.anchor.last_round()
    }

    /// Whether the marker follows the latest round.
    pub fn is_tracking(&self) -> bool {
        self.anchor.is_tracking()
    }

    /// Move the marker of every history to `round`.
    ///
    /// Fails with [`HistoryError::RoundOutOfRange`] and leaves the system
    /// unchanged if `round` was not recorded.
    pub fn set_marker_to_round(&mut self, round: u64) -> Result<(), HistoryError> {
        // Every history spans the same rounds, so checking one suffices.
        self.anchor.value_in_round(round)?;
        self.for_each_history(&|h: &mut dyn HistoryOps| h.set_marker_to_round(round))?;
        self.refresh();
        info!(round, "marker moved");
        Ok(())
    }

    /// Move the marker one round back.
    pub fn step_back(&mut self) -> Result<(), HistoryError> {
        let current = self.current_round();
        if current <= self.earliest_round() {
            return Err(HistoryError::NoEarlierRound {
                round: self.earliest_round(),
            });
        }
        self.set_marker_to_round(current - 1)
    }

    /// Move the marker one round forward.
    pub fn step_forward(&mut self) -> Result<(), HistoryError> {
        let current = self.current_round();
        if current >= self.latest_round() {
            return Err(HistoryError::NoLaterRound {
                round: self.latest_round(),
            });
        }
        self.set_marker_to_round(current + 1)
    }

    /// Irreversibly drop every round after the marker.
    pub fn cut_off_at_marker(&mut self) {
        if self.is_tracking() {
            return;
        }
        let _ = self.for_each_history(&|h: &mut dyn HistoryOps| {
            h.cut_off_at_marker();
            Ok(())
        });
        info!(round = self.current_round(), "history cut off at marker");
    }

    /// Move the marker back to the latest round and follow it again.
    pub fn continue_tracking(&mut self) {
        let _ = self.for_each_history(&|h: &mut dyn HistoryOps| {
            h.continue_tracking();
            Ok(())
        });
        self.refresh();
    }

    /// Add `offset` to every recorded round number.
    ///
    /// Fails without changing anything if the earliest round would drop
    /// below zero or the latest would overflow.
    pub fn shift_timescale(&mut self, offset: i64) -> Result<(), HistoryError> {
        // Probe on a copy: every history spans the same rounds.
        self.anchor.clone().shift_timescale(offset)?;
        self.for_each_history(&|h: &mut dyn HistoryOps| h.shift_timescale(offset))?;
        info!(offset, "timescale shifted");
        Ok(())
    }

    // ── Access ──────────────────────────────────────────────────────

    /// Every particle, indexed by id.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The particle with the given id.
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.index())
    }

    /// The particle occupying `node` at the marker.
    pub fn particle_at(&self, node: GridCoord) -> Option<&Particle> {
        self.occupancy
            .at(node)
            .map(|o| &self.particles[o.particle.index()])
    }

    /// Placements at the marker, indexed by particle id.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The anchor at the marker.
    pub fn anchor(&self) -> ParticleId {
        *self.anchor.marked_value()
    }

    /// Full anchor history.
    pub fn anchor_history(&self) -> &ValueHistory<ParticleId> {
        &self.anchor
    }

    /// Make `id` the anchor from the marked round on. Rounds after the
    /// marker are discarded.
    pub fn set_anchor(&mut self, id: ParticleId) -> Result<(), ConfigError> {
        if id.index() >= self.particles.len() {
            return Err(ConfigError::AnchorOutOfRange {
                anchor: id,
                count: self.particles.len(),
            });
        }
        self.discard_future();
        let round = self.current_round();
        self.anchor.record_value_in_round(id, round)?;
        Ok(())
    }

    /// Assign an attribute of one particle from its text form at the
    /// marked round. Rounds after the marker are discarded, but only once
    /// the name and value are known to be valid.
    pub fn set_attribute_by_name(
        &mut self,
        id: ParticleId,
        name: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        if id.index() >= self.particles.len() {
            return Err(ConfigError::UnknownParticle { particle: id });
        }
        let field_error = |source| ConfigError::Field { particle: id, source };
        let (index, parsed) = self.particles[id.index()]
            .attributes
            .parse_named(name, value)
            .map_err(field_error)?;
        self.discard_future();
        self.particles[id.index()]
            .attributes
            .record_at_marker(index, parsed, name, value)
            .map_err(field_error)
    }

    /// Name of the algorithm every particle runs.
    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    /// Pins on every edge.
    pub fn pins_per_edge(&self) -> usize {
        self.pins_per_edge
    }

    /// Activation order.
    pub fn activation_order(&self) -> ActivationOrder {
        self.activation_order
    }

    /// Seed of shuffled activation.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl std::fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("algorithm", &self.algorithm_name)
            .field("particles", &self.particles.len())
            .field("pins_per_edge", &self.pins_per_edge)
            .field("current_round", &self.current_round())
            .field("latest_round", &self.latest_round())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attr;
    use crate::config::InitialParticle;
    use crate::context::{ParticleSense, ParticleWrite};
    use crate::error::ActionError;
    use amoebot_space::Direction;
    use std::sync::{Arc, Mutex};

    // ── Fixtures ────────────────────────────────────────────────────

    /// Particle 0 expands east in round 1 and contracts into its head in
    /// round 2. Everyone counts rounds in an attribute.
    struct Walker {
        count: Attr<i32>,
    }

    impl ParticleAlgorithm for Walker {
        fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
            let count = ctx.get(self.count)?;
            ctx.set(self.count, count + 1)?;
            if ctx.particle_id() == ParticleId(0) {
                match ctx.round() {
                    1 => ctx.expand(Direction::E)?,
                    2 => ctx.contract_head()?,
                    _ => {}
                }
            }
            Ok(())
        }

        fn activate_beep(&self, ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
            if ctx.round() == 1 {
                ctx.set_main_color(Color::RED);
            }
            Ok(())
        }

        fn is_finished(&self, particle: &ParticleView<'_>) -> bool {
            particle.attribute(self.count).is_ok_and(|c| c >= 3)
        }
    }

    struct WalkerFactory;

    impl AlgorithmFactory for WalkerFactory {
        fn name(&self) -> &str {
            "walker"
        }

        fn create(&self, setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
            let count = setup.create_attribute_int("count", 0)?;
            Ok(Box::new(Walker { count }))
        }
    }

    /// Records the activation order of the move phase.
    struct Recorder {
        log: Arc<Mutex<Vec<ParticleId>>>,
    }

    impl ParticleAlgorithm for Recorder {
        fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
            if let Ok(mut log) = self.log.lock() {
                log.push(ctx.particle_id());
            }
            Ok(())
        }

        fn activate_beep(&self, _ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
            Ok(())
        }
    }

    struct RecorderFactory {
        log: Arc<Mutex<Vec<ParticleId>>>,
    }

    impl AlgorithmFactory for RecorderFactory {
        fn name(&self) -> &str {
            "recorder"
        }

        fn create(&self, _setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
            Ok(Box::new(Recorder {
                log: Arc::clone(&self.log),
            }))
        }
    }

    fn line(n: i32) -> SystemConfig {
        SystemConfig::new(
            (0..n)
                .map(|x| InitialParticle::contracted(GridCoord::new(x * 3, 0)))
                .collect(),
        )
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn new_records_initial_state() {
        let mut config = line(3);
        config.start_round = 5;
        let system = ParticleSystem::new(&config, &WalkerFactory).unwrap();
        assert_eq!(system.current_round(), 5);
        assert_eq!(system.earliest_round(), 5);
        assert!(system.is_tracking());
        assert_eq!(system.particles().len(), 3);
        assert_eq!(system.algorithm_name(), "walker");
        assert_eq!(system.anchor(), ParticleId(0));
        assert_eq!(
            system.particle_at(GridCoord::new(3, 0)).map(Particle::id),
            Some(ParticleId(1))
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SystemConfig::new(Vec::new());
        assert!(matches!(
            ParticleSystem::new(&config, &WalkerFactory),
            Err(ConfigError::NoParticles)
        ));
    }

    // ── Rounds ──────────────────────────────────────────────────────

    #[test]
    fn rounds_move_and_record() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        let report = system.simulate_round().unwrap();
        assert_eq!(report.round, 1);
        assert_eq!(report.metrics.moved_particles, 1);
        let p0 = &system.particles()[0];
        assert!(p0.is_expanded());
        assert_eq!(p0.head(), GridCoord::new(1, 0));
        assert_eq!(p0.main_color(), Color::RED);
        assert!(p0.main_color_set());
        // Expansion changed, so the pins were regenerated.
        assert_eq!(p0.pin_configuration().pin_count(), 10);

        system.simulate_round().unwrap();
        let p0 = &system.particles()[0];
        assert!(p0.is_contracted());
        assert_eq!(p0.tail(), GridCoord::new(1, 0));
        assert_eq!(system.latest_round(), 2);
    }

    #[test]
    fn run_stops_when_finished() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        assert_eq!(system.run(10).unwrap(), 3);
        assert!(system.is_finished());
        assert_eq!(system.run(10).unwrap(), 0);
    }

    #[test]
    fn shuffled_order_is_reproducible_per_round() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut config = line(8);
        config.activation_order = ActivationOrder::Shuffled;
        config.seed = 42;
        let factory = RecorderFactory {
            log: Arc::clone(&log),
        };
        let mut system = ParticleSystem::new(&config, &factory).unwrap();
        system.simulate_round().unwrap();
        let first: Vec<_> = log.lock().unwrap().drain(..).collect();
        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, (0..8).map(ParticleId).collect::<Vec<_>>());

        system.set_marker_to_round(0).unwrap();
        system.simulate_round().unwrap();
        let again: Vec<_> = log.lock().unwrap().drain(..).collect();
        assert_eq!(first, again);
    }

    // ── Timeline ────────────────────────────────────────────────────

    #[test]
    fn marker_rewinds_every_field() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        system.run(2).unwrap();
        system.set_marker_to_round(0).unwrap();
        assert!(!system.is_tracking());
        let p0 = &system.particles()[0];
        assert!(p0.is_contracted());
        assert_eq!(p0.tail(), GridCoord::ORIGIN);
        assert_eq!(p0.main_color(), Color::BLACK);
        assert_eq!(system.particle_at(GridCoord::new(1, 0)).map(Particle::id), None);

        system.step_forward().unwrap();
        assert_eq!(system.current_round(), 1);
        assert!(system.particles()[0].is_expanded());
        assert_eq!(
            system.particle_at(GridCoord::new(1, 0)).map(Particle::id),
            Some(ParticleId(0))
        );

        assert!(system.set_marker_to_round(9).is_err());
        assert_eq!(system.current_round(), 1);
        system.continue_tracking();
        assert_eq!(system.current_round(), 2);
        assert!(system.step_forward().is_err());
    }

    #[test]
    fn simulating_in_the_past_discards_the_future() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        system.run(3).unwrap();
        system.set_marker_to_round(1).unwrap();
        let report = system.simulate_round().unwrap();
        assert_eq!(report.round, 2);
        assert_eq!(system.latest_round(), 2);
        assert!(system.is_tracking());
    }

    #[test]
    fn shift_timescale_moves_every_round() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        system.run(2).unwrap();
        system.shift_timescale(10).unwrap();
        assert_eq!(system.earliest_round(), 10);
        assert_eq!(system.latest_round(), 12);
        assert!(system.shift_timescale(-11).is_err());
        assert_eq!(system.earliest_round(), 10);
        system.set_marker_to_round(11).unwrap();
        assert!(system.particles()[0].is_expanded());
    }

    #[test]
    fn set_attribute_by_name_edits_the_marked_round() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        system.run(2).unwrap();
        system.set_marker_to_round(1).unwrap();
        system
            .set_attribute_by_name(ParticleId(1), "count", "40")
            .unwrap();
        assert_eq!(system.latest_round(), 1);
        let count: Attr<i32> = Attr::new(0);
        assert_eq!(system.particles()[1].attribute(count).unwrap(), 40);
        assert!(matches!(
            system.set_attribute_by_name(ParticleId(7), "count", "1"),
            Err(ConfigError::UnknownParticle { .. })
        ));
        assert!(matches!(
            system.set_attribute_by_name(ParticleId(1), "missing", "1"),
            Err(ConfigError::Field { .. })
        ));
    }

    #[test]
    fn rejected_attribute_edit_keeps_the_future() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        system.run(3).unwrap();
        system.set_marker_to_round(1).unwrap();
        let count: Attr<i32> = Attr::new(0);
        let before = system.particles()[1].attribute(count).unwrap();

        assert!(matches!(
            system.set_attribute_by_name(ParticleId(1), "missing", "1"),
            Err(ConfigError::Field { .. })
        ));
        assert!(matches!(
            system.set_attribute_by_name(ParticleId(1), "count", "many"),
            Err(ConfigError::Field { .. })
        ));
        assert_eq!(system.current_round(), 1);
        assert_eq!(system.latest_round(), 3);
        assert_eq!(system.particles()[1].attribute(count).unwrap(), before);

        system.set_marker_to_round(3).unwrap();
        assert_eq!(system.current_round(), 3);
    }

    #[test]
    fn set_anchor_validates_id() {
        let mut system = ParticleSystem::new(&line(2), &WalkerFactory).unwrap();
        system.set_anchor(ParticleId(1)).unwrap();
        assert_eq!(system.anchor(), ParticleId(1));
        assert!(system.set_anchor(ParticleId(2)).is_err());
    }
}
