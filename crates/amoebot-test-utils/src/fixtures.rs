//! Reusable algorithm fixtures.
//!
//! Standard algorithms for engine and tooling tests:
//!
//! - [`IdleFactory`]: does nothing, optionally finished from the start.
//! - [`ScriptedFactory`]: replays movement and bond steps per particle and round.
//! - [`BeepFactory`]: joins every particle into one global circuit and
//!   sends scripted beeps and messages.
//! - [`CounterFactory`]: counts rounds in attributes until a limit.
//! - [`FailingFactory`]: counts like [`CounterFactory`] but fails at a
//!   chosen particle, round and phase.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use amoebot_circuit::MessageBox;
use amoebot_core::{Color, ParticleId};
use amoebot_engine::{
    ActionError, AlgorithmFactory, Attr, BeepContext, MoveContext, ParticleAlgorithm, ParticleSense,
    ParticleSetup, ParticleView, ParticleWrite, Phase,
};
use amoebot_space::Direction;

// ── Idle ────────────────────────────────────────────────────────────

/// Builds algorithms that never act.
pub struct IdleFactory {
    pub pins_per_edge: usize,
    pub finished: bool,
}

impl IdleFactory {
    pub fn new() -> Self {
        Self {
            pins_per_edge: 1,
            finished: false,
        }
    }

    pub fn with_pins(pins_per_edge: usize) -> Self {
        Self {
            pins_per_edge,
            ..Self::new()
        }
    }

    /// Every particle reports termination immediately.
    pub fn finished() -> Self {
        Self {
            finished: true,
            ..Self::new()
        }
    }
}

impl Default for IdleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmFactory for IdleFactory {
    fn name(&self) -> &str {
        "idle"
    }

    fn pins_per_edge(&self) -> usize {
        self.pins_per_edge
    }

    fn create(&self, _setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        Ok(Box::new(IdleAlgorithm {
            finished: self.finished,
        }))
    }
}

pub struct IdleAlgorithm {
    finished: bool,
}

impl ParticleAlgorithm for IdleAlgorithm {
    fn activate_move(&self, _ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    fn activate_beep(&self, _ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    fn is_finished(&self, _particle: &ParticleView<'_>) -> bool {
        self.finished
    }
}

// ── Scripted ────────────────────────────────────────────────────────

/// One move-phase action. Directions are local to the particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Expand(Direction),
    ContractHead,
    ContractTail,
    PushHandover(Direction),
    PullHandoverHead(Direction),
    PullHandoverTail(Direction),
    /// Release the bond at a port; the flag selects the head.
    ReleaseBond(Direction, bool),
    /// Mark the bond at a port; the flag selects the head.
    MarkBond(Direction, bool),
    MakeAnchor,
    SetColor(Color),
}

type Script = HashMap<(ParticleId, u64), Vec<Step>>;

/// Builds algorithms that perform scripted steps in given rounds.
///
/// ```ignore
/// let factory = ScriptedFactory::new()
///     .at(ParticleId(0), 1, Step::Expand(Direction::E))
///     .at(ParticleId(0), 2, Step::ContractHead);
/// ```
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    script: Arc<Script>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step for `particle` in the round numbered `round`.
    pub fn at(mut self, particle: ParticleId, round: u64, step: Step) -> Self {
        Arc::make_mut(&mut self.script)
            .entry((particle, round))
            .or_default()
            .push(step);
        self
    }
}

impl AlgorithmFactory for ScriptedFactory {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create(&self, _setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        Ok(Box::new(ScriptedAlgorithm {
            script: Arc::clone(&self.script),
        }))
    }
}

pub struct ScriptedAlgorithm {
    script: Arc<Script>,
}

impl ParticleAlgorithm for ScriptedAlgorithm {
    fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        let Some(steps) = self.script.get(&(ctx.particle_id(), ctx.round())) else {
            return Ok(());
        };
        for step in steps {
            match *step {
                Step::Expand(d) => ctx.expand(d)?,
                Step::ContractHead => ctx.contract_head()?,
                Step::ContractTail => ctx.contract_tail()?,
                Step::PushHandover(d) => ctx.push_handover(d)?,
                Step::PullHandoverHead(d) => ctx.pull_handover_head(d)?,
                Step::PullHandoverTail(d) => ctx.pull_handover_tail(d)?,
                Step::ReleaseBond(d, head) => ctx.release_bond(d, head)?,
                Step::MarkBond(d, head) => ctx.mark_bond(d, head)?,
                Step::MakeAnchor => ctx.make_anchor(),
                Step::SetColor(color) => ctx.set_main_color(color),
            }
        }
        Ok(())
    }

    fn activate_beep(&self, _ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }
}

// ── Beep ────────────────────────────────────────────────────────────

/// A signal sent on a partition set.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Beep,
    Message(MessageBox),
}

/// Builds algorithms that send scripted signals.
///
/// With `global` set (the default) every particle plans a configuration
/// with all pins in partition set 0, so connected particles share one
/// circuit. Otherwise every pin stays in its own partition set.
pub struct BeepFactory {
    pub pins_per_edge: usize,
    pub global: bool,
    signals: Vec<(ParticleId, u64, usize, Signal)>,
}

impl BeepFactory {
    pub fn new() -> Self {
        Self {
            pins_per_edge: 1,
            global: true,
            signals: Vec::new(),
        }
    }

    /// Keep singleton configurations with the given number of pins.
    pub fn singleton(pins_per_edge: usize) -> Self {
        Self {
            pins_per_edge,
            global: false,
            ..Self::new()
        }
    }

    /// Beep on `set` from `particle` in round `round`.
    pub fn beep(mut self, particle: ParticleId, round: u64, set: usize) -> Self {
        self.signals.push((particle, round, set, Signal::Beep));
        self
    }

    /// Send `message` on `set` from `particle` in round `round`.
    pub fn message(mut self, particle: ParticleId, round: u64, set: usize, message: MessageBox) -> Self {
        self.signals
            .push((particle, round, set, Signal::Message(message)));
        self
    }
}

impl Default for BeepFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmFactory for BeepFactory {
    fn name(&self) -> &str {
        "beep"
    }

    fn pins_per_edge(&self) -> usize {
        self.pins_per_edge
    }

    fn create(&self, setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        let me = setup.particle_id();
        // MessageBox is not Sync, so every particle gets its own copies.
        let signals = self
            .signals
            .iter()
            .filter(|(p, ..)| *p == me)
            .map(|(_, round, set, signal)| (*round, *set, signal.clone()))
            .collect();
        Ok(Box::new(BeepAlgorithm {
            global: self.global,
            signals,
        }))
    }
}

pub struct BeepAlgorithm {
    global: bool,
    signals: Vec<(u64, usize, Signal)>,
}

impl ParticleAlgorithm for BeepAlgorithm {
    fn activate_move(&self, _ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    fn activate_beep(&self, ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        if self.global {
            let config = ctx.global_pin_configuration()?;
            ctx.set_planned_pin_configuration(config)?;
        }
        let round = ctx.round();
        for (_, set, signal) in self.signals.iter().filter(|(r, ..)| *r == round) {
            match signal {
                Signal::Beep => ctx.send_beep_on_partition_set(*set)?,
                Signal::Message(message) => ctx.forward_message_on_partition_set(*set, message.clone())?,
            }
        }
        Ok(())
    }
}

// ── Counter ─────────────────────────────────────────────────────────

/// Attribute handles shared by the counting fixtures.
#[derive(Clone, Copy, Debug)]
pub struct CounterAttrs {
    pub count: Attr<i32>,
    pub even: Attr<bool>,
    pub heading: Attr<Option<Direction>>,
}

impl CounterAttrs {
    fn declare(setup: &mut ParticleSetup<'_>) -> Result<Self, ActionError> {
        Ok(Self {
            count: setup.create_attribute_int("count", 0)?,
            even: setup.create_attribute_bool("even", true)?,
            heading: setup.create_attribute_direction("heading", None)?,
        })
    }

    /// Increment the count and update the derived attributes.
    fn tick<C: ParticleWrite>(&self, ctx: &mut C) -> Result<i32, ActionError> {
        let count = ctx.get(self.count)? + 1;
        ctx.set(self.count, count)?;
        ctx.set(self.even, count % 2 == 0)?;
        ctx.set(self.heading, Some(Direction::E.rotate60(count)))?;
        Ok(count)
    }
}

/// Builds algorithms that count rounds and finish at `limit`.
///
/// Particles turn green on reaching the limit.
pub struct CounterFactory {
    pub limit: i32,
}

impl CounterFactory {
    pub fn new(limit: i32) -> Self {
        Self { limit }
    }
}

impl AlgorithmFactory for CounterFactory {
    fn name(&self) -> &str {
        "counter"
    }

    fn create(&self, setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        let attrs = CounterAttrs::declare(setup)?;
        Ok(Box::new(CounterAlgorithm {
            attrs,
            limit: self.limit,
        }))
    }
}

pub struct CounterAlgorithm {
    attrs: CounterAttrs,
    limit: i32,
}

impl ParticleAlgorithm for CounterAlgorithm {
    fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        if ctx.get(self.attrs.count)? < self.limit {
            self.attrs.tick(ctx)?;
        }
        Ok(())
    }

    fn activate_beep(&self, ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        if ctx.get(self.attrs.count)? >= self.limit {
            ctx.set_main_color(Color::GREEN);
        }
        Ok(())
    }

    fn is_finished(&self, particle: &ParticleView<'_>) -> bool {
        particle
            .attribute(self.attrs.count)
            .is_ok_and(|c| c >= self.limit)
    }
}

// ── Failing ─────────────────────────────────────────────────────────

/// Builds algorithms that fail deterministically.
///
/// Every particle counts rounds, turns red in the beep phase and walks
/// east by alternately expanding and contracting into its head. The
/// chosen particle returns [`ActionError::Algorithm`] in the chosen
/// round and phase instead. `calls` counts the failures for assertions.
pub struct FailingFactory {
    pub particle: ParticleId,
    pub round: u64,
    pub phase: Phase,
    pub calls: Arc<AtomicUsize>,
}

impl FailingFactory {
    pub fn new(particle: ParticleId, round: u64, phase: Phase) -> Self {
        Self {
            particle,
            round,
            phase,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times the failure was triggered.
    pub fn failures(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl AlgorithmFactory for FailingFactory {
    fn name(&self) -> &str {
        "failing"
    }

    fn create(&self, setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        let attrs = CounterAttrs::declare(setup)?;
        Ok(Box::new(FailingAlgorithm {
            attrs,
            fails: setup.particle_id() == self.particle,
            round: self.round,
            phase: self.phase,
            calls: Arc::clone(&self.calls),
        }))
    }
}

pub struct FailingAlgorithm {
    attrs: CounterAttrs,
    fails: bool,
    round: u64,
    phase: Phase,
    calls: Arc<AtomicUsize>,
}

impl FailingAlgorithm {
    fn check(&self, round: u64, phase: Phase) -> Result<(), ActionError> {
        if self.fails && round == self.round && phase == self.phase {
            self.calls.fetch_add(1, Ordering::Relaxed);
            return Err(ActionError::Algorithm(format!(
                "failing in the {phase} phase of round {round}"
            )));
        }
        Ok(())
    }
}

impl ParticleAlgorithm for FailingAlgorithm {
    fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        self.attrs.tick(ctx)?;
        if ctx.is_expanded() {
            ctx.contract_head()?;
        } else {
            ctx.expand(Direction::E)?;
        }
        self.check(ctx.round(), Phase::Move)
    }

    fn activate_beep(&self, ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        ctx.set_main_color(Color::RED);
        ctx.send_beep_on_partition_set(0)?;
        self.check(ctx.round(), Phase::Beep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::PriorityMessage;

    #[test]
    fn scripted_factory_accumulates_steps() {
        let factory = ScriptedFactory::new()
            .at(ParticleId(0), 1, Step::Expand(Direction::E))
            .at(ParticleId(0), 1, Step::MakeAnchor)
            .at(ParticleId(1), 2, Step::ContractHead);
        assert_eq!(factory.script.len(), 2);
        assert_eq!(
            factory.script[&(ParticleId(0), 1)],
            vec![Step::Expand(Direction::E), Step::MakeAnchor]
        );
    }

    #[test]
    fn scripted_factory_clones_share_until_written() {
        let base = ScriptedFactory::new().at(ParticleId(0), 1, Step::ContractTail);
        let extended = base.clone().at(ParticleId(0), 2, Step::ContractHead);
        assert_eq!(base.script.len(), 1);
        assert_eq!(extended.script.len(), 2);
    }

    #[test]
    fn beep_factory_keeps_signal_order() {
        let factory = BeepFactory::new()
            .beep(ParticleId(0), 1, 0)
            .message(ParticleId(0), 1, 0, MessageBox::new(PriorityMessage::new(3)));
        assert_eq!(factory.signals.len(), 2);
        assert_eq!(factory.signals[0].3, Signal::Beep);
        assert!(factory.global);
        assert!(!BeepFactory::singleton(2).global);
    }
}
