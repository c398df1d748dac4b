//! Benchmark profiles and workloads for the amoebot simulation engine.
//!
//! Provides pre-built [`SystemConfig`] profiles and algorithms that load
//! the two halves of a round:
//!
//! - [`reference_profile`]: 1K-particle random blob
//! - [`stress_profile`]: 10K-particle random blob
//! - [`walking_line`]: spaced line whose particles all move every round
//! - [`PulseFactory`]: one global circuit, a beep every round, attribute
//!   updates in every particle
//! - [`WalkFactory`]: every particle alternately expands and contracts east

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use amoebot_core::{Color, ParticleId};
use amoebot_engine::{
    ActionError, AlgorithmFactory, Attr, BeepContext, MoveContext, ParticleAlgorithm, ParticleSense,
    ParticleSetup, ParticleWrite, SystemConfig,
};
use amoebot_generators::{
    BlobGenerator, GenerationError, GenerationMethod, GenerationParams, LineGenerator, ParamValue,
};
use amoebot_space::Direction;

/// Build a reference benchmark profile: a 1K-particle blob, a fifth of
/// the particles expanded.
pub fn reference_profile(seed: u64) -> Result<SystemConfig, GenerationError> {
    blob_profile(1_000, seed)
}

/// Build a stress benchmark profile: a 10K-particle blob.
///
/// Same layout as [`reference_profile`] at 10x the particle count.
pub fn stress_profile(seed: u64) -> Result<SystemConfig, GenerationError> {
    blob_profile(10_000, seed)
}

fn blob_profile(count: usize, seed: u64) -> Result<SystemConfig, GenerationError> {
    let params = GenerationParams::new()
        .with("expanded_fraction", ParamValue::Float(0.2))
        .with("random_orientation", ParamValue::Bool(true));
    BlobGenerator.config(count, &params, seed)
}

/// A line of `count` contracted particles with two free nodes between
/// neighbors, so that [`WalkFactory`] never produces a conflict.
pub fn walking_line(count: usize) -> Result<SystemConfig, GenerationError> {
    let params = GenerationParams::new().with("gap", ParamValue::Int(2));
    LineGenerator.config(count, &params, 0)
}

// ── Pulse ───────────────────────────────────────────────────────────

/// Builds algorithms that keep one global circuit busy.
///
/// Every particle joins all its pins into one partition set. Particle 0
/// beeps every round; every particle that heard the previous beep counts
/// it and flips its color.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulseFactory;

impl AlgorithmFactory for PulseFactory {
    fn name(&self) -> &str {
        "pulse"
    }

    fn pins_per_edge(&self) -> usize {
        2
    }

    fn create(&self, setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        Ok(Box::new(PulseAlgorithm {
            heard: setup.create_attribute_int("heard", 0)?,
            source: setup.particle_id() == ParticleId(0),
        }))
    }
}

struct PulseAlgorithm {
    heard: Attr<i32>,
    source: bool,
}

impl ParticleAlgorithm for PulseAlgorithm {
    fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        if ctx.received_any_beep() {
            let heard = ctx.get(self.heard)? + 1;
            ctx.set(self.heard, heard)?;
            ctx.set_main_color(if heard % 2 == 0 { Color::BLUE } else { Color::YELLOW });
        }
        Ok(())
    }

    fn activate_beep(&self, ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        let config = ctx.global_pin_configuration()?;
        ctx.set_planned_pin_configuration(config)?;
        if self.source {
            ctx.send_beep_on_partition_set(0)?;
        }
        Ok(())
    }
}

// ── Walk ────────────────────────────────────────────────────────────

/// Builds algorithms that walk east: expand when contracted, contract
/// into the head when expanded.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkFactory;

impl AlgorithmFactory for WalkFactory {
    fn name(&self) -> &str {
        "walk"
    }

    fn create(&self, _setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
        Ok(Box::new(WalkAlgorithm))
    }
}

struct WalkAlgorithm;

impl ParticleAlgorithm for WalkAlgorithm {
    fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
        if ctx.is_expanded() {
            ctx.contract_head()
        } else {
            ctx.expand(Direction::E)
        }
    }

    fn activate_beep(&self, _ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
        Ok(())
    }
}
