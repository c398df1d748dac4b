//! Amoebot: a simulation engine for programmable matter.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! amoebot sub-crates. For most users, adding `amoebot` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use amoebot::prelude::*;
//!
//! // Every particle expands east once.
//! struct Stretch;
//!
//! impl ParticleAlgorithm for Stretch {
//!     fn activate_move(&self, ctx: &mut MoveContext<'_>) -> Result<(), ActionError> {
//!         if ctx.is_contracted() {
//!             ctx.expand(Direction::E)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn activate_beep(&self, _ctx: &mut BeepContext<'_>) -> Result<(), ActionError> {
//!         Ok(())
//!     }
//! }
//!
//! struct StretchFactory;
//!
//! impl AlgorithmFactory for StretchFactory {
//!     fn name(&self) -> &str { "stretch" }
//!     fn create(&self, _setup: &mut ParticleSetup<'_>) -> Result<Box<dyn ParticleAlgorithm>, ActionError> {
//!         Ok(Box::new(Stretch))
//!     }
//! }
//!
//! // Three particles with one free node between neighbors.
//! let params = GenerationParams::new().with("gap", ParamValue::Int(1));
//! let config = LineGenerator.config(3, &params, 0).unwrap();
//! let mut system = ParticleSystem::new(&config, &StretchFactory).unwrap();
//!
//! let report = system.simulate_round().unwrap();
//! assert_eq!(report.round, 1);
//! assert!(system.particles().iter().all(|p| p.is_expanded()));
//!
//! // The past stays readable.
//! system.set_marker_to_round(0).unwrap();
//! assert!(system.particles().iter().all(|p| p.is_contracted()));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `amoebot-core` | IDs, colors, value histories, named fields |
//! | [`space`] | `amoebot-space` | Grid coordinates, directions, ports, shapes |
//! | [`circuit`] | `amoebot-circuit` | Pin configurations, circuits, messages |
//! | [`engine`] | `amoebot-engine` | Particle system, contexts, movement and rounds |
//! | [`generators`] | `amoebot-generators` | Initial placements |
//! | [`replay`] | `amoebot-replay` | Saving, restoring and comparing runs |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`amoebot-core`).
///
/// Contains [`types::ParticleId`], [`types::Color`], the round-indexed
/// [`types::ValueHistory`] and the [`types::HasNamedFields`] trait used
/// for persisting attributes and messages.
pub use amoebot_core as types;

/// Triangular grid geometry (`amoebot-space`).
///
/// Provides [`space::GridCoord`], [`space::Direction`],
/// [`space::Orientation`], port labelling and [`space::Shape`].
pub use amoebot_space as space;

/// Pins, partition sets and circuits (`amoebot-circuit`).
///
/// [`circuit::PinConfiguration`] describes how a particle joins its pins;
/// [`circuit::Message`] is the trait for payloads sent over circuits.
pub use amoebot_circuit as circuit;

/// The simulation engine (`amoebot-engine`).
///
/// [`engine::ParticleSystem`] runs rounds; algorithms implement
/// [`engine::ParticleAlgorithm`] and are built by an
/// [`engine::AlgorithmFactory`].
pub use amoebot_engine as engine;

/// Initial placements (`amoebot-generators`).
///
/// [`generators::LineGenerator`], [`generators::BlobGenerator`] and
/// [`generators::ShapeGenerator`] implement
/// [`generators::GenerationMethod`].
pub use amoebot_generators as generators;

/// Saving, restoring and comparing runs (`amoebot-replay`).
///
/// Write a run with [`replay::save_run`], read it with
/// [`replay::load_run`] and rebuild it with [`replay::SavedRun::restore`].
pub use amoebot_replay as replay;

/// Common imports for typical amoebot usage.
///
/// ```rust
/// use amoebot::prelude::*;
/// ```
///
/// This imports the most frequently used types: the particle system,
/// algorithm traits and contexts, grid types, messages and generators.
pub mod prelude {
    // Core types
    pub use amoebot_core::{Color, ParticleId, ValueHistory};

    // Grid
    pub use amoebot_space::{Direction, GridCoord, Shape};

    // Circuits and messages
    pub use amoebot_circuit::{Message, MessageBox, MessageRegistry, PinConfiguration};

    // Engine
    pub use amoebot_engine::{
        AlgorithmFactory, Attr, BeepContext, InitialParticle, MoveContext, ParticleAlgorithm,
        ParticleSense, ParticleSetup, ParticleSystem, ParticleWrite, RoundMetrics, RoundReport,
        SystemConfig,
    };

    // Errors
    pub use amoebot_engine::{ActionError, ConfigError, RoundError};

    // Generators
    pub use amoebot_generators::{
        BlobGenerator, GenerationMethod, GenerationParams, LineGenerator, ParamValue,
        ShapeGenerator,
    };

    // Replay
    pub use amoebot_replay::{compare_runs, load_run, save_run, state_hash, ReplayError, SavedRun};
}
