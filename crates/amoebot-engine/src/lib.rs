//! Simulation engine for the amoebot model.
//!
//! A [`ParticleSystem`] holds a set of particles on the triangular grid,
//! each running an instance of the same [`ParticleAlgorithm`], and
//! advances them in synchronous rounds. Every round has a move phase,
//! after which the joint movement of all particles is resolved, and a
//! beep phase, after which signals travel along the circuits formed by
//! the particles' pin configurations.
//!
//! # Architecture
//!
//! - [`ParticleSystem`]: round driver, timeline control and queries
//! - [`Particle`], [`ParticleView`]: per-particle state backed by
//!   [`ValueHistory`](amoebot_core::ValueHistory) timelines
//! - [`MoveContext`], [`BeepContext`], [`ParticleSetup`]: what an
//!   algorithm may see and do during each kind of activation
//! - [`SystemConfig`]: initial placement, activation order and seed
//! - [`SystemRecord`]: persisted form of a whole run
//!
//! # Example
//!
//! ```ignore
//! let mut system = ParticleSystem::new(&config, &MyFactory)?;
//! while !system.is_finished() {
//!     let report = system.simulate_round()?;
//!     println!("round {} moved {}", report.round, report.metrics.moved_particles);
//! }
//! system.set_marker_to_round(0)?;
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algorithm;
pub mod attribute;
mod circuits;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
mod movement;
pub mod occupancy;
pub mod particle;
pub mod record;
pub mod round;
pub mod system;

pub use algorithm::{AlgorithmFactory, ParticleAlgorithm};
pub use attribute::{Attr, AttributeEnum, AttributeStore, AttributeType, AttributeValue};
pub use config::{ActivationOrder, InitialParticle, SystemConfig};
pub use context::{BeepContext, MoveContext, NeighborHit, ParticleSense, ParticleSetup, ParticleWrite};
pub use error::{ActionError, ConfigError, MovementConflict, Phase, RestoreError, RoundError};
pub use metrics::RoundMetrics;
pub use occupancy::{Occupancy, Occupant};
pub use particle::{Particle, ParticleView, Placement};
pub use record::{RestoreIssue, RestoreReport, SystemRecord};
pub use round::{MovementAction, RoundState};
pub use system::{ParticleSystem, RoundReport};
