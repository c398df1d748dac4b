//! Test utilities and fixture algorithms for amoebot development.
//!
//! Provides small algorithms with scripted or trivial behaviour
//! ([`fixtures`]), message types for circuit tests ([`messages`]) and
//! helpers for building common particle arrangements.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod messages;

use amoebot_engine::{AlgorithmFactory, ConfigError, InitialParticle, ParticleSystem, SystemConfig};
use amoebot_space::{Direction, GridCoord};

/// `n` contracted particles on consecutive nodes east of the origin.
pub fn line_config(n: i32) -> SystemConfig {
    spaced_line_config(n, 1)
}

/// `n` contracted particles east of the origin, `spacing` nodes apart.
pub fn spaced_line_config(n: i32, spacing: i32) -> SystemConfig {
    SystemConfig::new(
        (0..n)
            .map(|x| InitialParticle::contracted(GridCoord::new(x * spacing, 0)))
            .collect(),
    )
}

/// A configuration from explicit `(tail, head direction)` pairs.
pub fn placed_config(particles: &[(GridCoord, Option<Direction>)]) -> SystemConfig {
    SystemConfig::new(
        particles
            .iter()
            .map(|&(tail, head)| match head {
                Some(d) => InitialParticle::expanded(tail, d),
                None => InitialParticle::contracted(tail),
            })
            .collect(),
    )
}

/// Build a system, panicking with the error on failure.
pub fn system_with(config: &SystemConfig, factory: &dyn AlgorithmFactory) -> ParticleSystem {
    try_system_with(config, factory).unwrap_or_else(|e| panic!("system construction failed: {e}"))
}

/// Build a system.
pub fn try_system_with(
    config: &SystemConfig,
    factory: &dyn AlgorithmFactory,
) -> Result<ParticleSystem, ConfigError> {
    ParticleSystem::new(config, factory)
}
