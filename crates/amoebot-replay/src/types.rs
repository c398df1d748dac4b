//! The saved-run document.

use amoebot_circuit::MessageRegistry;
use amoebot_engine::{AlgorithmFactory, ParticleSystem, RestoreReport, SystemRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ReplayError;
use crate::hash::state_hash;
use crate::{FORMAT_NAME, FORMAT_VERSION};

/// A whole run as written to disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedRun {
    /// Always [`FORMAT_NAME`].
    pub format: String,
    /// Format version the document was written with.
    pub version: u32,
    /// Version of the crate that wrote the document.
    pub writer_version: String,
    /// [`state_hash`] of the system at its round marker.
    pub state_hash: u64,
    /// Every history of the run.
    pub record: SystemRecord,
}

impl SavedRun {
    /// Capture a running system.
    pub fn capture(system: &ParticleSystem) -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            writer_version: env!("CARGO_PKG_VERSION").to_string(),
            state_hash: state_hash(system),
            record: system.to_record(),
        }
    }

    /// Check the header fields.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.format != FORMAT_NAME {
            return Err(ReplayError::InvalidFormat {
                found: self.format.clone(),
            });
        }
        if self.version != FORMAT_VERSION {
            return Err(ReplayError::UnsupportedVersion { found: self.version });
        }
        Ok(())
    }

    /// Rebuild the system with the algorithm it was written with.
    ///
    /// Values that cannot be restored keep their defaults and are listed
    /// in the report. When nothing was skipped, the restored state must
    /// hash to the saved value, otherwise
    /// [`ReplayError::StateMismatch`] is returned.
    pub fn restore(
        &self,
        factory: &dyn AlgorithmFactory,
        registry: &MessageRegistry,
    ) -> Result<(ParticleSystem, RestoreReport), ReplayError> {
        self.validate()?;
        let (system, report) = ParticleSystem::from_record(&self.record, factory, registry)?;
        let restored = state_hash(&system);
        if report.is_clean() {
            if restored != self.state_hash {
                return Err(ReplayError::StateMismatch {
                    round: system.current_round(),
                    saved: self.state_hash,
                    restored,
                });
            }
        } else {
            warn!(
                issues = report.issues.len(),
                "restored run with skipped values, state hash not checked"
            );
        }
        info!(
            algorithm = %self.record.algorithm,
            particles = system.particles().len(),
            round = system.current_round(),
            "restored saved run"
        );
        Ok((system, report))
    }
}
