//! Writing saved runs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use amoebot_engine::ParticleSystem;
use tracing::info;

use crate::error::ReplayError;
use crate::types::SavedRun;

/// Write a run as pretty-printed JSON to any `Write` sink.
pub fn save_run<W: Write>(system: &ParticleSystem, mut writer: W) -> Result<SavedRun, ReplayError> {
    let saved = SavedRun::capture(system);
    serde_json::to_writer_pretty(&mut writer, &saved)?;
    writer.flush()?;
    info!(
        algorithm = %saved.record.algorithm,
        latest_round = saved.record.latest_round,
        "saved run"
    );
    Ok(saved)
}

/// Write a run to a file, replacing it if it exists.
pub fn save_to_path(system: &ParticleSystem, path: impl AsRef<Path>) -> Result<SavedRun, ReplayError> {
    let file = File::create(path)?;
    save_run(system, BufWriter::new(file))
}
