//! Reading saved runs.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::ReplayError;
use crate::types::SavedRun;

/// Read and check a saved run from any `Read` source.
pub fn load_run<R: Read>(reader: R) -> Result<SavedRun, ReplayError> {
    let saved: SavedRun = serde_json::from_reader(reader)?;
    saved.validate()?;
    Ok(saved)
}

/// Read and check a saved run from a file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SavedRun, ReplayError> {
    load_run(BufReader::new(File::open(path)?))
}
