//! Saving, restoring and comparing amoebot simulation runs.
//!
//! A run is saved as a JSON [`SavedRun`]: a format header, the
//! [`SystemRecord`](amoebot_engine::SystemRecord) holding every history
//! of every particle, and a [`state_hash`] of the state at the round
//! marker. Loading rebuilds the system through the algorithm factory and
//! checks the hash, so a restore that silently diverges is caught.
//!
//! # Architecture
//!
//! - [`save_run`] / [`save_to_path`] write a run to any `Write` sink
//! - [`load_run`] / [`load_from_path`] read one back from any `Read` source
//! - [`SavedRun::restore`] rebuilds a [`ParticleSystem`](amoebot_engine::ParticleSystem)
//! - [`compare_runs`] finds the first round, particle and field where two
//!   runs differ
//!
//! # Format
//!
//! ```text
//! {
//!   "format": "amoebot-run",
//!   "version": 1,
//!   "writer_version": "0.1.0",
//!   "state_hash": 1234567890,
//!   "record": { "algorithm": ..., "particles": [...] }
//! }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
pub mod hash;
pub mod reader;
pub mod types;
pub mod writer;

pub use compare::{compare_runs, compare_records, Divergence};
pub use error::ReplayError;
pub use hash::state_hash;
pub use reader::{load_from_path, load_run};
pub use types::SavedRun;
pub use writer::{save_run, save_to_path};

/// Value of the `format` field of every saved run.
pub const FORMAT_NAME: &str = "amoebot-run";

/// Current format version.
///
/// History:
/// - v1: JSON record with per-field `(round, value)` change entries
pub const FORMAT_VERSION: u32 = 1;
