//! Error types for saving and loading runs.

use amoebot_engine::RestoreError;
use std::io;
use thiserror::Error;

/// Errors that make a saved run unusable.
///
/// Values that merely could not be restored are not errors; they are
/// listed in the [`RestoreReport`](amoebot_engine::RestoreReport).
#[derive(Debug, Error)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The document is not valid JSON or does not have the run layout.
    #[error("malformed run document: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is not a saved run.
    #[error("unexpected format '{found}' (expected \"amoebot-run\")")]
    InvalidFormat {
        /// The format name found in the document.
        found: String,
    },
    /// The format version is not supported by this build.
    #[error("unsupported format version {found}")]
    UnsupportedVersion {
        /// The version found in the document.
        found: u32,
    },
    /// The record cannot be turned back into a system.
    #[error(transparent)]
    Restore(#[from] RestoreError),
    /// The restored state does not hash to the saved value.
    #[error("state mismatch at round {round}: saved={saved:#018x}, restored={restored:#018x}")]
    StateMismatch {
        /// The marker round both hashes were taken at.
        round: u64,
        /// Hash stored in the document.
        saved: u64,
        /// Hash of the restored system.
        restored: u64,
    },
}
