//! Durability log error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for log operations.
pub type WalResult<T> = Result<T, WalError>;

/// Errors surfaced by the durability log.
///
/// Append and sync failures are correctness failures: an operation whose
/// record did not reach stable storage must never be reported as committed.
/// Malformed replay lines are not represented here; the reader skips and
/// counts them instead.
#[derive(Debug, Error)]
pub enum WalError {
    /// The log file or its directory could not be opened or created.
    #[error("failed to open log at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record could not be written to the log file.
    #[error("failed to append log record: {0}")]
    Append(#[source] io::Error),

    /// The log could not be forced to stable storage.
    #[error("failed to sync log to stable storage: {0}")]
    Sync(#[source] io::Error),

    /// The log could not be read during replay.
    #[error("failed to read log: {0}")]
    Read(#[source] io::Error),

    /// The log file could not be truncated.
    #[error("failed to truncate log: {0}")]
    Truncate(#[source] io::Error),

    /// A record could not be encoded as a log line.
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}
