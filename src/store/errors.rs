//! Store error types.

use thiserror::Error;

use crate::scalar::InvalidScalar;
use crate::wal::WalError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store operations.
///
/// Absent keys are not errors: `update`/`delete` report them as `Ok(false)`
/// and `search` as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key cannot be normalized to a stable string form. Rejected
    /// before any mutation.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] InvalidScalar),

    /// The durability log could not persist a mutation; the operation is
    /// not committed.
    #[error(transparent)]
    Wal(#[from] WalError),
}
