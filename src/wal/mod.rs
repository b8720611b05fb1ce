//! Durability log subsystem.
//!
//! Every committed mutation is appended to a log file, one self-describing
//! JSON record per line, and forced to stable storage before the caller
//! observes success. On startup the store replays the log in order to
//! rebuild its canonical map.
//!
//! # Design principles
//!
//! - Append-only; the only truncation point is an explicit `clear`
//! - Flush-and-sync on every append (no batching, no async durability)
//! - Replay skips malformed lines and keeps going; IO failures surface
//! - The log is the sole persisted artifact; indexes rebuild from it

mod errors;
mod reader;
mod record;
mod writer;

pub use errors::{WalError, WalResult};
pub use reader::WalReader;
pub use record::{LogRecord, Operation};
pub use writer::{WalWriter, LOG_FILE_NAME};
