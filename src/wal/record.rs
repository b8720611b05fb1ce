//! Durability log records.
//!
//! One record per line, serialized as a self-describing JSON object:
//!
//! ```text
//! {"timestamp":"2026-08-08T12:00:00Z","operation":"insert","key":"k","value":"v"}
//! ```
//!
//! `key` is null only for `clear`; `value` is null for `delete` and `clear`.
//! Replaying records in file order reconstructs the canonical map exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutation kinds recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Insert-or-overwrite of a record.
    Insert,
    /// Overwrite of an existing record.
    Update,
    /// Removal of a record (null value).
    Delete,
    /// Full reset of the dataset (null key and value).
    Clear,
}

impl Operation {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Clear => "clear",
        }
    }
}

/// A single log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Append time, ISO-8601 in UTC.
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub key: Option<String>,
    pub value: Option<String>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    pub fn new(operation: Operation, key: Option<String>, value: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            key,
            value,
        }
    }

    /// An `insert` record.
    pub fn insert(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Operation::Insert, Some(key.into()), Some(value.into()))
    }

    /// An `update` record.
    pub fn update(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Operation::Update, Some(key.into()), Some(value.into()))
    }

    /// A `delete` record; the value is null.
    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(Operation::Delete, Some(key.into()), None)
    }

    /// A `clear` record; key and value are null.
    pub fn clear() -> Self {
        Self::new(Operation::Clear, None, None)
    }

    /// Serializes to one log line (no trailing newline).
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a log line. Errors mark the line as malformed.
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}
