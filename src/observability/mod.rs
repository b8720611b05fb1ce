//! Structured logging and latency metrics.

pub mod logger;
pub mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{Clock, MetricsTable, OpKind, StructureSummary, WallClock};
