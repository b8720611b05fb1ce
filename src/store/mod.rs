//! The store: canonical map, live index structure, log, metrics.
//!
//! The store owns the single source of truth (a canonical key→value map),
//! one instance of each index structure, the durability log, and the
//! latency metrics. Exactly one structure mirrors the map at a time; every
//! operation flows canonical-map-first, then into the live structure, then
//! into the log, and finally into the metrics.
//!
//! # Invariants enforced
//!
//! - At any quiescent point, enumerating the live structure yields exactly
//!   the canonical map's content
//! - A mutation is committed only after its log record reaches stable
//!   storage
//! - Replaying the log from empty reproduces the canonical map

mod engine;
mod errors;

pub use engine::{RecoveryStats, Store};
pub use errors::{StoreError, StoreResult};
