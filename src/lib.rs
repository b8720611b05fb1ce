//! pivotdb - an embedded key-value engine with switchable index structures
//!
//! A single logical dataset lives in a canonical key→value map and is
//! mirrored into exactly one of three ordered index structures at a time:
//! a B+-tree, an AVL tree, or a skip list. The live structure can be
//! switched at runtime; every mutation is appended to a durability log and
//! forced to stable storage before it is acknowledged, and per-structure
//! operation latencies are tracked so the engine can recommend the fastest
//! structure for lookups.

pub mod config;
pub mod index;
pub mod observability;
pub mod scalar;
pub mod shape;
pub mod store;
pub mod wal;

// Public re-exports for the top-level API
pub use config::EngineConfig;
pub use index::StructureKind;
pub use scalar::Scalar;
pub use store::{RecoveryStats, Store, StoreError, StoreResult};
