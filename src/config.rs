//! Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::index::StructureKind;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the durability log (default: "data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Fanout of the B+-tree: separator keys per internal node (default: 4)
    #[serde(default = "default_branching_order")]
    pub branching_order: usize,

    /// Level ceiling for the skip list (default: 16)
    #[serde(default = "default_skiplist_max_level")]
    pub skiplist_max_level: usize,

    /// Promotion probability for skip list level draws (default: 0.5)
    #[serde(default = "default_skiplist_promotion")]
    pub skiplist_promotion: f64,

    /// Structure that is live after startup (default: btree)
    #[serde(default)]
    pub default_structure: StructureKind,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_branching_order() -> usize {
    4
}

fn default_skiplist_max_level() -> usize {
    16
}

fn default_skiplist_promotion() -> f64 {
    0.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            branching_order: default_branching_order(),
            skiplist_max_level: default_skiplist_max_level(),
            skiplist_promotion: default_skiplist_promotion(),
            default_structure: StructureKind::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config rooted at the given data directory
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }
}
