//! Ordered index structures.
//!
//! Three interchangeable structures mirror the store's canonical map:
//! a B+-tree, an AVL tree, and a skip list. Each implements `insert`,
//! `search`, ordered iteration, and structural export, and nothing else.
//! The structures are insert/search-only by design: the store services
//! deletions by rebuilding the live structure from the canonical map, so no
//! structure carries removal logic.

mod avl;
mod bplus;
mod skiplist;

pub use avl::AvlTree;
pub use bplus::{BPlusTree, LeafIter};
pub use skiplist::{SkipIter, SkipList};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag identifying one of the three index structures.
///
/// Exactly one structure is live at a time; the store dispatches on this tag
/// at a single point per operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Multiway leaf-linked tree.
    #[serde(rename = "btree")]
    BPlusTree,
    /// Self-balancing binary tree.
    #[serde(rename = "avl")]
    AvlTree,
    /// Probabilistic layered list.
    #[serde(rename = "skip_list")]
    SkipList,
}

impl StructureKind {
    /// Every structure kind, in tag order.
    pub const ALL: [StructureKind; 3] = [
        StructureKind::BPlusTree,
        StructureKind::AvlTree,
        StructureKind::SkipList,
    ];

    /// Wire/display tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::BPlusTree => "btree",
            StructureKind::AvlTree => "avl",
            StructureKind::SkipList => "skip_list",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StructureKind::BPlusTree => "B+ Tree",
            StructureKind::AvlTree => "AVL Tree",
            StructureKind::SkipList => "Skip List",
        }
    }
}

impl Default for StructureKind {
    fn default() -> Self {
        StructureKind::BPlusTree
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tags() {
        assert_eq!(
            serde_json::to_string(&StructureKind::BPlusTree).unwrap(),
            "\"btree\""
        );
        assert_eq!(
            serde_json::from_str::<StructureKind>("\"skip_list\"").unwrap(),
            StructureKind::SkipList
        );
    }

    #[test]
    fn test_default_is_btree() {
        assert_eq!(StructureKind::default(), StructureKind::BPlusTree);
    }

    #[test]
    fn test_all_covers_each_kind() {
        assert_eq!(StructureKind::ALL.len(), 3);
        for kind in StructureKind::ALL {
            assert!(StructureKind::ALL.contains(&kind));
            assert!(!kind.as_str().is_empty());
        }
    }
}
