//! Store consistency invariant tests.
//!
//! The canonical map is the single source of truth; whichever structure is
//! live must mirror it exactly, and reads must agree under every structure.

use pivotdb::{EngineConfig, Store, StructureKind};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(EngineConfig::with_data_dir(dir.path())).unwrap()
}

// =============================================================================
// Read-your-writes across structures
// =============================================================================

#[test]
fn test_search_agrees_under_every_structure() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    for i in 0..25 {
        store.insert(format!("key{i:02}"), format!("v{i}")).unwrap();
    }
    store.update("key03", "patched").unwrap();

    for kind in StructureKind::ALL {
        store.set_active_structure(kind);
        assert_eq!(
            store.search("key03").unwrap().as_deref(),
            Some("patched"),
            "stale read under {kind}"
        );
        for i in (0..25).filter(|&i| i != 3) {
            assert_eq!(
                store.search(format!("key{i:02}")).unwrap().as_deref(),
                Some(format!("v{i}").as_str()),
                "missing key{i:02} under {kind}"
            );
        }
    }
}

#[test]
fn test_switching_never_changes_get_all() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    for i in 0..30 {
        store.insert(format!("key{i:02}"), format!("v{i}")).unwrap();
    }
    let baseline = store.get_all();

    for kind in [
        StructureKind::AvlTree,
        StructureKind::SkipList,
        StructureKind::BPlusTree,
        StructureKind::SkipList,
    ] {
        store.set_active_structure(kind);
        assert_eq!(store.get_all(), baseline, "content changed under {kind}");
        assert_eq!(store.active_items(), baseline, "mirror diverged under {kind}");
    }
}

#[test]
fn test_get_all_sorted_by_key() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    for key in ["zebra", "apple", "mango", "kiwi"] {
        store.insert(key, "fruit?").unwrap();
    }
    let keys: Vec<String> = store.get_all().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["apple", "kiwi", "mango", "zebra"]);
}

// =============================================================================
// Deletion visibility
// =============================================================================

#[test]
fn test_delete_invisible_under_every_structure() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    for i in 0..10 {
        store.insert(format!("key{i}"), "v").unwrap();
    }
    assert!(store.delete("key4").unwrap());

    for kind in StructureKind::ALL {
        store.set_active_structure(kind);
        assert_eq!(store.search("key4").unwrap(), None, "ghost key under {kind}");
        assert_eq!(store.len(), 9);
    }
}

#[test]
fn test_delete_then_reinsert() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    store.insert("k", "one").unwrap();
    store.delete("k").unwrap();
    store.insert("k", "two").unwrap();
    assert_eq!(store.search("k").unwrap().as_deref(), Some("two"));
}

// =============================================================================
// Recommendation gating
// =============================================================================

#[test]
fn test_search_recommendation_needs_all_three_structures() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.insert("k", "v").unwrap();

    assert_eq!(store.recommended_search_structure(), None);

    store.search("k").unwrap();
    assert_eq!(store.recommended_search_structure(), None);

    store.set_active_structure(StructureKind::AvlTree);
    store.search("k").unwrap();
    assert_eq!(store.recommended_search_structure(), None);

    store.set_active_structure(StructureKind::SkipList);
    store.search("k").unwrap();
    assert!(store.recommended_search_structure().is_some());
}

#[test]
fn test_overall_recommendation_needs_all_three_used() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    store.insert("a", "1").unwrap();
    assert_eq!(store.recommended_structure(), None);

    store.set_active_structure(StructureKind::AvlTree);
    store.insert("b", "2").unwrap();
    store.set_active_structure(StructureKind::SkipList);
    store.insert("c", "3").unwrap();

    assert!(store.recommended_structure().is_some());
    assert!(!store.performance_summary().is_empty());
}

// =============================================================================
// Shape boundary
// =============================================================================

#[test]
fn test_transition_shapes_reflect_both_structures() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.insert("alpha", "1").unwrap();
    store.insert("beta", "2").unwrap();

    let (old_shape, new_shape) = store
        .set_active_structure(StructureKind::SkipList)
        .expect("switch must report shapes");

    assert_eq!(old_shape.structure, StructureKind::BPlusTree);
    assert_eq!(new_shape.structure, StructureKind::SkipList);
    assert!(new_shape.nodes.iter().any(|n| n.id == "header"));
    assert!(new_shape.nodes.iter().any(|n| n.label == "alpha: 1"));

    // Same state, same export
    assert_eq!(store.current_shape(), store.current_shape());
}
