//! Durability log recovery tests.
//!
//! The log is the only persisted artifact: replaying it from empty must
//! reproduce the canonical map exactly, malformed lines must be skipped
//! without aborting recovery, and `clear` must leave a fresh single-record
//! log behind.

use std::io::Write;

use pivotdb::{EngineConfig, Store, StructureKind};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(EngineConfig::with_data_dir(dir.path())).unwrap()
}

fn wal_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("wal").join("wal.log")
}

#[test]
fn test_replay_reproduces_canonical_map() {
    let dir = TempDir::new().unwrap();

    let expected = {
        let mut store = open_store(&dir);
        for i in 0..20 {
            store.insert(format!("key{i:02}"), format!("v{i}")).unwrap();
        }
        store.update("key07", "updated").unwrap();
        store.delete("key03").unwrap();
        store.delete("key15").unwrap();
        store.insert("key03", "reborn").unwrap();
        store.get_all()
    };

    let store = open_store(&dir);
    assert_eq!(store.get_all(), expected);
    assert_eq!(store.recovery_stats().records_replayed, 24);
    assert_eq!(store.recovery_stats().lines_skipped, 0);
}

#[test]
fn test_recovery_rebuilds_active_structure() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.insert("a", "1").unwrap();
        store.insert("b", "2").unwrap();
    }

    let mut store = open_store(&dir);
    assert_eq!(store.active_structure(), StructureKind::BPlusTree);
    assert_eq!(store.active_items(), store.get_all());
    assert_eq!(store.search("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_recovery_honors_configured_default_structure() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.insert("a", "1").unwrap();
    }

    let mut config = EngineConfig::with_data_dir(dir.path());
    config.default_structure = StructureKind::SkipList;
    let mut store = Store::open(config).unwrap();
    assert_eq!(store.active_structure(), StructureKind::SkipList);
    assert_eq!(store.search("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_malformed_lines_skipped_during_recovery() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.insert("good", "1").unwrap();
    }

    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(wal_path(&dir))
            .unwrap();
        writeln!(file, "### torn write ###").unwrap();
    }

    {
        let mut store = open_store(&dir);
        assert_eq!(store.recovery_stats().lines_skipped, 1);
        assert_eq!(store.search("good").unwrap().as_deref(), Some("1"));
        // The store keeps working after a partial recovery
        store.insert("after", "2").unwrap();
    }

    let store = open_store(&dir);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_clear_then_reopen_is_empty() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.insert("a", "1").unwrap();
        store.insert("b", "2").unwrap();
        store.search("a").unwrap();
        store.clear().unwrap();
    }

    let store = open_store(&dir);
    assert!(store.is_empty());
    assert!(store.get_metrics().is_empty());
    assert_eq!(store.recovery_stats().records_replayed, 1);
}

#[test]
fn test_clear_leaves_single_record_log() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        for i in 0..10 {
            store.insert(format!("k{i}"), "v").unwrap();
        }
        store.clear().unwrap();
    }

    let contents = std::fs::read_to_string(wal_path(&dir)).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("\"operation\":\"clear\""));
}

#[test]
fn test_log_lines_are_self_describing_json() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.insert("k", "v").unwrap();
        store.delete("k").unwrap();
    }

    let contents = std::fs::read_to_string(wal_path(&dir)).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    let insert: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(insert["operation"], "insert");
    assert_eq!(insert["key"], "k");
    assert_eq!(insert["value"], "v");
    assert!(insert["timestamp"].as_str().unwrap().contains('T'));

    let delete: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(delete["operation"], "delete");
    assert!(delete["value"].is_null());
}

#[test]
fn test_replay_is_deterministic() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        for i in 0..15 {
            store.insert(format!("key{i:02}"), format!("v{i}")).unwrap();
        }
        store.delete("key09").unwrap();
    }

    let first = open_store(&dir).get_all();
    let second = open_store(&dir).get_all();
    assert_eq!(first, second);
}

#[test]
fn test_operations_before_crash_survive() {
    // Dropping the store without any shutdown step models a crash: every
    // acknowledged operation must already be on stable storage.
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.insert("committed", "yes").unwrap();
        // No explicit close
    }

    let mut store = open_store(&dir);
    assert_eq!(store.search("committed").unwrap().as_deref(), Some("yes"));
}
