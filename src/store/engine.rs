//! Store engine.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::EngineConfig;
use crate::index::{AvlTree, BPlusTree, SkipList, StructureKind};
use crate::observability::logger::{Logger, Severity};
use crate::observability::metrics::{Clock, MetricsTable, OpKind, StructureSummary, WallClock};
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::store::errors::StoreResult;
use crate::wal::{LogRecord, Operation, WalReader, WalWriter};

/// Summary of the log replay performed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Well-formed records applied.
    pub records_replayed: usize,
    /// Malformed lines skipped.
    pub lines_skipped: usize,
}

/// The embedded key-value store.
///
/// Owns the canonical map, all three index structures, the durability log,
/// and the metrics table. A single `Store` is constructed once per session
/// and passed by reference to every caller; `&mut self` on mutating
/// operations gives the exclusive-writer discipline for free.
pub struct Store {
    config: EngineConfig,
    /// Single source of truth. The index structures are disposable views.
    data: BTreeMap<String, String>,
    btree: BPlusTree,
    avl: AvlTree,
    skiplist: SkipList,
    active: StructureKind,
    /// Structures that have served at least one operation this session.
    used: BTreeSet<StructureKind>,
    metrics: MetricsTable,
    wal: WalWriter,
    clock: Box<dyn Clock>,
    recovery: RecoveryStats,
}

impl Store {
    /// Opens the store, replaying the durability log into the canonical map
    /// and rebuilding the default structure from it.
    pub fn open(config: EngineConfig) -> StoreResult<Self> {
        Self::with_clock(config, Box::new(WallClock::new()))
    }

    /// Opens the store with an explicit clock for latency measurement.
    pub fn with_clock(config: EngineConfig, clock: Box<dyn Clock>) -> StoreResult<Self> {
        let wal = WalWriter::open(&config.data_dir)?;
        let active = config.default_structure;
        let mut store = Store {
            data: BTreeMap::new(),
            btree: BPlusTree::new(config.branching_order),
            avl: AvlTree::new(),
            skiplist: SkipList::new(config.skiplist_max_level, config.skiplist_promotion),
            active,
            used: BTreeSet::from([active]),
            metrics: MetricsTable::new(),
            wal,
            clock,
            recovery: RecoveryStats::default(),
            config,
        };
        store.recover()?;
        Ok(store)
    }

    /// Replays the log in file order into the empty canonical map, then
    /// rebuilds the active structure from the result.
    fn recover(&mut self) -> StoreResult<()> {
        let mut reader = WalReader::open(self.wal.path())?;
        let records = reader.read_all()?;
        for record in &records {
            match record.operation {
                Operation::Insert | Operation::Update => {
                    if let (Some(key), Some(value)) = (&record.key, &record.value) {
                        self.data.insert(key.clone(), value.clone());
                    }
                }
                Operation::Delete => {
                    if let Some(key) = &record.key {
                        self.data.remove(key);
                    }
                }
                Operation::Clear => self.data.clear(),
            }
        }
        self.recovery = RecoveryStats {
            records_replayed: records.len(),
            lines_skipped: reader.skipped(),
        };
        if self.recovery.lines_skipped > 0 {
            let lines = self.recovery.lines_skipped.to_string();
            Logger::log_stderr(Severity::Warn, "log_replay_skipped", &[("lines", &lines)]);
        }
        let records_field = self.recovery.records_replayed.to_string();
        let keys_field = self.data.len().to_string();
        Logger::log(
            Severity::Info,
            "recovery_complete",
            &[("records", &records_field), ("keys", &keys_field)],
        );
        self.rebuild_active();
        Ok(())
    }

    /// Inserts or overwrites a record.
    pub fn insert(&mut self, key: impl Into<Scalar>, value: impl Into<String>) -> StoreResult<()> {
        let key = key.into().normalize()?;
        let value = value.into();
        let started = self.clock.now_ms();
        self.data.insert(key.clone(), value.clone());
        self.apply_to_active(&key, &value);
        let elapsed = self.clock.now_ms() - started;
        self.wal.append(&LogRecord::insert(key.clone(), value))?;
        self.note_op(OpKind::Insert, elapsed, &key);
        Ok(())
    }

    /// Overwrites an existing record. Returns `Ok(false)` when the key is
    /// absent; nothing is mutated or logged in that case.
    pub fn update(&mut self, key: impl Into<Scalar>, value: impl Into<String>) -> StoreResult<bool> {
        let key = key.into().normalize()?;
        if !self.data.contains_key(&key) {
            return Ok(false);
        }
        let value = value.into();
        let started = self.clock.now_ms();
        self.data.insert(key.clone(), value.clone());
        self.apply_to_active(&key, &value);
        let elapsed = self.clock.now_ms() - started;
        self.wal.append(&LogRecord::update(key.clone(), value))?;
        self.note_op(OpKind::Update, elapsed, &key);
        Ok(true)
    }

    /// Removes a record. Returns `Ok(false)` when the key is absent.
    ///
    /// No index structure exposes a delete primitive, so the live structure
    /// is rebuilt from the remaining canonical entries.
    pub fn delete(&mut self, key: impl Into<Scalar>) -> StoreResult<bool> {
        let key = key.into().normalize()?;
        if !self.data.contains_key(&key) {
            return Ok(false);
        }
        let started = self.clock.now_ms();
        self.data.remove(&key);
        self.rebuild_active();
        let elapsed = self.clock.now_ms() - started;
        self.wal.append(&LogRecord::delete(key.clone()))?;
        self.note_op(OpKind::Delete, elapsed, &key);
        Ok(true)
    }

    /// Looks up a record through the live structure. A miss is `Ok(None)`;
    /// latency is recorded on hit and miss alike. Never mutates the
    /// canonical map.
    pub fn search(&mut self, key: impl Into<Scalar>) -> StoreResult<Option<String>> {
        let key = key.into().normalize()?;
        let started = self.clock.now_ms();
        let result = self.lookup_active(&key).map(str::to_string);
        let elapsed = self.clock.now_ms() - started;
        self.note_op(OpKind::Search, elapsed, &key);
        Ok(result)
    }

    /// All records sorted by key.
    pub fn get_all(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Switches the live structure. A no-op (`None`) when `structure` is
    /// already live; otherwise returns the outgoing structure's shape as
    /// captured before the switch and the incoming structure's shape after
    /// its rebuild from the canonical map. The outgoing structure's
    /// internals are discarded, not hidden.
    pub fn set_active_structure(&mut self, structure: StructureKind) -> Option<(Shape, Shape)> {
        if structure == self.active {
            return None;
        }
        let old_shape = self.shape_of(self.active);
        self.discard(self.active);
        let previous = self.active;
        self.active = structure;
        self.used.insert(structure);
        self.rebuild_active();
        let new_shape = self.shape_of(structure);
        let keys = self.data.len().to_string();
        Logger::log(
            Severity::Info,
            "structure_switch",
            &[
                ("from", previous.as_str()),
                ("keys", &keys),
                ("to", structure.as_str()),
            ],
        );
        Some((old_shape, new_shape))
    }

    /// The currently live structure.
    pub fn active_structure(&self) -> StructureKind {
        self.active
    }

    /// Shape of the currently live structure.
    pub fn current_shape(&self) -> Shape {
        self.shape_of(self.active)
    }

    /// Empties the store: canonical map, all three structures, metrics, and
    /// used-structure tracking. The log is truncated and a single `clear`
    /// record is appended to the fresh file so replay reproduces the empty
    /// state.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.data.clear();
        self.btree = BPlusTree::new(self.config.branching_order);
        self.avl = AvlTree::new();
        self.skiplist = SkipList::new(
            self.config.skiplist_max_level,
            self.config.skiplist_promotion,
        );
        self.metrics.reset();
        self.used = BTreeSet::from([self.active]);
        self.wal.truncate()?;
        self.wal.append(&LogRecord::clear())?;
        Logger::log(Severity::Info, "clear", &[]);
        Ok(())
    }

    /// Deep copy of the metrics table.
    pub fn get_metrics(&self) -> MetricsTable {
        self.metrics.clone()
    }

    /// The structure with the lowest mean search latency, once all three
    /// structures have at least one recorded search. `None` until then.
    pub fn recommended_search_structure(&self) -> Option<StructureKind> {
        self.metrics.recommended_search()
    }

    /// Latency digest for every structure with recorded samples.
    pub fn performance_summary(&self) -> Vec<StructureSummary> {
        self.metrics.summary()
    }

    /// The structure with the lowest overall mean latency, once all three
    /// structures have been exercised. `None` until then.
    pub fn recommended_structure(&self) -> Option<StructureKind> {
        if !StructureKind::ALL.iter().all(|kind| self.used.contains(kind)) {
            return None;
        }
        self.metrics.recommended_overall()
    }

    /// Replay summary from startup.
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery
    }

    /// Enumerates the live structure itself (not the canonical map), sorted
    /// by key. At any quiescent point this equals [`Store::get_all`].
    pub fn active_items(&self) -> Vec<(String, String)> {
        match self.active {
            StructureKind::BPlusTree => self
                .btree
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            StructureKind::AvlTree => self.avl.items(),
            StructureKind::SkipList => self
                .skiplist
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    // The four dispatch points over the live structure. Every operation
    // routes through exactly one of these matches.

    fn apply_to_active(&mut self, key: &str, value: &str) {
        match self.active {
            StructureKind::BPlusTree => self.btree.insert(key, value),
            StructureKind::AvlTree => self.avl.insert(key, value),
            StructureKind::SkipList => self.skiplist.insert(key, value),
        }
    }

    fn lookup_active(&self, key: &str) -> Option<&str> {
        match self.active {
            StructureKind::BPlusTree => self.btree.search(key),
            StructureKind::AvlTree => self.avl.search(key),
            StructureKind::SkipList => self.skiplist.search(key),
        }
    }

    fn rebuild_active(&mut self) {
        self.discard(self.active);
        match self.active {
            StructureKind::BPlusTree => {
                for (key, value) in &self.data {
                    self.btree.insert(key, value);
                }
            }
            StructureKind::AvlTree => {
                for (key, value) in &self.data {
                    self.avl.insert(key, value);
                }
            }
            StructureKind::SkipList => {
                for (key, value) in &self.data {
                    self.skiplist.insert(key, value);
                }
            }
        }
    }

    fn shape_of(&self, structure: StructureKind) -> Shape {
        match structure {
            StructureKind::BPlusTree => self.btree.shape(),
            StructureKind::AvlTree => self.avl.shape(),
            StructureKind::SkipList => self.skiplist.shape(),
        }
    }

    fn discard(&mut self, structure: StructureKind) {
        match structure {
            StructureKind::BPlusTree => {
                self.btree = BPlusTree::new(self.config.branching_order);
            }
            StructureKind::AvlTree => self.avl = AvlTree::new(),
            StructureKind::SkipList => {
                self.skiplist = SkipList::new(
                    self.config.skiplist_max_level,
                    self.config.skiplist_promotion,
                );
            }
        }
    }

    fn note_op(&mut self, op: OpKind, elapsed_ms: f64, key: &str) {
        self.used.insert(self.active);
        self.metrics.record(self.active, op, elapsed_ms);
        let elapsed = format!("{elapsed_ms:.3}");
        Logger::log(
            Severity::Info,
            op.as_str(),
            &[
                ("elapsed_ms", &elapsed),
                ("key", key),
                ("structure", self.active.as_str()),
            ],
        );
    }
}
