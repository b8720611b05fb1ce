//! Latency metrics for the index structures.
//!
//! Samples are recorded in milliseconds per structure and operation kind,
//! append-only for the lifetime of a session: never reordered, never
//! trimmed. Means are unweighted over all recorded samples. The wall clock
//! sits behind the [`Clock`] trait so the engine's operations carry no
//! inline timing calls and tests can drive deterministic samples.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::index::StructureKind;

/// Operation kinds tracked per structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpKind {
    Insert,
    Search,
    Update,
    Delete,
}

impl OpKind {
    /// Every operation kind.
    pub const ALL: [OpKind; 4] = [OpKind::Insert, OpKind::Search, OpKind::Update, OpKind::Delete];

    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Insert => "insert",
            OpKind::Search => "search",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        }
    }
}

/// Source of wall-clock readings in milliseconds.
pub trait Clock {
    /// Monotonic reading in milliseconds from an arbitrary origin.
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock measured from construction.
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        WallClock {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Per-structure latency digest.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSummary {
    pub structure: StructureKind,
    /// Mean latency per operation kind, present only when sampled.
    pub mean_insert: Option<f64>,
    pub mean_search: Option<f64>,
    pub mean_update: Option<f64>,
    pub mean_delete: Option<f64>,
    /// Mean of the per-operation means that are present.
    pub overall: Option<f64>,
}

/// Per-structure, per-operation latency samples in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    samples: BTreeMap<StructureKind, BTreeMap<OpKind, Vec<f64>>>,
}

const NO_SAMPLES: &[f64] = &[];

impl MetricsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one observed latency.
    pub fn record(&mut self, structure: StructureKind, op: OpKind, elapsed_ms: f64) {
        self.samples
            .entry(structure)
            .or_default()
            .entry(op)
            .or_default()
            .push(elapsed_ms);
    }

    /// All samples for a structure/operation pair, in recording order.
    pub fn samples(&self, structure: StructureKind, op: OpKind) -> &[f64] {
        self.samples
            .get(&structure)
            .and_then(|ops| ops.get(&op))
            .map_or(NO_SAMPLES, Vec::as_slice)
    }

    /// Unweighted mean over all samples, or `None` when unsampled.
    pub fn mean(&self, structure: StructureKind, op: OpKind) -> Option<f64> {
        let samples = self.samples(structure, op);
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    /// Whether no samples have been recorded at all.
    pub fn is_empty(&self) -> bool {
        self.samples.values().all(|ops| ops.values().all(Vec::is_empty))
    }

    /// Drops every sample.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// The structure with the lowest mean search latency, available only
    /// once every structure has at least one search sample.
    pub fn recommended_search(&self) -> Option<StructureKind> {
        let mut best: Option<(StructureKind, f64)> = None;
        for kind in StructureKind::ALL {
            let mean = self.mean(kind, OpKind::Search)?;
            best = match best {
                Some((_, current)) if current <= mean => best,
                _ => Some((kind, mean)),
            };
        }
        best.map(|(kind, _)| kind)
    }

    /// Latency digest for every structure with at least one sample.
    pub fn summary(&self) -> Vec<StructureSummary> {
        StructureKind::ALL
            .iter()
            .filter_map(|&structure| {
                let per_op: Vec<Option<f64>> = OpKind::ALL
                    .iter()
                    .map(|&op| self.mean(structure, op))
                    .collect();
                let present: Vec<f64> = per_op.iter().flatten().copied().collect();
                if present.is_empty() {
                    return None;
                }
                Some(StructureSummary {
                    structure,
                    mean_insert: per_op[0],
                    mean_search: per_op[1],
                    mean_update: per_op[2],
                    mean_delete: per_op[3],
                    overall: Some(present.iter().sum::<f64>() / present.len() as f64),
                })
            })
            .collect()
    }

    /// The structure with the lowest overall mean, available only once
    /// every structure has at least one sample of any kind.
    pub fn recommended_overall(&self) -> Option<StructureKind> {
        let summaries = self.summary();
        if summaries.len() < StructureKind::ALL.len() {
            return None;
        }
        summaries
            .into_iter()
            .filter_map(|s| s.overall.map(|overall| (s.structure, overall)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(structure, _)| structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_append_in_order() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::AvlTree, OpKind::Insert, 3.0);
        table.record(StructureKind::AvlTree, OpKind::Insert, 1.0);
        table.record(StructureKind::AvlTree, OpKind::Insert, 2.0);
        assert_eq!(
            table.samples(StructureKind::AvlTree, OpKind::Insert),
            &[3.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_mean_is_unweighted() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::SkipList, OpKind::Search, 1.0);
        table.record(StructureKind::SkipList, OpKind::Search, 3.0);
        assert_eq!(table.mean(StructureKind::SkipList, OpKind::Search), Some(2.0));
        assert_eq!(table.mean(StructureKind::SkipList, OpKind::Insert), None);
    }

    #[test]
    fn test_search_recommendation_undetermined_until_all_sampled() {
        let mut table = MetricsTable::new();
        assert_eq!(table.recommended_search(), None);

        table.record(StructureKind::BPlusTree, OpKind::Search, 2.0);
        assert_eq!(table.recommended_search(), None);

        table.record(StructureKind::AvlTree, OpKind::Search, 5.0);
        assert_eq!(table.recommended_search(), None);

        table.record(StructureKind::SkipList, OpKind::Search, 1.0);
        assert_eq!(table.recommended_search(), Some(StructureKind::SkipList));
    }

    #[test]
    fn test_search_recommendation_uses_means_not_latest() {
        let mut table = MetricsTable::new();
        // btree mean 2.0, avl mean 4.0, skip list mean 6.0
        for ms in [1.0, 3.0] {
            table.record(StructureKind::BPlusTree, OpKind::Search, ms);
        }
        for ms in [5.0, 3.0] {
            table.record(StructureKind::AvlTree, OpKind::Search, ms);
        }
        for ms in [6.0, 6.0] {
            table.record(StructureKind::SkipList, OpKind::Search, ms);
        }
        assert_eq!(table.recommended_search(), Some(StructureKind::BPlusTree));
    }

    #[test]
    fn test_non_search_samples_do_not_satisfy_the_gate() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::BPlusTree, OpKind::Search, 1.0);
        table.record(StructureKind::AvlTree, OpKind::Search, 2.0);
        table.record(StructureKind::SkipList, OpKind::Insert, 0.1);
        assert_eq!(table.recommended_search(), None);
    }

    #[test]
    fn test_reset_drops_everything() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::BPlusTree, OpKind::Delete, 1.0);
        assert!(!table.is_empty());
        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.samples(StructureKind::BPlusTree, OpKind::Delete), NO_SAMPLES);
    }

    #[test]
    fn test_summary_covers_only_sampled_structures() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::AvlTree, OpKind::Insert, 2.0);
        table.record(StructureKind::AvlTree, OpKind::Search, 4.0);

        let summaries = table.summary();
        assert_eq!(summaries.len(), 1);
        let avl = &summaries[0];
        assert_eq!(avl.structure, StructureKind::AvlTree);
        assert_eq!(avl.mean_insert, Some(2.0));
        assert_eq!(avl.mean_search, Some(4.0));
        assert_eq!(avl.mean_update, None);
        assert_eq!(avl.overall, Some(3.0));
    }

    #[test]
    fn test_overall_recommendation_gated_on_all_structures() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::BPlusTree, OpKind::Insert, 3.0);
        table.record(StructureKind::AvlTree, OpKind::Insert, 2.0);
        assert_eq!(table.recommended_overall(), None);

        table.record(StructureKind::SkipList, OpKind::Insert, 1.0);
        assert_eq!(table.recommended_overall(), Some(StructureKind::SkipList));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut table = MetricsTable::new();
        table.record(StructureKind::BPlusTree, OpKind::Search, 1.0);
        let copy = table.clone();
        table.record(StructureKind::BPlusTree, OpKind::Search, 9.0);
        assert_eq!(copy.samples(StructureKind::BPlusTree, OpKind::Search), &[1.0]);
    }

    #[test]
    fn test_wall_clock_is_monotonic() {
        let clock = WallClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(second >= first);
    }
}
