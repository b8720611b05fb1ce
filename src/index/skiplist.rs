//! Probabilistic layered list (skip list).
//!
//! A sentinel header spans every level; each real node carries forward
//! pointers for the levels it was promoted to. Nodes are arena-allocated
//! (`usize` links into a node vector). Level draws are independent coin
//! flips per insertion from an owned RNG, seedable for deterministic tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::index::StructureKind;
use crate::shape::{Shape, ShapeEdge, ShapeNode};

/// Arena slot of the sentinel header.
const HEAD: usize = 0;

struct SkipNode {
    key: String,
    value: String,
    /// Forward pointer per level, `0..=node_level`.
    forward: Vec<Option<usize>>,
}

/// Skip list over string keys.
pub struct SkipList {
    nodes: Vec<SkipNode>,
    /// Highest level currently in use by any node.
    level: usize,
    max_level: usize,
    promotion: f64,
    rng: StdRng,
}

impl SkipList {
    /// Creates an empty list with entropy-seeded level draws.
    pub fn new(max_level: usize, promotion: f64) -> Self {
        Self::with_rng(max_level, promotion, StdRng::from_entropy())
    }

    /// Creates an empty list with a deterministic level-draw sequence.
    pub fn with_seed(max_level: usize, promotion: f64, seed: u64) -> Self {
        Self::with_rng(max_level, promotion, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_level: usize, promotion: f64, rng: StdRng) -> Self {
        debug_assert!(promotion > 0.0 && promotion < 1.0);
        let header = SkipNode {
            key: String::new(),
            value: String::new(),
            forward: vec![None; max_level + 1],
        };
        SkipList {
            nodes: vec![header],
            level: 0,
            max_level,
            promotion,
            rng,
        }
    }

    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level < self.max_level && self.rng.gen::<f64>() < self.promotion {
            level += 1;
        }
        level
    }

    /// Inserts a record, overwriting the value when the key already exists.
    pub fn insert(&mut self, key: &str, value: &str) {
        // Walk top-down, recording the rightmost predecessor per level.
        let mut update = vec![HEAD; self.max_level + 1];
        let mut cur = HEAD;
        for lvl in (0..=self.level).rev() {
            while let Some(next) = self.nodes[cur].forward[lvl] {
                if self.nodes[next].key.as_str() < key {
                    cur = next;
                } else {
                    break;
                }
            }
            update[lvl] = cur;
        }

        if let Some(next) = self.nodes[update[0]].forward[0] {
            if self.nodes[next].key == key {
                self.nodes[next].value = value.to_string();
                return;
            }
        }

        let new_level = self.random_level();
        if new_level > self.level {
            // `update` already points the extended levels at the header.
            self.level = new_level;
        }

        let idx = self.nodes.len();
        let mut forward = vec![None; new_level + 1];
        for (lvl, slot) in forward.iter_mut().enumerate() {
            *slot = self.nodes[update[lvl]].forward[lvl];
        }
        self.nodes.push(SkipNode {
            key: key.to_string(),
            value: value.to_string(),
            forward,
        });
        for (lvl, &prev) in update.iter().enumerate().take(new_level + 1) {
            self.nodes[prev].forward[lvl] = Some(idx);
        }
    }

    /// Looks up a key with the same top-down walk as `insert`.
    pub fn search(&self, key: &str) -> Option<&str> {
        let mut cur = HEAD;
        for lvl in (0..=self.level).rev() {
            while let Some(next) = self.nodes[cur].forward[lvl] {
                if self.nodes[next].key.as_str() < key {
                    cur = next;
                } else {
                    break;
                }
            }
        }
        let candidate = self.nodes[cur].forward[0]?;
        let node = &self.nodes[candidate];
        (node.key == key).then_some(node.value.as_str())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the list holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates all records in ascending key order along level 0.
    pub fn iter(&self) -> SkipIter<'_> {
        SkipIter {
            list: self,
            next: self.nodes[HEAD].forward[0],
        }
    }

    /// Structural description for the rendering boundary.
    ///
    /// Nodes are emitted in level-0 order (header first); every forward
    /// pointer becomes an edge labeled with its level.
    pub fn shape(&self) -> Shape {
        let mut shape = Shape::new(StructureKind::SkipList);
        shape.nodes.push(ShapeNode {
            id: "header".to_string(),
            label: "Header".to_string(),
        });
        Self::push_edges(&mut shape, "header", &self.nodes[HEAD].forward);

        let mut cur = self.nodes[HEAD].forward[0];
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            shape.nodes.push(ShapeNode {
                id: format!("n{idx}"),
                label: format!("{}: {}", node.key, node.value),
            });
            Self::push_edges(&mut shape, &format!("n{idx}"), &node.forward);
            cur = node.forward[0];
        }
        shape
    }

    fn push_edges(shape: &mut Shape, from: &str, forward: &[Option<usize>]) {
        for (lvl, target) in forward.iter().enumerate() {
            if let Some(target) = target {
                shape.edges.push(ShapeEdge {
                    from: from.to_string(),
                    to: format!("n{target}"),
                    label: format!("L{lvl}"),
                });
            }
        }
    }
}

/// Iterator over level 0 in ascending key order.
pub struct SkipIter<'a> {
    list: &'a SkipList,
    next: Option<usize>,
}

impl<'a> Iterator for SkipIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = &self.list.nodes[idx];
        self.next = node.forward[0];
        Some((node.key.as_str(), node.value.as_str()))
    }
}
