//! Multiway leaf-linked tree (B+-tree).
//!
//! Internal nodes hold separator keys and child pointers; every record lives
//! in a leaf, and leaves are chained left-to-right so ordered traversal never
//! touches the upper levels. Nodes are arena-allocated (children and the
//! leaf chain are `usize` indices into a node vector), which keeps the chain
//! free of shared ownership and the whole structure free of `unsafe`.

use crate::index::StructureKind;
use crate::shape::{Shape, ShapeEdge, ShapeNode};

struct Node {
    leaf: bool,
    /// Separator keys (internal) or record keys (leaf), sorted ascending.
    keys: Vec<String>,
    /// Record values, parallel to `keys`. Leaves only.
    values: Vec<String>,
    /// Child node indices. Internal nodes only; always `keys.len() + 1`.
    children: Vec<usize>,
    /// Next leaf in the left-to-right chain.
    next: Option<usize>,
}

impl Node {
    fn new_leaf() -> Self {
        Node {
            leaf: true,
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next: None,
        }
    }

    fn new_internal() -> Self {
        Node {
            leaf: false,
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next: None,
        }
    }
}

/// Fixed-fanout B+-tree over string keys.
pub struct BPlusTree {
    nodes: Vec<Node>,
    root: usize,
    order: usize,
}

impl BPlusTree {
    /// Creates an empty tree. `order` is the separator-key capacity of a
    /// node; a node holding `order` keys is full and must split.
    pub fn new(order: usize) -> Self {
        debug_assert!(order >= 3, "fanout below 3 cannot split");
        BPlusTree {
            nodes: vec![Node::new_leaf()],
            root: 0,
            order,
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Inserts a record, overwriting the value in place when the key already
    /// exists.
    pub fn insert(&mut self, key: &str, value: &str) {
        // A full root splits first so the tree grows from the top.
        if self.nodes[self.root].keys.len() == self.order {
            let old_root = self.root;
            let new_root = self.alloc(Node::new_internal());
            self.nodes[new_root].children.push(old_root);
            self.root = new_root;
            self.split_child(new_root, 0);
        }
        self.insert_non_full(self.root, key, value);
    }

    fn insert_non_full(&mut self, mut node_idx: usize, key: &str, value: &str) {
        loop {
            if self.nodes[node_idx].leaf {
                let node = &mut self.nodes[node_idx];
                match node.keys.binary_search_by(|k| k.as_str().cmp(key)) {
                    Ok(pos) => node.values[pos] = value.to_string(),
                    Err(pos) => {
                        node.keys.insert(pos, key.to_string());
                        node.values.insert(pos, value.to_string());
                    }
                }
                return;
            }

            // Descend into the first child whose separator exceeds the key,
            // splitting a full child before entering it.
            let mut child_pos = self.child_position(node_idx, key);
            let child_idx = self.nodes[node_idx].children[child_pos];
            if self.nodes[child_idx].keys.len() == self.order {
                self.split_child(node_idx, child_pos);
                child_pos = self.child_position(node_idx, key);
            }
            node_idx = self.nodes[node_idx].children[child_pos];
        }
    }

    fn child_position(&self, node_idx: usize, key: &str) -> usize {
        self.nodes[node_idx]
            .keys
            .partition_point(|sep| sep.as_str() <= key)
    }

    /// Splits the full child at `child_pos` of `parent_idx`.
    ///
    /// Leaf split: the right half moves to a new sibling linked after the
    /// original, and the sibling's first key is copied up as the separator.
    /// Internal split: the middle key moves up and children partition.
    fn split_child(&mut self, parent_idx: usize, child_pos: usize) {
        let child_idx = self.nodes[parent_idx].children[child_pos];
        let order = self.order;

        let (new_node, separator) = {
            let child = &mut self.nodes[child_idx];
            if child.leaf {
                let mid = order / 2;
                let keys = child.keys.split_off(mid);
                let values = child.values.split_off(mid);
                let separator = keys[0].clone();
                let next = child.next;
                (
                    Node {
                        leaf: true,
                        keys,
                        values,
                        children: Vec::new(),
                        next,
                    },
                    separator,
                )
            } else {
                let mid = (order - 1) / 2;
                let mut keys = child.keys.split_off(mid);
                let separator = keys.remove(0);
                let children = child.children.split_off(mid + 1);
                (
                    Node {
                        leaf: false,
                        keys,
                        values: Vec::new(),
                        children,
                        next: None,
                    },
                    separator,
                )
            }
        };

        let was_leaf = new_node.leaf;
        let new_idx = self.alloc(new_node);
        if was_leaf {
            self.nodes[child_idx].next = Some(new_idx);
        }

        let parent = &mut self.nodes[parent_idx];
        parent.keys.insert(child_pos, separator);
        parent.children.insert(child_pos + 1, new_idx);
    }

    /// Looks up a key. Descends with the same child-selection rule as
    /// `insert`, then scans the leaf for an exact match.
    pub fn search(&self, key: &str) -> Option<&str> {
        let mut idx = self.root;
        while !self.nodes[idx].leaf {
            idx = self.nodes[idx].children[self.child_position(idx, key)];
        }
        let leaf = &self.nodes[idx];
        leaf.keys
            .iter()
            .position(|k| k == key)
            .map(|pos| leaf.values[pos].as_str())
    }

    /// Iterates all records in ascending key order via the leaf chain.
    pub fn iter(&self) -> LeafIter<'_> {
        let mut idx = self.root;
        while !self.nodes[idx].leaf {
            idx = self.nodes[idx].children[0];
        }
        LeafIter {
            tree: self,
            leaf: Some(idx),
            pos: 0,
        }
    }

    /// Structural description for the rendering boundary.
    ///
    /// Node ids are arena slots, labels are the node's records (leaves) or
    /// separators (internal), and edges carry the child position.
    pub fn shape(&self) -> Shape {
        let mut shape = Shape::new(StructureKind::BPlusTree);
        self.shape_walk(self.root, &mut shape);
        shape
    }

    fn shape_walk(&self, idx: usize, shape: &mut Shape) {
        let node = &self.nodes[idx];
        let label = if node.leaf {
            node.keys
                .iter()
                .zip(&node.values)
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(" | ")
        } else {
            node.keys.join(" | ")
        };
        shape.nodes.push(ShapeNode {
            id: format!("n{idx}"),
            label,
        });
        for (pos, &child) in node.children.iter().enumerate() {
            shape.edges.push(ShapeEdge {
                from: format!("n{idx}"),
                to: format!("n{child}"),
                label: pos.to_string(),
            });
            self.shape_walk(child, shape);
        }
    }
}

/// Iterator over the leaf chain in ascending key order.
pub struct LeafIter<'a> {
    tree: &'a BPlusTree,
    leaf: Option<usize>,
    pos: usize,
}

impl<'a> Iterator for LeafIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf_idx = self.leaf?;
            let leaf = &self.tree.nodes[leaf_idx];
            if self.pos < leaf.keys.len() {
                let item = (leaf.keys[self.pos].as_str(), leaf.values[self.pos].as_str());
                self.pos += 1;
                return Some(item);
            }
            self.leaf = leaf.next;
            self.pos = 0;
        }
    }
}
