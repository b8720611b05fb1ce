//! Self-balancing binary tree (AVL).
//!
//! Each node caches its subtree height; after an insert the balance factor
//! (left height minus right height) of every touched ancestor is checked and
//! restored to the `-1..=1` band with single or double rotations. An insert
//! that overwrites an existing key returns without touching heights, so
//! updates never perturb the tree shape.

use std::cmp::Ordering;

use crate::index::StructureKind;
use crate::shape::{Shape, ShapeEdge, ShapeNode};

struct AvlNode {
    key: String,
    value: String,
    height: u32,
    left: Option<Box<AvlNode>>,
    right: Option<Box<AvlNode>>,
}

impl AvlNode {
    fn new(key: &str, value: &str) -> Box<Self> {
        Box::new(AvlNode {
            key: key.to_string(),
            value: value.to_string(),
            height: 1,
            left: None,
            right: None,
        })
    }

    fn refresh_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }
}

fn height(node: &Option<Box<AvlNode>>) -> u32 {
    node.as_ref().map_or(0, |n| n.height)
}

fn balance(node: &AvlNode) -> i32 {
    height(&node.left) as i32 - height(&node.right) as i32
}

/// AVL tree over string keys.
#[derive(Default)]
pub struct AvlTree {
    root: Option<Box<AvlNode>>,
}

impl AvlTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        AvlTree { root: None }
    }

    /// Inserts a record, overwriting the value when the key already exists.
    pub fn insert(&mut self, key: &str, value: &str) {
        let root = self.root.take();
        self.root = Some(Self::insert_node(root, key, value));
    }

    fn insert_node(node: Option<Box<AvlNode>>, key: &str, value: &str) -> Box<AvlNode> {
        let mut node = match node {
            None => return AvlNode::new(key, value),
            Some(n) => n,
        };

        match key.cmp(node.key.as_str()) {
            Ordering::Less => node.left = Some(Self::insert_node(node.left.take(), key, value)),
            Ordering::Greater => node.right = Some(Self::insert_node(node.right.take(), key, value)),
            Ordering::Equal => {
                node.value = value.to_string();
                return node;
            }
        }

        node.refresh_height();
        Self::rebalance(node)
    }

    fn rebalance(mut node: Box<AvlNode>) -> Box<AvlNode> {
        let factor = balance(&node);

        if factor > 1 {
            // Left-heavy; a right-heavy left child needs the double rotation.
            if let Some(left) = node.left.take() {
                node.left = Some(if balance(&left) < 0 {
                    Self::rotate_left(left)
                } else {
                    left
                });
            }
            return Self::rotate_right(node);
        }

        if factor < -1 {
            if let Some(right) = node.right.take() {
                node.right = Some(if balance(&right) > 0 {
                    Self::rotate_right(right)
                } else {
                    right
                });
            }
            return Self::rotate_left(node);
        }

        node
    }

    fn rotate_right(mut y: Box<AvlNode>) -> Box<AvlNode> {
        let Some(mut x) = y.left.take() else {
            return y;
        };
        y.left = x.right.take();
        y.refresh_height();
        x.right = Some(y);
        x.refresh_height();
        x
    }

    fn rotate_left(mut x: Box<AvlNode>) -> Box<AvlNode> {
        let Some(mut y) = x.right.take() else {
            return x;
        };
        x.right = y.left.take();
        x.refresh_height();
        y.left = Some(x);
        y.refresh_height();
        y
    }

    /// Looks up a key by binary descent.
    pub fn search(&self, key: &str) -> Option<&str> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(node.value.as_str()),
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
            }
        }
        None
    }

    /// Height of the whole tree (0 when empty).
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// All records in ascending key order.
    pub fn items(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        Self::collect(self.root.as_deref(), &mut out);
        out
    }

    fn collect(node: Option<&AvlNode>, out: &mut Vec<(String, String)>) {
        if let Some(node) = node {
            Self::collect(node.left.as_deref(), out);
            out.push((node.key.clone(), node.value.clone()));
            Self::collect(node.right.as_deref(), out);
        }
    }

    /// Structural description for the rendering boundary.
    ///
    /// Node ids are preorder positions; edges carry `L`/`R` for the side.
    pub fn shape(&self) -> Shape {
        let mut shape = Shape::new(StructureKind::AvlTree);
        let mut counter = 0usize;
        Self::shape_walk(self.root.as_deref(), None, &mut counter, &mut shape);
        shape
    }

    fn shape_walk(
        node: Option<&AvlNode>,
        parent: Option<(usize, &'static str)>,
        counter: &mut usize,
        shape: &mut Shape,
    ) {
        let Some(node) = node else {
            return;
        };
        let id = *counter;
        *counter += 1;
        shape.nodes.push(ShapeNode {
            id: format!("n{id}"),
            label: format!("{}: {} (h={})", node.key, node.value, node.height),
        });
        if let Some((parent_id, side)) = parent {
            shape.edges.push(ShapeEdge {
                from: format!("n{parent_id}"),
                to: format!("n{id}"),
                label: side.to_string(),
            });
        }
        Self::shape_walk(node.left.as_deref(), Some((id, "L")), counter, shape);
        Self::shape_walk(node.right.as_deref(), Some((id, "R")), counter, shape);
    }
}
