//! Structural export for the rendering boundary.
//!
//! The engine hands a rendering layer a plain description of the live
//! structure: labeled nodes plus labeled edges that mirror the actual
//! child/pointer layout. Ids and labels are deterministic for a given
//! structure state, so two exports of the same state compare equal. How the
//! description is drawn is the consumer's concern.

use serde::Serialize;

use crate::index::StructureKind;

/// A single exported node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeNode {
    /// Deterministic node id (arena slot or preorder position).
    pub id: String,
    /// Render label: records for leaves, separators for internal nodes.
    pub label: String,
}

/// A directed edge between two exported nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeEdge {
    pub from: String,
    pub to: String,
    /// Child position, `L`/`R` side, or `L<level>` for skip list pointers.
    pub label: String,
}

/// Structural description of one index structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    /// Which structure this shape was exported from.
    pub structure: StructureKind,
    pub nodes: Vec<ShapeNode>,
    pub edges: Vec<ShapeEdge>,
}

impl Shape {
    pub(crate) fn new(structure: StructureKind) -> Self {
        Shape {
            structure,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Whether the structure held no records at export time.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty() && self.nodes.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_for_consumers() {
        let mut shape = Shape::new(StructureKind::AvlTree);
        shape.nodes.push(ShapeNode {
            id: "n0".to_string(),
            label: "k: v (h=1)".to_string(),
        });
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"structure\":\"avl\""));
        assert!(json.contains("\"n0\""));
    }

    #[test]
    fn test_trivial_shape() {
        let shape = Shape::new(StructureKind::SkipList);
        assert!(shape.is_trivial());
    }
}
