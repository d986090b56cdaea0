//! Tree-based navigation for parsed documents.
//!
//! `DocumentTree` owns the root of one parsed file. It lives for exactly one
//! flattening walk.
//!
//! # Example
//!
//! ```
//! use confquill::document::parser::parse_yaml;
//!
//! let tree = parse_yaml("users:\n  - alice\n  - bob\n").unwrap();
//!
//! // Document -> mapping -> value of pair 0 -> item 1
//! let node = tree.get_node(&[0, 0, 1]).unwrap();
//! assert_eq!(node.value(), "bob");
//! ```

use super::node::{DocumentNode, NodeKind};

/// A complete parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    root: DocumentNode,
}

impl DocumentTree {
    pub fn new(root: DocumentNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DocumentNode {
        &self.root
    }

    /// Gets the node at the given index path.
    ///
    /// - For documents and sequences the index selects the nth child
    /// - For mappings the index selects the value of the nth pair
    /// - Scalars cannot be traversed
    ///
    /// Returns `None` when an index is out of bounds or a scalar is reached
    /// before the path is exhausted.
    pub fn get_node(&self, path: &[usize]) -> Option<&DocumentNode> {
        let mut current = &self.root;

        for &index in path {
            current = match current.kind() {
                NodeKind::Document | NodeKind::Sequence => current.children().get(index)?,
                NodeKind::Mapping => current.pairs().nth(index)?.1,
                NodeKind::Scalar => return None,
            };
        }

        Some(current)
    }

    /// Counts the nodes that flatten to exactly one row each: scalar values
    /// (mapping keys excluded) and empty containers.
    pub fn leaf_count(&self) -> usize {
        fn count(node: &DocumentNode) -> usize {
            match node.kind() {
                NodeKind::Scalar => 1,
                NodeKind::Mapping if node.children().is_empty() => 1,
                NodeKind::Sequence if node.children().is_empty() => 1,
                NodeKind::Mapping => node.pairs().map(|(_, v)| count(v)).sum(),
                NodeKind::Document | NodeKind::Sequence => {
                    node.children().iter().map(count).sum()
                }
            }
        }
        count(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Position;

    fn sample() -> DocumentTree {
        let p = Position::new(1, 1);
        let items = DocumentNode::sequence(
            vec![
                DocumentNode::scalar("1", "!!int", p),
                DocumentNode::scalar("2", "!!int", p),
            ],
            p,
        );
        let map = DocumentNode::mapping(
            vec![
                DocumentNode::scalar("items", "!!str", p),
                items,
                DocumentNode::scalar("none", "!!str", p),
                DocumentNode::mapping(vec![], p),
            ],
            p,
        );
        DocumentTree::new(DocumentNode::document(vec![map]))
    }

    #[test]
    fn test_get_node_navigates_pairs_and_items() {
        let tree = sample();
        assert_eq!(tree.get_node(&[0, 0, 1]).unwrap().value(), "2");
        assert_eq!(tree.get_node(&[0, 1]).unwrap().kind(), NodeKind::Mapping);
    }

    #[test]
    fn test_get_node_out_of_bounds() {
        let tree = sample();
        assert!(tree.get_node(&[0, 9]).is_none());
        assert!(tree.get_node(&[0, 0, 0, 0]).is_none());
    }

    #[test]
    fn test_leaf_count_includes_empty_containers() {
        assert_eq!(sample().leaf_count(), 3);
    }
}
