//! Tree-mode flattening.
//!
//! Walks a [`DocumentNode`] depth-first, pre-order, and emits one [`Row`] per
//! scalar value and per empty container. Rows are handed to the caller as
//! they are produced.
//!
//! Comment inheritance:
//! - a document or sequence passes its inherited comments, plus its own head
//!   and line comments, to its first child only
//! - a mapping does the same for its first pair, and additionally each key's
//!   head and line comments go to that key's value
//! - comments never carry over from one pair to the next
//! - foot comments stay on the node that carried them
//!
//! # Example
//!
//! ```
//! use confquill::document::parser::parse_yaml;
//! use confquill::flatten::tree::rows;
//!
//! let tree = parse_yaml("a: 1\nb:\n  c: 2\n").unwrap();
//! let rows = rows(tree.root());
//!
//! assert_eq!(rows[0].keys, vec!["a"]);
//! assert_eq!(rows[1].keys, vec!["b", "c"]);
//! assert_eq!(rows[1].value.as_str(), Some("2"));
//! ```

use super::row::{Row, RowValue};
use crate::document::node::{DocumentNode, NodeKind};

/// Walks `root`, calling `emit` for every row in document order.
pub fn walk<F: FnMut(Row)>(root: &DocumentNode, emit: &mut F) {
    visit(root, &[], Vec::new(), emit);
}

/// Collects every row of `root`.
pub fn rows(root: &DocumentNode) -> Vec<Row> {
    let mut out = Vec::new();
    walk(root, &mut |row| out.push(row));
    out
}

/// Comments a container hands to its first child: what it inherited, then its
/// own head and line comments.
pub fn first_child_comments(inherited: &[String], node: &DocumentNode) -> Vec<String> {
    let own = node.comments();
    inherited
        .iter()
        .chain(own.head.iter())
        .chain(own.line.iter())
        .cloned()
        .collect()
}

/// Comments handed to the value of one mapping pair: whatever the pair was
/// given, followed by the key's head and line comments.
///
/// Callers pass an empty `carried` for every pair but the first.
pub fn pair_comments(carried: Vec<String>, key: &DocumentNode) -> Vec<String> {
    let own = key.comments();
    let mut out = carried;
    out.extend(own.head.iter().cloned());
    out.extend(own.line.iter().cloned());
    out
}

fn visit<F: FnMut(Row)>(
    node: &DocumentNode,
    prefix: &[String],
    inherited: Vec<String>,
    emit: &mut F,
) {
    match node.kind() {
        NodeKind::Document => {
            for (i, child) in node.children().iter().enumerate() {
                let pre = if i == 0 {
                    first_child_comments(&inherited, node)
                } else {
                    Vec::new()
                };
                visit(child, prefix, pre, emit);
            }
        }
        NodeKind::Sequence => {
            if node.children().is_empty() {
                emit(Row::from_leaf(
                    prefix.to_vec(),
                    node,
                    RowValue::EmptyList,
                    inherited,
                ));
                return;
            }
            for (i, child) in node.children().iter().enumerate() {
                let pre = if i == 0 {
                    first_child_comments(&inherited, node)
                } else {
                    Vec::new()
                };
                visit(child, &extend(prefix, i.to_string()), pre, emit);
            }
        }
        NodeKind::Mapping => {
            if node.children().is_empty() {
                emit(Row::from_leaf(
                    prefix.to_vec(),
                    node,
                    RowValue::EmptyMap,
                    inherited,
                ));
                return;
            }
            let mut carried = first_child_comments(&inherited, node);
            for (key, value) in node.pairs() {
                // take() leaves `carried` empty for the following pairs
                let pre = pair_comments(std::mem::take(&mut carried), key);
                visit(value, &extend(prefix, key.value().to_string()), pre, emit);
            }
        }
        NodeKind::Scalar => {
            let value = if node.tag() == "!!null" {
                RowValue::Null
            } else {
                RowValue::Scalar(node.value().to_string())
            };
            emit(Row::from_leaf(prefix.to_vec(), node, value, inherited));
        }
    }
}

fn extend(prefix: &[String], segment: String) -> Vec<String> {
    let mut path = Vec::with_capacity(prefix.len() + 1);
    path.extend_from_slice(prefix);
    path.push(segment);
    path
}
