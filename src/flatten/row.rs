//! Rows produced by the tree-mode walker.

use super::key;
use super::tag::TypeTag;
use crate::document::node::{CommentSet, DocumentNode};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

/// The value column of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// A scalar tagged `!!null`.
    Null,
    Scalar(String),
    /// Marker for an empty mapping; serialises as `{}`.
    EmptyMap,
    /// Marker for an empty sequence; serialises as `[]`.
    EmptyList,
}

impl RowValue {
    /// The scalar text, if this is a non-null scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RowValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValue::Null => serializer.serialize_none(),
            RowValue::Scalar(s) => serializer.serialize_str(s),
            RowValue::EmptyMap => serializer.serialize_map(Some(0))?.end(),
            RowValue::EmptyList => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

/// One flattened leaf of a document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Path segments from the root: mapping keys and stringified indices.
    pub keys: Vec<String>,
    /// `keys` normalised and dot-joined.
    pub key_path: String,
    pub value: RowValue,
    pub tag: Option<TypeTag>,
    pub start_line: usize,
    pub start_column: usize,
    /// Comments inherited from ancestors, outermost first.
    pub pre_comments: Vec<String>,
    pub head_comment: Option<String>,
    pub line_comment: Option<String>,
    pub foot_comment: Option<String>,
}

impl Row {
    /// Builds the row for a leaf node reached through `keys`.
    pub(crate) fn from_leaf(
        keys: Vec<String>,
        node: &DocumentNode,
        value: RowValue,
        pre_comments: Vec<String>,
    ) -> Self {
        let comments = node.comments();
        let position = node.position();
        Self {
            key_path: key::normalize(&keys),
            keys,
            value,
            tag: TypeTag::from_marker(node.tag()),
            start_line: position.line,
            start_column: position.column,
            pre_comments,
            head_comment: CommentSet::joined(&comments.head),
            line_comment: CommentSet::joined(&comments.line),
            foot_comment: CommentSet::joined(&comments.foot),
        }
    }
}
