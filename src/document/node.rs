//! Document node representation with position and comment metadata.
//!
//! A parsed YAML file becomes a tree of `DocumentNode`s. Each node records
//! where it started in the source, which comments were attached to it, and the
//! format-level type tag that the flattener later maps to a portable
//! [`TypeTag`](crate::flatten::tag::TypeTag).
//!
//! # Example
//!
//! ```
//! use confquill::document::node::{DocumentNode, NodeKind, Position};
//!
//! let key = DocumentNode::scalar("name", "!!str", Position::new(1, 1));
//! let value = DocumentNode::scalar("Alice", "!!str", Position::new(1, 7));
//! let map = DocumentNode::mapping(vec![key, value], Position::new(1, 1));
//!
//! assert_eq!(map.kind(), NodeKind::Mapping);
//! assert_eq!(map.pairs().count(), 1);
//! ```

use serde::Serialize;

/// A 1-based line/column location in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Structural kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The stream root; its children are the document contents.
    Document,
    /// Children alternate key, value, key, value...
    Mapping,
    /// Children are the ordered items.
    Sequence,
    /// A leaf holding text in `value`.
    Scalar,
}

/// Comments attached to a single node.
///
/// Each slot holds whole comment blocks (lines of one block are joined with
/// `\n`). A slot normally holds at most one block; more than one means blocks
/// were merged onto the same node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentSet {
    pub head: Vec<String>,
    pub line: Vec<String>,
    pub foot: Vec<String>,
}

impl CommentSet {
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.line.is_empty() && self.foot.is_empty()
    }

    /// Renders a slot as a single string, comma-joining merged blocks.
    pub fn joined(blocks: &[String]) -> Option<String> {
        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join(","))
        }
    }
}

/// One element of a parsed hierarchical document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<DocumentNode>,
    pub(crate) value: String,
    pub(crate) tag: String,
    pub(crate) position: Position,
    pub(crate) comments: CommentSet,
}

impl DocumentNode {
    fn with_kind(kind: NodeKind, tag: &str, position: Position) -> Self {
        Self {
            kind,
            children: Vec::new(),
            value: String::new(),
            tag: tag.to_string(),
            position,
            comments: CommentSet::default(),
        }
    }

    /// Creates a scalar leaf.
    pub fn scalar(value: impl Into<String>, tag: &str, position: Position) -> Self {
        let mut node = Self::with_kind(NodeKind::Scalar, tag, position);
        node.value = value.into();
        node
    }

    /// Creates a mapping from alternating key/value nodes.
    pub fn mapping(children: Vec<DocumentNode>, position: Position) -> Self {
        let mut node = Self::with_kind(NodeKind::Mapping, "!!map", position);
        node.children = children;
        node
    }

    /// Creates a sequence from its items.
    pub fn sequence(children: Vec<DocumentNode>, position: Position) -> Self {
        let mut node = Self::with_kind(NodeKind::Sequence, "!!seq", position);
        node.children = children;
        node
    }

    /// Creates a document root.
    pub fn document(children: Vec<DocumentNode>) -> Self {
        let mut node = Self::with_kind(NodeKind::Document, "", Position::new(1, 1));
        node.children = children;
        node
    }

    /// Replaces the format tag, e.g. for an explicit `!!int` in the source.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn with_comments(mut self, comments: CommentSet) -> Self {
        self.comments = comments;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[DocumentNode] {
        &self.children
    }

    /// Scalar text. Empty for containers.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn comments(&self) -> &CommentSet {
        &self.comments
    }

    /// Returns true for mappings and sequences.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping | NodeKind::Sequence)
    }

    /// Returns true for nodes the flattener turns into exactly one row:
    /// scalars and empty containers.
    pub fn is_leaf(&self) -> bool {
        match self.kind {
            NodeKind::Scalar => true,
            NodeKind::Mapping | NodeKind::Sequence => self.children.is_empty(),
            NodeKind::Document => false,
        }
    }

    /// Iterates the (key, value) pairs of a mapping. Empty for other kinds.
    pub fn pairs(&self) -> impl Iterator<Item = (&DocumentNode, &DocumentNode)> {
        let children: &[DocumentNode] = if self.kind == NodeKind::Mapping {
            &self.children
        } else {
            &[]
        };
        children.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }
}
