//! YAML parsing into position- and comment-carrying document trees.
//!
//! The parser drives yaml-rust2's event API and assembles [`DocumentNode`]s on
//! a stack, the same way a DOM is built from SAX-style events. Comments are
//! recovered afterwards by [`comments::attach`](super::comments::attach).
//!
//! # Example
//!
//! ```
//! use confquill::document::parser::parse_yaml;
//! use confquill::document::node::NodeKind;
//!
//! let tree = parse_yaml("# owner\nname: Alice\nage: 30\n").unwrap();
//! let map = &tree.root().children()[0];
//! assert_eq!(map.kind(), NodeKind::Mapping);
//!
//! let (key, value) = map.pairs().nth(1).unwrap();
//! assert_eq!(key.value(), "age");
//! assert_eq!(value.tag(), "!!int");
//! assert_eq!(value.position().line, 3);
//! ```

use super::comments::{self, split_trailing_comment};
use super::node::{DocumentNode, Position};
use super::tree::DocumentTree;
use crate::error::SyntaxError;
use std::collections::{HashMap, HashSet};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parses the first YAML document in `source` into a [`DocumentTree`].
///
/// An empty (or comment-only) source yields a document with no children.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if:
/// - the text is not valid YAML
/// - a mapping repeats a key
/// - a mapping key is itself a mapping or sequence
/// - an alias refers to an unknown anchor
pub fn parse_yaml(source: &str) -> Result<DocumentTree, SyntaxError> {
    let mut parser = Parser::new_from_str(source);
    let mut builder = TreeBuilder::new(source);

    parser
        .load(&mut builder, false)
        .map_err(|err| SyntaxError::new(err.to_string()))?;

    let mut root = builder.finish()?;
    comments::attach(source, &mut root);

    Ok(DocumentTree::new(root))
}

/// Maps character offsets (as reported by yaml-rust2 markers) to 1-based
/// line/column positions.
struct LineIndex<'a> {
    starts: Vec<usize>,
    text: Vec<&'a str>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        for (idx, ch) in source.chars().enumerate() {
            if ch == '\n' {
                starts.push(idx + 1);
            }
        }
        Self {
            starts,
            text: source.lines().collect(),
        }
    }

    fn position(&self, char_index: usize) -> Position {
        let line = self.starts.partition_point(|&s| s <= char_index).max(1);
        Position::new(line, char_index - self.starts[line - 1] + 1)
    }

    /// The nearest code before `position`: the part of its own line left of
    /// the column if that holds anything, otherwise the closest earlier line
    /// that is neither blank nor comment-only. Trailing comments are cut off.
    fn code_before(&self, position: Position) -> Option<(usize, &'a str)> {
        let own = self.text.get(position.line - 1).copied().map(|line| {
            let end = line
                .char_indices()
                .nth(position.column - 1)
                .map_or(line.len(), |(idx, _)| idx);
            &line[..end]
        });
        if let Some(prefix) = own {
            let code = split_trailing_comment(prefix).0.trim_end();
            if !code.trim().is_empty() {
                return Some((position.line, code));
            }
        }

        (1..position.line).rev().find_map(|line| {
            let text = self.text[line - 1];
            let code = split_trailing_comment(text).0.trim_end();
            let trimmed = code.trim_start();
            (!trimmed.is_empty() && !trimmed.starts_with('#')).then_some((line, code))
        })
    }

    /// Position just after the `:` or `-` that introduced an implicit null.
    /// yaml-rust2 reports such a scalar at the token that follows it.
    fn after_indicator(&self, reported: Position) -> Position {
        match self.code_before(reported) {
            Some((line, code)) => Position::new(line, code.chars().count() + 1),
            None => reported,
        }
    }

    /// Position of the `|` or `>` header of a block scalar, which yaml-rust2
    /// reports at the first line of its body.
    fn block_header(&self, reported: Position) -> Position {
        let found = self.code_before(reported).and_then(|(line, code)| {
            let idx = code.rfind(['|', '>'])?;
            Some(Position::new(line, code[..idx].chars().count() + 1))
        });
        found.unwrap_or(reported)
    }
}

/// A collection still waiting for its end event.
enum Frame {
    Sequence {
        start: Position,
        anchor: usize,
        tag: Option<String>,
        items: Vec<DocumentNode>,
    },
    Mapping {
        start: Position,
        anchor: usize,
        tag: Option<String>,
        entries: Vec<DocumentNode>,
        keys: HashSet<String>,
    },
}

struct TreeBuilder<'a> {
    lines: LineIndex<'a>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, DocumentNode>,
    contents: Vec<DocumentNode>,
    error: Option<SyntaxError>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: LineIndex::new(source),
            stack: Vec::new(),
            anchors: HashMap::new(),
            contents: Vec::new(),
            error: None,
        }
    }

    fn finish(self) -> Result<DocumentNode, SyntaxError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.stack.is_empty() {
            return Err(SyntaxError::new("unexpected end of document"));
        }
        Ok(DocumentNode::document(self.contents))
    }

    fn fail(&mut self, message: String, position: Position) {
        if self.error.is_none() {
            self.error = Some(SyntaxError::at(message, position));
        }
    }

    /// Registers an anchor, then hands the finished node to its parent.
    fn complete(&mut self, node: DocumentNode, anchor: usize) {
        if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
        }

        let parent = match self.stack.last_mut() {
            Some(frame) => frame,
            None => {
                self.contents.push(node);
                return;
            }
        };

        match parent {
            Frame::Sequence { items, .. } => items.push(node),
            Frame::Mapping { entries, keys, .. } => {
                if entries.len() % 2 == 0 {
                    let problem = if node.is_container() {
                        Some("mapping keys must be scalars".to_string())
                    } else if !keys.insert(node.value().to_string()) {
                        Some(format!("duplicate mapping key '{}'", node.value()))
                    } else {
                        None
                    };
                    if let Some(message) = problem {
                        self.error = Some(SyntaxError::at(message, node.position()));
                        return;
                    }
                }
                entries.push(node);
            }
        }
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let position = self.lines.position(marker.index());

        match ev {
            Event::Scalar(value, style, anchor, tag) => {
                let position = match style {
                    TScalarStyle::Literal | TScalarStyle::Folded => {
                        self.lines.block_header(position)
                    }
                    TScalarStyle::Plain if value.is_empty() && tag.is_none() => {
                        self.lines.after_indicator(position)
                    }
                    _ => position,
                };
                let tag = match tag {
                    Some(tag) => tag_name(&tag),
                    None if style == TScalarStyle::Plain => resolve_plain(&value).to_string(),
                    None => "!!str".to_string(),
                };
                self.complete(DocumentNode::scalar(value, &tag, position), anchor);
            }

            Event::SequenceStart(anchor, tag) => self.stack.push(Frame::Sequence {
                start: position,
                anchor,
                tag: tag.as_ref().map(tag_name),
                items: Vec::new(),
            }),

            Event::MappingStart(anchor, tag) => self.stack.push(Frame::Mapping {
                start: position,
                anchor,
                tag: tag.as_ref().map(tag_name),
                entries: Vec::new(),
                keys: HashSet::new(),
            }),

            Event::SequenceEnd => match self.stack.pop() {
                Some(Frame::Sequence {
                    start,
                    anchor,
                    tag,
                    items,
                }) => {
                    let mut node = DocumentNode::sequence(items, start);
                    if let Some(tag) = tag {
                        node = node.with_tag(&tag);
                    }
                    self.complete(node, anchor);
                }
                _ => self.fail("unbalanced sequence end".to_string(), position),
            },

            Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Mapping {
                    start,
                    anchor,
                    tag,
                    entries,
                    ..
                }) => {
                    let mut node = DocumentNode::mapping(entries, start);
                    if let Some(tag) = tag {
                        node = node.with_tag(&tag);
                    }
                    self.complete(node, anchor);
                }
                _ => self.fail("unbalanced mapping end".to_string(), position),
            },

            Event::Alias(id) => match self.anchors.get(&id) {
                Some(anchored) => {
                    let mut copy = anchored.clone();
                    relocate(&mut copy, position);
                    self.complete(copy, 0);
                }
                None => self.fail(format!("unknown anchor id {}", id), position),
            },

            // Stream and document boundaries carry nothing we keep.
            _ => {}
        }
    }
}

/// Moves a copied alias target to the alias site so that document order and
/// comment attachment follow where the alias was written.
fn relocate(node: &mut DocumentNode, position: Position) {
    node.position = position;
    for child in node.children.iter_mut() {
        relocate(child, position);
    }
}

fn tag_name(tag: &Tag) -> String {
    if tag.handle == "!!" || tag.handle == "tag:yaml.org,2002:" {
        format!("!!{}", tag.suffix)
    } else {
        format!("{}{}", tag.handle, tag.suffix)
    }
}

/// Resolves the tag of an untagged plain scalar using the YAML 1.2 core schema.
pub fn resolve_plain(value: &str) -> &'static str {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return "!!null",
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => return "!!bool",
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" | "-.inf" | "-.Inf" | "-.INF"
        | ".nan" | ".NaN" | ".NAN" => return "!!float",
        _ => {}
    }

    if is_integer(value) {
        "!!int"
    } else if is_float(value) {
        "!!float"
    } else {
        "!!str"
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    let (body, radix) = if let Some(hex) = digits.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (bin, 2)
    } else {
        (digits, 10)
    };

    !body.is_empty()
        && !body.starts_with('_')
        && body.chars().all(|c| c == '_' || c.is_digit(radix))
}

fn is_float(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '_' | 'e' | 'E' | '+' | '-'))
        && value.replace('_', "").parse::<f64>().is_ok()
}
