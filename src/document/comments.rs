//! Comment extraction for YAML sources.
//!
//! The YAML event parser discards comments, so they are recovered from the
//! raw text: every line is classified first, then each block of consecutive
//! comment lines (and each trailing `# ...`) is attached to a leaf node of the
//! already-built tree using its start line.
//!
//! Attachment rules:
//! - a block at the very top of the file followed by a blank line belongs to
//!   the document itself (head)
//! - a block directly above a content line is the head of the next leaf
//! - a block directly below a content line and followed by a blank line (or
//!   the end of the file) is the foot of the last leaf started so far
//! - a block with blank lines on both sides is merged into the head of the
//!   next leaf
//! - a trailing comment is the line comment of the last leaf on that line

use super::node::DocumentNode;

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    /// A line holding only a comment; the marker is stripped.
    Comment(String),
    /// A line with YAML content, possibly followed by a comment.
    Content { trailing: Option<String> },
    /// A line inside a literal or folded block scalar.
    BlockBody,
}

impl LineKind {
    fn is_content(&self) -> bool {
        matches!(self, LineKind::Content { .. } | LineKind::BlockBody)
    }
}

/// An open literal or folded block scalar.
struct BlockScalar {
    /// Column of the node that owns the block; body lines sit deeper.
    parent: usize,
    /// Indentation of the first body line, once seen.
    body: Option<usize>,
}

impl BlockScalar {
    fn contains(&mut self, indent: usize) -> bool {
        match self.body {
            Some(body) => indent >= body,
            None if indent > self.parent => {
                self.body = Some(indent);
                true
            }
            None => false,
        }
    }
}

/// Classifies every line of `source`. Index 0 is line 1.
pub fn scan_lines(source: &str) -> Vec<LineKind> {
    let mut kinds = Vec::new();
    let mut block: Option<BlockScalar> = None;

    for line in source.lines() {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if let Some(open) = block.as_mut() {
            if trimmed.is_empty() {
                kinds.push(LineKind::Blank);
                continue;
            }
            if open.contains(indent) {
                kinds.push(LineKind::BlockBody);
                continue;
            }
            block = None;
        }

        if trimmed.is_empty() {
            kinds.push(LineKind::Blank);
        } else if let Some(text) = trimmed.strip_prefix('#') {
            kinds.push(LineKind::Comment(text.trim().to_string()));
        } else {
            let (code, trailing) = split_trailing_comment(line);
            if opens_block_scalar(code) {
                block = Some(BlockScalar {
                    parent: owner_column(code),
                    body: None,
                });
            }
            kinds.push(LineKind::Content { trailing });
        }
    }

    kinds
}

/// Column of the node a block indicator on this line belongs to: the key in
/// `- key: |`, or the innermost `-` in `- - |`.
fn owner_column(code: &str) -> usize {
    let mut column = code.len() - code.trim_start().len();
    let mut last_dash = None;
    let mut rest = code.trim_start();
    while let Some(after) = rest.strip_prefix('-') {
        if !after.starts_with([' ', '\t']) {
            break;
        }
        last_dash = Some(column);
        let skipped = after.len() - after.trim_start().len();
        column += 1 + skipped;
        rest = after.trim_start();
    }

    match last_dash {
        Some(dash) if rest.starts_with(['|', '>']) => dash,
        _ => column,
    }
}

/// Splits `line` at the first `#` that starts a comment: outside quotes and
/// preceded by whitespace.
pub(crate) fn split_trailing_comment(line: &str) -> (&str, Option<String>) {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        match quote {
            Some('"') => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == '"' {
                    quote = None;
                }
            }
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => {
                let at_token_start =
                    matches!(prev, None | Some(' ' | '\t' | '[' | '{' | ','));
                if (ch == '"' || ch == '\'') && at_token_start {
                    quote = Some(ch);
                } else if ch == '#' && matches!(prev, Some(' ' | '\t')) {
                    let comment = line[idx + 1..].trim().to_string();
                    return (&line[..idx], Some(comment));
                }
            }
        }
        prev = Some(ch);
    }

    (line, None)
}

/// Returns true when the content ends in a `|` or `>` block indicator.
fn opens_block_scalar(code: &str) -> bool {
    let head = code
        .trim_end()
        .trim_end_matches(|c: char| c == '-' || c == '+' || c.is_ascii_digit());
    let mut rev = head.chars().rev();
    match (rev.next(), rev.next()) {
        (Some('|' | '>'), None) => true,
        (Some('|' | '>'), Some(before)) => before.is_whitespace(),
        _ => false,
    }
}

/// Attaches the comments found in `source` to the nodes under `root`.
///
/// `root` must be the document node built from the same source.
pub fn attach(source: &str, root: &mut DocumentNode) {
    let lines = scan_lines(source);

    let DocumentNode {
        comments: doc_comments,
        children,
        ..
    } = root;
    let mut leaves = Vec::new();
    for child in children.iter_mut() {
        collect_leaves(child, &mut leaves);
    }
    let starts: Vec<usize> = leaves.iter().map(|leaf| leaf.position.line).collect();

    // First leaf starting at or after `line`.
    let next_leaf = |line: usize| starts.partition_point(|&s| s < line);
    // One past the last leaf starting at or before `line`.
    let upto = |line: usize| starts.partition_point(|&s| s <= line);

    let mut seen_content = false;
    let mut i = 0;
    while i < lines.len() {
        match &lines[i] {
            LineKind::Comment(_) => {
                let start = i;
                let mut block = Vec::new();
                while let Some(LineKind::Comment(text)) = lines.get(i) {
                    block.push(text.as_str());
                    i += 1;
                }
                let text = block.join("\n");

                // 1-based number of the line after the block
                let after = i + 1;
                let next_is_content = lines.get(i).is_some_and(LineKind::is_content);
                let prev_is_content = start > 0 && lines[start - 1].is_content();

                if !seen_content && !next_is_content {
                    doc_comments.head.push(text);
                } else if next_is_content {
                    match leaves.get_mut(next_leaf(after)) {
                        Some(leaf) => leaf.comments.head.push(text),
                        None => doc_comments.foot.push(text),
                    }
                } else if prev_is_content {
                    // The content line right above the block is line `start`.
                    match upto(start).checked_sub(1) {
                        Some(idx) => leaves[idx].comments.foot.push(text),
                        None => doc_comments.head.push(text),
                    }
                } else {
                    let idx = next_leaf(after);
                    if idx < leaves.len() {
                        leaves[idx].comments.head.push(text);
                    } else {
                        doc_comments.foot.push(text);
                    }
                }
                continue;
            }
            LineKind::Content { trailing } => {
                seen_content = true;
                if let Some(text) = trailing {
                    let line = i + 1;
                    match upto(line).checked_sub(1) {
                        Some(idx) if starts[idx] == line => {
                            leaves[idx].comments.line.push(text.clone())
                        }
                        // Nothing starts on this line (e.g. a bare `-`), so
                        // the comment introduces whatever comes next.
                        _ => match leaves.get_mut(next_leaf(line)) {
                            Some(leaf) => leaf.comments.head.push(text.clone()),
                            None => doc_comments.line.push(text.clone()),
                        },
                    }
                }
            }
            LineKind::BlockBody => seen_content = true,
            LineKind::Blank => {}
        }
        i += 1;
    }
}

fn collect_leaves<'a>(node: &'a mut DocumentNode, out: &mut Vec<&'a mut DocumentNode>) {
    if node.is_leaf() {
        out.push(node);
        return;
    }
    for child in node.children.iter_mut() {
        collect_leaves(child, out);
    }
}
