//! INI parsing.
//!
//! INI files keep their own small model instead of a [`NestedValue`]:
//! sections and keys carry comments, and values may reference other keys.
//!
//! Dialect:
//! - keys before the first `[section]` header belong to `DEFAULT`, which is
//!   always the first section
//! - `=` or `:` separates key and value, whichever comes first
//! - `#` and `;` start comment lines, which attach to the following key or
//!   section; an unquoted value may end in an inline ` #` or ` ;` comment
//! - values wrapped in matching single or double quotes are unquoted
//! - a line indented deeper than its key continues the previous value
//! - a repeated section is merged, a repeated key keeps its first position
//!   and takes the last value

use crate::document::node::Position;
use crate::document::value::NestedValue;
use crate::error::SyntaxError;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::OnceLock;

pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq)]
pub struct IniKey {
    pub name: String,
    pub value: String,
    /// Comment lines above the key (markers kept), then the inline comment.
    pub comment: String,
    /// 1-based line of the key.
    pub line: usize,
}

impl IniKey {
    /// Sub-keys of a nested value.
    ///
    /// A value is nested when it starts with a line break and every
    /// following non-empty line is itself a `key = value` pair.
    pub fn nested(&self) -> Option<Vec<(String, String)>> {
        if !self.value.starts_with('\n') {
            return None;
        }
        let mut pairs = Vec::new();
        for line in self.value.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (key, value) = split_pair(line)?;
            pairs.push((key.to_string(), value.to_string()));
        }
        if pairs.is_empty() {
            None
        } else {
            Some(pairs)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IniSection {
    pub name: String,
    pub comment: String,
    pub keys: Vec<IniKey>,
}

impl IniSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            comment: String::new(),
            keys: Vec::new(),
        }
    }

    pub fn key(&self, name: &str) -> Option<&IniKey> {
        self.keys.iter().find(|k| k.name == name)
    }
}

/// A parsed INI file.
#[derive(Debug, Clone, PartialEq)]
pub struct IniFile {
    sections: Vec<IniSection>,
}

impl IniFile {
    /// Sections in first-seen order, `DEFAULT` first.
    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Resolves `${section.key}` references against this file and `${NAME}`
    /// references against the environment. Unknown references become empty.
    ///
    /// The section name is everything before the last dot, so dotted section
    /// names work as long as the key itself has no dot.
    pub fn interpolate(&self, value: &str) -> String {
        reference_pattern()
            .replace_all(value, |caps: &Captures<'_>| {
                let reference = &caps[1];
                match reference.rsplit_once('.') {
                    Some((section, key)) => self
                        .section(section)
                        .and_then(|s| s.key(key))
                        .map(|k| k.value.clone())
                        .unwrap_or_default(),
                    None => std::env::var(reference).unwrap_or_default(),
                }
            })
            .into_owned()
    }

    /// Converts to `{section: {key: value}}` with raw values.
    pub fn to_nested(&self) -> NestedValue {
        let sections = self
            .sections
            .iter()
            .map(|section| {
                let keys = section
                    .keys
                    .iter()
                    .map(|k| (k.name.clone(), NestedValue::String(k.value.clone())))
                    .collect::<IndexMap<_, _>>();
                (section.name.clone(), NestedValue::Map(keys))
            })
            .collect();
        NestedValue::Map(sections)
    }

    fn section_mut(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(IniSection::new(name));
                self.sections.len() - 1
            }
        }
    }
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(.*?)\}").expect("valid regex"))
}

/// Splits `key = value` or `key: value` at whichever separator comes first.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(['=', ':'])?;
    let key = line[..idx].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[idx + 1..].trim()))
}

/// Splits an inline comment off an unquoted value.
fn split_inline_comment(value: &str) -> (&str, Option<&str>) {
    let bytes = value.as_bytes();
    for (idx, &b) in bytes.iter().enumerate() {
        if (b == b'#' || b == b';') && idx > 0 && bytes[idx - 1].is_ascii_whitespace() {
            return (value[..idx].trim_end(), Some(value[idx..].trim()));
        }
    }
    (value, None)
}

fn unquote(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&value[1..value.len() - 1]);
        }
    }
    None
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Parses INI text.
pub fn parse_ini(source: &str) -> Result<IniFile, SyntaxError> {
    let mut file = IniFile {
        sections: vec![IniSection::new(DEFAULT_SECTION)],
    };
    let mut current = 0usize;
    let mut pending: Vec<String> = Vec::new();
    // (section index, key index, indent of the key line)
    let mut last_key: Option<(usize, usize, usize)> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let raw = if idx == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw
        };
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }

        if let Some((s, k, key_indent)) = last_key {
            if indent_of(raw) > key_indent && !trimmed.starts_with(['#', ';']) {
                let value = &mut file.sections[s].keys[k].value;
                value.push('\n');
                value.push_str(trimmed);
                continue;
            }
        }

        if trimmed.starts_with(['#', ';']) {
            pending.push(trimmed.to_string());
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    SyntaxError::at("invalid section header", Position::new(line_no, 1))
                })?;
            current = file.section_mut(name);
            if !pending.is_empty() {
                file.sections[current].comment = pending.join("\n");
                pending.clear();
            }
            last_key = None;
            continue;
        }

        let (name, rest) = split_pair(trimmed).ok_or_else(|| {
            SyntaxError::at(
                "key-value delimiter not found",
                Position::new(line_no, indent_of(raw) + 1),
            )
        })?;

        let (value, inline) = match unquote(rest) {
            Some(inner) => (inner, None),
            None => split_inline_comment(rest),
        };
        let mut comment = pending.join("\n");
        pending.clear();
        if let Some(inline) = inline {
            if !comment.is_empty() {
                comment.push('\n');
            }
            comment.push_str(inline);
        }

        let key = IniKey {
            name: name.to_string(),
            value: value.to_string(),
            comment,
            line: line_no,
        };
        let section = &mut file.sections[current];
        let key_idx = match section.keys.iter().position(|k| k.name == key.name) {
            Some(existing) => {
                section.keys[existing] = key;
                existing
            }
            None => {
                section.keys.push(key);
                section.keys.len() - 1
            }
        };
        last_key = Some((current, key_idx, indent_of(raw)));
    }

    Ok(file)
}
