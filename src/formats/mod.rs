//! Format detection and nested-value parsers.
//!
//! YAML read for its key/value rows goes through
//! [`document::parser`](crate::document::parser) instead, which keeps
//! positions and comments. Everything here produces a [`NestedValue`].

pub mod ini;
pub mod xml;

use crate::document::node::Position;
use crate::document::value::NestedValue;
use crate::error::SyntaxError;
use std::path::Path;

/// The configuration formats confquill understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
    Xml,
    Ini,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Yaml,
        FileFormat::Json,
        FileFormat::Toml,
        FileFormat::Xml,
        FileFormat::Ini,
    ];

    /// File extensions, lowercase and without the dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Yaml => &["yml", "yaml"],
            FileFormat::Json => &["json"],
            FileFormat::Toml => &["toml"],
            FileFormat::Xml => &["xml"],
            FileFormat::Ini => &["ini"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Yaml => "yaml",
            FileFormat::Json => "json",
            FileFormat::Toml => "toml",
            FileFormat::Xml => "xml",
            FileFormat::Ini => "ini",
        }
    }

    /// Returns true if the file name carries one of this format's
    /// extensions, optionally followed by `.gz`.
    pub fn matches(&self, path: &Path) -> bool {
        base_extension(path).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }

    /// Detects the format from a file name.
    pub fn from_path(path: &Path) -> Option<FileFormat> {
        FileFormat::ALL.into_iter().find(|format| format.matches(path))
    }
}

/// Lowercased extension of `path` once a trailing `.gz` is removed.
fn base_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_string())
}

/// Parses `source` as a whole-document nested value.
pub fn parse_nested(format: FileFormat, source: &str) -> Result<NestedValue, SyntaxError> {
    match format {
        FileFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(source).map_err(|e| {
                SyntaxError::at(json_message(&e), Position::new(e.line(), e.column()))
            })?;
            Ok(NestedValue::from(value))
        }
        FileFormat::Toml => {
            let value: toml::Table = toml::from_str(source).map_err(|e| match e.span() {
                Some(span) => SyntaxError::at(e.message(), position_at(source, span.start)),
                None => SyntaxError::new(e.message()),
            })?;
            Ok(NestedValue::from(toml::Value::Table(value)))
        }
        FileFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(source).map_err(|e| {
                let message = e.to_string();
                match e.location() {
                    Some(loc) => SyntaxError::at(message, Position::new(loc.line(), loc.column())),
                    None => SyntaxError::new(message),
                }
            })?;
            Ok(NestedValue::from(value))
        }
        FileFormat::Xml => xml::parse_xml(source),
        FileFormat::Ini => Ok(ini::parse_ini(source)?.to_nested()),
    }
}

/// serde_json appends " at line X column Y" itself; drop it since the
/// position is carried separately.
fn json_message(e: &serde_json::Error) -> String {
    let full = e.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}

/// Converts a byte offset in `source` into a 1-based line and column.
pub(crate) fn position_at(source: &str, offset: usize) -> Position {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    Position::new(line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value::ValueKind;

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.yml")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("B.YAML")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("c.json.gz")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("settings.ini")), Some(FileFormat::Ini));
        assert_eq!(FileFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileFormat::from_path(Path::new(".json")), None);
        assert_eq!(FileFormat::from_path(Path::new("archive.gz")), None);
    }

    #[test]
    fn test_matches_is_format_specific() {
        assert!(FileFormat::Toml.matches(Path::new("Cargo.toml")));
        assert!(!FileFormat::Toml.matches(Path::new("Cargo.lock")));
        assert!(FileFormat::Xml.matches(Path::new("pom.xml.gz")));
    }

    #[test]
    fn test_parse_json_keeps_order() {
        let value = parse_nested(FileFormat::Json, r#"{"z": 1, "a": 2.5}"#).unwrap();
        let map = value.as_map().unwrap();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(map["a"].kind(), Some(ValueKind::Number));
    }

    #[test]
    fn test_parse_json_error_position() {
        let err = parse_nested(FileFormat::Json, "{\n  \"a\": ,\n}").unwrap_err();
        assert_eq!(err.position.map(|p| p.line), Some(2));
        assert!(!err.message.contains("at line"));
    }

    #[test]
    fn test_parse_toml() {
        let value = parse_nested(FileFormat::Toml, "[server]\nport = 80\nhost = \"x\"\n").unwrap();
        let server = value.as_map().unwrap()["server"].as_map().unwrap();
        assert_eq!(server["port"], NestedValue::Int(80));
    }

    #[test]
    fn test_parse_toml_error_position() {
        let err = parse_nested(FileFormat::Toml, "a = 1\nb = = 2\n").unwrap_err();
        assert_eq!(err.position.map(|p| p.line), Some(2));
    }

    #[test]
    fn test_parse_yaml_nested() {
        let value = parse_nested(FileFormat::Yaml, "a:\n  - 1\n  - two\n").unwrap();
        let items = value.as_map().unwrap()["a"].as_list().unwrap();
        assert_eq!(items[0], NestedValue::Int(1));
        assert_eq!(items[1], NestedValue::String("two".to_string()));
    }

    #[test]
    fn test_parse_yaml_error() {
        assert!(parse_nested(FileFormat::Yaml, "a: [1, 2\n").is_err());
    }

    #[test]
    fn test_position_at() {
        let src = "ab\ncdé\nx";
        assert_eq!(position_at(src, 0), Position::new(1, 1));
        assert_eq!(position_at(src, 3), Position::new(2, 1));
        assert_eq!(position_at(src, 7), Position::new(2, 4));
        assert_eq!(position_at(src, 100), Position::new(3, 2));
    }
}
