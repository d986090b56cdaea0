//! Queryable tables.
//!
//! Each [`Table`] reads one format and turns every matching file into
//! [`Record`]s. Files are processed one at a time in resolution order. A file
//! that cannot be read or parsed is logged, recorded in the [`BatchReport`]
//! and skipped; the batch carries on with the next file. Records are only
//! produced after a file has parsed successfully, so a failing file never
//! contributes partial output.

use crate::config::Config;
use crate::document::value::{NestedValue, ValueKind};
use crate::error::{Error, Result};
use crate::file::loader::{load_ini, load_nested, load_tree};
use crate::file::resolver::resolve;
use crate::flatten::nested::flatten;
use crate::flatten::tree::walk;
use crate::flatten::Row;
use crate::formats::FileFormat;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    YmlKeyValue,
    JsonKeyValue,
    TomlKeyValue,
    XmlKeyValue,
    IniKeyValue,
    IniSection,
    YmlFile,
    JsonFile,
    TomlFile,
    XmlFile,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::YmlKeyValue,
        Table::JsonKeyValue,
        Table::TomlKeyValue,
        Table::XmlKeyValue,
        Table::IniKeyValue,
        Table::IniSection,
        Table::YmlFile,
        Table::JsonFile,
        Table::TomlFile,
        Table::XmlFile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::YmlKeyValue => "yml_key_value",
            Table::JsonKeyValue => "json_key_value",
            Table::TomlKeyValue => "toml_key_value",
            Table::XmlKeyValue => "xml_key_value",
            Table::IniKeyValue => "ini_key_value",
            Table::IniSection => "ini_section",
            Table::YmlFile => "yml_file",
            Table::JsonFile => "json_file",
            Table::TomlFile => "toml_file",
            Table::XmlFile => "xml_file",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Table::YmlKeyValue => "Key/value rows of YAML files with positions and comments",
            Table::JsonKeyValue => "Key/value rows of JSON files",
            Table::TomlKeyValue => "Key/value rows of TOML files",
            Table::XmlKeyValue => "Key/value rows of XML files",
            Table::IniKeyValue => "Keys of INI files with their section and comment",
            Table::IniSection => "Sections of INI files",
            Table::YmlFile => "Whole content of YAML files as JSON",
            Table::JsonFile => "Whole content of JSON files",
            Table::TomlFile => "Whole content of TOML files as JSON",
            Table::XmlFile => "Whole content of XML files as JSON",
        }
    }

    pub fn format(&self) -> FileFormat {
        match self {
            Table::YmlKeyValue | Table::YmlFile => FileFormat::Yaml,
            Table::JsonKeyValue | Table::JsonFile => FileFormat::Json,
            Table::TomlKeyValue | Table::TomlFile => FileFormat::Toml,
            Table::XmlKeyValue | Table::XmlFile => FileFormat::Xml,
            Table::IniKeyValue | Table::IniSection => FileFormat::Ini,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown table '{}'", s))
    }
}

/// One output record. Every variant carries the file path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// A tree-mode row.
    Tree {
        path: String,
        #[serde(flatten)]
        row: Row,
    },
    /// A nested-mode entry.
    Nested {
        path: String,
        key: String,
        keys: Vec<String>,
        value: NestedValue,
        tag: Option<ValueKind>,
    },
    IniKey {
        path: String,
        section: String,
        key: String,
        value: String,
        comment: Option<String>,
    },
    IniSection {
        path: String,
        section: String,
        comment: Option<String>,
    },
    /// Whole-file content.
    File {
        path: String,
        content: serde_json::Value,
    },
}

/// Where a table reads its files from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Configured paths, directories or glob patterns.
    Paths(Vec<String>),
    /// A single file, read as-is without resolution or extension checks.
    File(PathBuf),
}

/// Table behaviour switches, taken from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub interpolate_ini: bool,
    pub expand_nested_ini: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interpolate_ini: true,
            expand_nested_ini: true,
        }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Self {
            interpolate_ini: config.interpolate_ini,
            expand_nested_ini: config.expand_nested_ini,
        }
    }
}

/// Outcome of one table run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files attempted.
    pub files: usize,
    /// Records emitted.
    pub rows: usize,
    /// Files that were skipped, with the reason.
    pub failures: Vec<Error>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs `table` over `source`, handing each record to `emit`.
///
/// # Errors
///
/// Only path resolution errors abort the run; per-file errors are collected
/// in the returned report.
pub fn run<F: FnMut(Record)>(
    table: Table,
    source: &Source,
    options: &Options,
    mut emit: F,
) -> Result<BatchReport> {
    let files = match source {
        Source::Paths(paths) => resolve(paths, table.format())?,
        Source::File(path) => vec![path.clone()],
    };

    let mut report = BatchReport::default();
    for file in &files {
        report.files += 1;
        debug!(table = table.name(), path = %file.display(), "processing file");
        let mut count = 0usize;
        let outcome = process_file(table, file, options, &mut |record| {
            count += 1;
            emit(record);
        });
        match outcome {
            Ok(()) => report.rows += count,
            Err(e) => {
                warn!(table = table.name(), path = %file.display(), error = %e, "skipping file");
                report.failures.push(e);
            }
        }
    }

    info!(
        table = table.name(),
        files = report.files,
        rows = report.rows,
        failed = report.failures.len(),
        "table run finished"
    );
    Ok(report)
}

/// Produces the records of one file. Parsing completes before the first
/// record is emitted.
fn process_file(
    table: Table,
    file: &Path,
    options: &Options,
    emit: &mut dyn FnMut(Record),
) -> Result<()> {
    let path = file.display().to_string();
    match table {
        Table::YmlKeyValue => {
            let tree = load_tree(file)?;
            walk(tree.root(), &mut |row| {
                emit(Record::Tree {
                    path: path.clone(),
                    row,
                })
            });
        }
        Table::JsonKeyValue | Table::TomlKeyValue | Table::XmlKeyValue => {
            let value = load_nested(file, table.format())?;
            for (key, entry) in flatten(&value) {
                emit(Record::Nested {
                    path: path.clone(),
                    key,
                    tag: entry.kind(),
                    keys: entry.keys,
                    value: entry.value,
                });
            }
        }
        Table::IniKeyValue => {
            let ini = load_ini(file)?;
            for section in ini.sections() {
                for key in &section.keys {
                    let resolve_value = |raw: &str| {
                        if options.interpolate_ini {
                            ini.interpolate(raw)
                        } else {
                            raw.to_string()
                        }
                    };
                    let nested = if options.expand_nested_ini {
                        key.nested()
                    } else {
                        None
                    };
                    match nested {
                        Some(pairs) => {
                            for (sub, raw) in pairs {
                                emit(Record::IniKey {
                                    path: path.clone(),
                                    section: section.name.clone(),
                                    key: format!("{}.{}", key.name, sub),
                                    value: resolve_value(&raw),
                                    // the comment belongs to the parent key
                                    comment: None,
                                });
                            }
                        }
                        None => emit(Record::IniKey {
                            path: path.clone(),
                            section: section.name.clone(),
                            key: key.name.clone(),
                            value: resolve_value(&key.value),
                            comment: non_empty(&key.comment),
                        }),
                    }
                }
            }
        }
        Table::IniSection => {
            let ini = load_ini(file)?;
            for section in ini.sections() {
                emit(Record::IniSection {
                    path: path.clone(),
                    section: section.name.clone(),
                    comment: non_empty(&section.comment),
                });
            }
        }
        Table::YmlFile | Table::JsonFile | Table::TomlFile | Table::XmlFile => {
            let value = load_nested(file, table.format())?;
            emit(Record::File {
                path,
                content: value.to_json(),
            });
        }
    }
    Ok(())
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>(), Ok(table));
        }
        assert!("csv_key_value".parse::<Table>().is_err());
    }

    #[test]
    fn test_table_formats() {
        assert_eq!(Table::IniSection.format(), FileFormat::Ini);
        assert_eq!(Table::YmlFile.format(), FileFormat::Yaml);
        assert_eq!(Table::XmlKeyValue.format(), FileFormat::Xml);
    }

    #[test]
    fn test_no_paths_is_an_error() {
        let result = run(
            Table::JsonFile,
            &Source::Paths(Vec::new()),
            &Options::default(),
            |_| {},
        );
        assert!(matches!(result, Err(Error::NoPathsConfigured)));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = Record::IniSection {
            path: "/a.ini".to_string(),
            section: "DEFAULT".to_string(),
            comment: None,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"path": "/a.ini", "section": "DEFAULT", "comment": null})
        );
    }
}
