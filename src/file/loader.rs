//! File loading.
//!
//! Reads a file from disk, transparently decompressing gzip files, and parses
//! it with the parser matching the requested representation.

use crate::document::parser::parse_yaml;
use crate::document::tree::DocumentTree;
use crate::document::value::NestedValue;
use crate::error::{Error, Result, SyntaxError};
use crate::formats::ini::{parse_ini, IniFile};
use crate::formats::{parse_nested, FileFormat};
use std::fs;
use std::path::Path;

/// Reads the text of `path`.
///
/// Files whose name ends in `.gz` are gunzipped first.
///
/// # Errors
///
/// - [`Error::Io`] if the file cannot be read or is not valid gzip
/// - [`Error::Parse`] if the content is not UTF-8
///
/// # Examples
///
/// ```no_run
/// use confquill::file::loader::read_source;
///
/// let text = read_source("/etc/app/config.yml.gz").unwrap();
/// ```
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = if is_gzipped(path) {
        read_gzipped_file(path)?
    } else {
        fs::read(path).map_err(|e| Error::io(path, e))?
    };
    String::from_utf8(bytes)
        .map_err(|e| Error::parse(path, SyntaxError::new(format!("invalid UTF-8: {}", e))))
}

/// Reads and parses a YAML file into a document tree with comments.
pub fn load_tree<P: AsRef<Path>>(path: P) -> Result<DocumentTree> {
    let path = path.as_ref();
    let source = read_source(path)?;
    parse_yaml(&source).map_err(|e| Error::parse(path, e))
}

/// Reads and parses a file as a nested value.
pub fn load_nested<P: AsRef<Path>>(path: P, format: FileFormat) -> Result<NestedValue> {
    let path = path.as_ref();
    let source = read_source(path)?;
    parse_nested(format, &source).map_err(|e| Error::parse(path, e))
}

/// Reads and parses an INI file.
pub fn load_ini<P: AsRef<Path>>(path: P) -> Result<IniFile> {
    let path = path.as_ref();
    let source = read_source(path)?;
    parse_ini(&source).map_err(|e| Error::parse(path, e))
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn read_gzipped_file(path: &Path) -> Result<Vec<u8>> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let mut decoder = GzDecoder::new(file);
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .map_err(|e| Error::io(path, e))?;
    Ok(content)
}
