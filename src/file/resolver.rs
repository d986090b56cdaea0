//! Path resolution.
//!
//! Configured entries may be plain files, directories, or glob patterns, and
//! may start with `~`. Resolution expands them into absolute file paths for
//! one format:
//! - a directory stands for every file directly inside it
//! - glob matches are kept only when their extension belongs to the format
//! - a match equal to a configured path is always kept, whatever its name
//! - order follows the configuration; repeated files are dropped

use crate::error::{Error, Result};
use crate::formats::FileFormat;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves `configured` into the files to read for `format`.
///
/// # Errors
///
/// - [`Error::NoPathsConfigured`] if `configured` is empty
/// - [`Error::InvalidGlob`] for a malformed pattern
/// - [`Error::Io`] for a literal path that does not exist, or a directory
///   that cannot be listed
pub fn resolve<S: AsRef<str>>(configured: &[S], format: FileFormat) -> Result<Vec<PathBuf>> {
    if configured.is_empty() {
        return Err(Error::NoPathsConfigured);
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for entry in configured {
        let entry = entry.as_ref();
        let full = absolute(&expand_home(entry))?;
        let pattern = if has_glob_chars(entry) {
            full.to_string_lossy().into_owned()
        } else {
            let meta = std::fs::metadata(&full).map_err(|e| Error::io(&full, e))?;
            if meta.is_dir() {
                format!("{}/*", glob::Pattern::escape(&full.to_string_lossy()))
            } else {
                glob::Pattern::escape(&full.to_string_lossy())
            }
        };

        let matches = glob::glob(&pattern).map_err(|source| Error::InvalidGlob {
            pattern: entry.to_string(),
            source,
        })?;

        let mut count = 0usize;
        for matched in matches {
            let path = matched.map_err(|e| {
                let path = e.path().to_path_buf();
                Error::io(path, e.into_error())
            })?;
            if !path.is_file() {
                continue;
            }
            if path != full && !format.matches(&path) {
                continue;
            }
            count += 1;
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
        debug!(entry, matched = count, format = format.name(), "resolved path entry");
    }

    Ok(files)
}

/// Expands a leading `~` or `~/` to the home directory.
///
/// Left unchanged when the home directory is unknown.
pub fn expand_home(entry: &str) -> PathBuf {
    let rest = if entry == "~" {
        Some("")
    } else {
        entry.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(entry),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::io(path, e))?;
    Ok(cwd.join(path))
}

fn has_glob_chars(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}
