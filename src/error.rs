//! Error types shared by the resolver, loaders and format parsers.

use crate::document::node::Position;
use std::fmt;
use std::path::PathBuf;

/// Result type alias for confquill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced while turning configured paths into rows.
///
/// Every variant except [`Error::NoPathsConfigured`] names the offending path
/// or pattern. All of them are fatal to the affected file only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no paths configured")]
    NoPathsConfigured,

    #[error("invalid glob pattern {pattern}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },
}

impl Error {
    /// The file or pattern this error is about, if any.
    pub fn path(&self) -> Option<String> {
        match self {
            Error::NoPathsConfigured => None,
            Error::InvalidGlob { pattern, .. } => Some(pattern.clone()),
            Error::Io { path, .. } | Error::Parse { path, .. } => {
                Some(path.display().to_string())
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: SyntaxError) -> Self {
        Error::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Malformed content reported by a format parser.
///
/// Parsers do not know which file they are reading; the caller wraps this
/// into [`Error::Parse`] together with the path.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub position: Option<Position>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn at(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(
                f,
                "{} at line {} column {}",
                self.message, pos.line, pos.column
            ),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_with_position() {
        let err = SyntaxError::at("unexpected token", Position { line: 3, column: 7 });
        assert_eq!(err.to_string(), "unexpected token at line 3 column 7");
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = Error::parse("/tmp/a.json", SyntaxError::new("bad"));
        assert_eq!(err.to_string(), "failed to parse /tmp/a.json: bad");
        assert_eq!(err.path().as_deref(), Some("/tmp/a.json"));
    }

    #[test]
    fn test_no_paths_configured_message() {
        assert_eq!(Error::NoPathsConfigured.to_string(), "no paths configured");
        assert!(Error::NoPathsConfigured.path().is_none());
    }
}
