//! Configuration system for confquill.
//!
//! Settings are read from a TOML file; every field has a default, so an
//! empty or partial file is valid.
//!
//! # Example
//!
//! ```
//! use confquill::config::Config;
//!
//! let config = Config::default();
//! assert!(config.paths.is_empty());
//! assert_eq!(config.log_filter, "confquill=info");
//!
//! let custom = Config {
//!     paths: vec!["~/conf/*.yml".to_string()],
//!     ..Config::default()
//! };
//! assert_eq!(custom.paths.len(), 1);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for confquill.
///
/// # Fields
///
/// * `paths` - Files, directories or glob patterns to read; `~` is expanded (default: none)
/// * `log_filter` - `tracing` filter directive used when `RUST_LOG` is unset (default: "confquill=info")
/// * `interpolate_ini` - Resolve `${section.key}` and `${ENV}` references in INI values (default: true)
/// * `expand_nested_ini` - Emit `key.sub` rows for nested INI values (default: true)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Files, directories or glob patterns
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default = "default_true")]
    pub interpolate_ini: bool,

    #[serde(default = "default_true")]
    pub expand_nested_ini: bool,
}

/// Returns the default log filter.
fn default_log_filter() -> String {
    "confquill=info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            log_filter: default_log_filter(),
            interpolate_ini: true,
            expand_nested_ini: true,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/confquill/config.toml` on all platforms.
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("confquill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid config file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Loads configuration from an explicitly given file.
    ///
    /// Unlike [`Config::load`], a missing or invalid file is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ini_options_default_on() {
        let config = Config::default();
        assert!(config.interpolate_ini);
        assert!(config.expand_nested_ini);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("paths = [\"/etc/*.ini\"]\n").unwrap();
        assert_eq!(config.paths, vec!["/etc/*.ini"]);
        assert_eq!(config.log_filter, "confquill=info");
        assert!(config.interpolate_ini);
    }

    #[test]
    fn test_config_path_location() {
        if let Some(path) = Config::config_path() {
            assert!(path.ends_with(".config/confquill/config.toml"));
        }
    }
}
