//! Locating and reading configuration files.
//!
//! [`resolver`] turns configured paths and patterns into a list of files;
//! [`loader`] reads one file (decompressing `.gz`) and hands it to the right
//! parser.

pub mod loader;
pub mod resolver;
