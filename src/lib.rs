//! confquill exposes structured configuration files as flat, queryable rows.
//!
//! The pipeline is: path resolution ([`file::resolver`]), loading
//! ([`file::loader`]), format parsing ([`document::parser`] for YAML trees,
//! [`formats`] for everything else), flattening ([`flatten`]) and finally the
//! per-table record emitters in [`tables`].

pub mod config;
pub mod document;
pub mod error;
pub mod file;
pub mod flatten;
pub mod formats;
pub mod tables;

pub use error::{Error, Result, SyntaxError};
