//! Parsed document representations.
//!
//! YAML is read into a [`tree::DocumentTree`] of [`node::DocumentNode`]s that
//! keep positions and comments. Every other format is read into a plain
//! [`value::NestedValue`].

pub mod comments;
pub mod node;
pub mod parser;
pub mod tree;
pub mod value;
