//! The flattening engine.
//!
//! Hierarchical documents are turned into flat rows addressed by key paths:
//!
//! - [`tree`] walks a [`DocumentNode`](crate::document::node::DocumentNode)
//!   tree depth-first and hands each row to the caller as soon as it is built
//! - [`nested`] flattens a [`NestedValue`](crate::document::value::NestedValue)
//!   into a coalesced map that is only available once the walk is over
//! - [`key`] derives the dotted, query-safe form of a key path
//! - [`tag`] maps format-level type markers to portable type tags
//!
//! Array indices are always their own dotted segment (`items.0.name`).

pub mod key;
pub mod nested;
pub mod row;
pub mod tag;
pub mod tree;

pub use row::{Row, RowValue};
