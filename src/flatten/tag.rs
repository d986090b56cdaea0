//! Portable type tags for tree-mode rows.

use serde::Serialize;

/// The portable type of a scalar.
///
/// Bit widths and literal styles (hex, octal, exponent) are deliberately not
/// represented; null has no tag at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Integer,
    Number,
    Boolean,
}

impl TypeTag {
    /// Maps a YAML-style tag to a portable type tag.
    ///
    /// `!!null` maps to `None`; anything unrecognised (including `!!map`,
    /// `!!seq` and custom tags) is a string.
    ///
    /// # Example
    ///
    /// ```
    /// use confquill::flatten::tag::TypeTag;
    ///
    /// assert_eq!(TypeTag::from_marker("!!int"), Some(TypeTag::Integer));
    /// assert_eq!(TypeTag::from_marker("!!null"), None);
    /// assert_eq!(TypeTag::from_marker("!custom"), Some(TypeTag::String));
    /// ```
    pub fn from_marker(marker: &str) -> Option<TypeTag> {
        match marker {
            "!!null" => None,
            "!!int" => Some(TypeTag::Integer),
            "!!float" => Some(TypeTag::Number),
            "!!bool" => Some(TypeTag::Boolean),
            _ => Some(TypeTag::String),
        }
    }
}
