//! Query-safe key paths.

/// Joins key path segments into a dotted string usable as a hierarchical
/// path label.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`. The segments themselves
/// are left untouched by callers, which keep them for array-style output.
///
/// # Example
///
/// ```
/// use confquill::flatten::key::normalize;
///
/// let segments = ["my key", "0", "val-ue"].map(String::from);
/// assert_eq!(normalize(&segments), "my_key.0.val_ue");
/// ```
pub fn normalize<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| normalize_segment(segment.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Normalizes a single segment.
pub fn normalize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
