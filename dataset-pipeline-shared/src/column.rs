//! Column-name normalization for the clean dataset representation.

/// Normalize a column header.
///
/// The header is lowercased, every whitespace character becomes `_`, and then
/// anything that is not an ASCII letter, digit or underscore is removed.
/// Case folding and whitespace replacement run before the strip so that
/// multi-word headers collapse into a single snake-cased token.
///
/// ```
/// use dataset_pipeline_shared::normalize_column_name;
///
/// assert_eq!(normalize_column_name("User Name"), "user_name");
/// assert_eq!(normalize_column_name("Email@Addr"), "emailaddr");
/// ```
pub fn normalize_column_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
