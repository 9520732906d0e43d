//! Quote helpers for values with significant surrounding whitespace

/// Wrap a value in double quotes.
///
/// Stores trim whitespace around values when loading, so a value that must
/// keep leading or trailing spaces can be stored quoted.
pub fn add_quotes(s: &str) -> String {
    format!("\"{}\"", s)
}

/// Strip every leading and trailing double quote from a value.
pub fn remove_quotes(s: &str) -> &str {
    s.trim_matches('"')
}
