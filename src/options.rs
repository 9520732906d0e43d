//! Construction parameters shared by the text-backed stores.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEPARATOR: char = '=';
pub const DEFAULT_COMMENT: char = '#';

/// Options fixed for the lifetime of a [`FlatStore`](crate::FlatStore) or
/// [`SectionedStore`](crate::SectionedStore).
///
/// Deserializable so that a host application can carry store settings in its
/// own configuration file:
///
/// ```toml
/// autosave = true
/// separator = ":"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Write the whole model back to disk after every mutation
    pub autosave: bool,
    /// Compare keys without regard to case. Section names are always case-sensitive.
    pub ignore_case: bool,
    /// Character splitting a line into key and value
    pub separator: char,
    /// Character starting a comment. Ignored by the flat store.
    pub comment: char,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            autosave: false,
            ignore_case: true,
            separator: DEFAULT_SEPARATOR,
            comment: DEFAULT_COMMENT,
        }
    }
}

impl StoreOptions {
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_comment(mut self, comment: char) -> Self {
        self.comment = comment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert!(!options.autosave);
        assert!(options.ignore_case);
        assert_eq!(options.separator, '=');
        assert_eq!(options.comment, '#');
    }

    #[test]
    fn test_partial_toml() {
        let options: StoreOptions = toml::from_str("autosave = true\nseparator = \":\"\n").unwrap();
        assert!(options.autosave);
        assert_eq!(options.separator, ':');
        // Unset fields keep their defaults
        assert!(options.ignore_case);
        assert_eq!(options.comment, '#');
    }

    #[test]
    fn test_builder_chain() {
        let options = StoreOptions::default()
            .with_ignore_case(false)
            .with_comment(';');
        assert!(!options.ignore_case);
        assert_eq!(options.comment, ';');
    }
}
