//! Flat `key=value` store without sections or comments

use std::fmt;
use std::path::{Path, PathBuf};

use linked_hash_map::LinkedHashMap;

use super::{split_property, Property, LINE_END};
use crate::error::{ConfigError, Result};
use crate::options::StoreOptions;
use crate::utils::file::{load_lines_lenient, write_text};
use crate::utils::key::fold_key;

/// A flat key-value file held in memory.
///
/// Lines without the separator are dropped on load. When a key appears more
/// than once, the first occurrence is kept. Entries are written back in
/// insertion order.
#[derive(Debug, Clone)]
pub struct FlatStore {
    path: Option<PathBuf>,
    options: StoreOptions,
    /// Folded key -> property as written
    properties: LinkedHashMap<String, Property>,
}

impl FlatStore {
    /// Open a store with default options. A missing or unreadable file gives an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_options(path, StoreOptions::default())
    }

    pub fn with_options<P: AsRef<Path>>(path: P, options: StoreOptions) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut store = FlatStore {
            path: Some(path),
            options,
            properties: LinkedHashMap::new(),
        };
        store.reload();
        store
    }

    /// Build a store from text. The result has no backing file.
    pub fn parse(content: &str, options: StoreOptions) -> Self {
        let mut store = FlatStore {
            path: None,
            options,
            properties: LinkedHashMap::new(),
        };
        store.load_lines(content.lines());
        store
    }

    /// Discard the in-memory model and load the backing file again.
    pub fn reload(&mut self) {
        self.properties.clear();
        if let Some(path) = self.path.clone() {
            let lines = load_lines_lenient(&path);
            self.load_lines(lines.iter().map(String::as_str));
            log::debug!(
                "Loaded {} propert(ies) from {}",
                self.properties.len(),
                path.display()
            );
        }
    }

    fn load_lines<'a, I: IntoIterator<Item = &'a str>>(&mut self, lines: I) {
        for line in lines {
            let Some((key, value)) = split_property(line, self.options.separator) else {
                continue;
            };
            let folded = fold_key(key, self.options.ignore_case).into_owned();
            if self.properties.contains_key(&folded) {
                continue;
            }
            self.properties.insert(
                folded,
                Property {
                    key: key.to_string(),
                    value: value.to_string(),
                },
            );
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Get the value stored under `key`, or an empty string if absent.
    pub fn get(&self, key: &str) -> String {
        self.properties
            .get(&*fold_key(key, self.options.ignore_case))
            .map(|p| p.value.clone())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties
            .contains_key(&*fold_key(key, self.options.ignore_case))
    }

    /// Keys as written, in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.values().map(|p| p.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Insert or overwrite `key`. `None` deletes the key.
    ///
    /// Overwriting keeps the key's position and its original spelling.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let folded = fold_key(key, self.options.ignore_case).into_owned();
        match value {
            Some(value) => {
                // LinkedHashMap::insert moves an existing entry to the back
                if let Some(property) = self.properties.get_mut(&folded) {
                    property.value = value.to_string();
                } else {
                    self.properties.insert(
                        folded,
                        Property {
                            key: key.to_string(),
                            value: value.to_string(),
                        },
                    );
                }
            }
            None => {
                self.properties.remove(&folded);
            }
        }
        self.autosave()
    }

    /// Write the whole model to the backing file.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_ref().ok_or(ConfigError::NoBackingFile)?;
        let output = self.to_string();
        write_text(path, &output)?;
        log::debug!("Saved {} byte(s) to {}", output.len(), path.display());
        Ok(())
    }

    fn autosave(&self) -> Result<()> {
        if self.options.autosave && self.path.is_some() {
            self.save()
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for FlatStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for property in self.properties.values() {
            write!(
                f,
                "{}{}{}{}",
                property.key, self.options.separator, property.value, LINE_END
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> FlatStore {
        FlatStore::parse(content, StoreOptions::default())
    }

    #[test]
    fn test_first_occurrence_wins() {
        let store = parse("a=1\na=2\n");
        assert_eq!(store.get("a"), "1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_detection_respects_case_rule() {
        let store = parse("Name=first\nname=second\n");
        assert_eq!(store.get("NAME"), "first");

        let store = FlatStore::parse(
            "Name=first\nname=second\n",
            StoreOptions::default().with_ignore_case(false),
        );
        assert_eq!(store.get("Name"), "first");
        assert_eq!(store.get("name"), "second");
        assert_eq!(store.get("NAME"), "");
    }

    #[test]
    fn test_lines_without_separator_dropped() {
        let store = parse("just text\n# comment\nk = v \n");
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["k"]);
        assert_eq!(store.get("k"), "v");
        assert_eq!(store.to_string(), "k=v\r\n");
    }

    #[test]
    fn test_value_keeps_later_separators() {
        let store = parse("url=http://host/?a=b\n");
        assert_eq!(store.get("url"), "http://host/?a=b");
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = parse("");
        assert_eq!(store.get("nothing"), "");
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_and_delete() {
        let mut store = parse("a=1\nb=2\n");
        store.set("c", Some("3")).unwrap();
        store.set("a", Some("10")).unwrap();
        store.set("b", None).unwrap();
        store.set("never", None).unwrap();
        assert_eq!(store.get("b"), "");
        assert_eq!(store.to_string(), "a=10\r\nc=3\r\n");
    }

    #[test]
    fn test_overwrite_keeps_original_spelling() {
        let mut store = parse("Key=v\n");
        store.set("KEY", Some("w")).unwrap();
        assert_eq!(store.to_string(), "Key=w\r\n");
    }

    #[test]
    fn test_empty_value_is_distinct_from_absent() {
        let mut store = parse("");
        store.set("empty", Some("")).unwrap();
        assert!(store.contains_key("empty"));
        assert_eq!(store.get("empty"), "");
    }

    #[test]
    fn test_custom_separator() {
        let store = FlatStore::parse(
            "host: example.org\nport: 8080\n",
            StoreOptions::default().with_separator(':'),
        );
        assert_eq!(store.get("port"), "8080");
        assert_eq!(store.to_string(), "host:example.org\r\nport:8080\r\n");
    }

    #[test]
    fn test_detached_store_cannot_save() {
        let mut store = FlatStore::parse("a=1", StoreOptions::default().with_autosave(true));
        // Autosave is skipped without a backing file
        store.set("b", Some("2")).unwrap();
        assert!(matches!(store.save(), Err(ConfigError::NoBackingFile)));
    }
}
