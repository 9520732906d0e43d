//! Sectioned INI store with inline and standalone comment preservation
//!
//! The parser works line by line and never fails:
//!
//! 1. A line holding both `[` and `]` is a section header. The name is the
//!    text strictly between the first `[` and the first `]`; anything outside
//!    the brackets is ignored. Inverted or empty brackets (`]x[`, `[]`) make
//!    the line a no-op.
//! 2. Otherwise a line holding the separator is a property. Key and value are
//!    trimmed and the value keeps any inline comment. The first occurrence of
//!    a key within a section wins.
//! 3. Otherwise a line holding the comment marker is a standalone comment,
//!    kept from the marker to the end of the line.
//! 4. Anything else is dropped.
//!
//! Standalone comments live in the section's entry list next to the
//! properties, so rewriting a file keeps them where they were read.

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

use linked_hash_map::LinkedHashMap;

use super::{split_property, Property, LINE_END};
use crate::error::{ConfigError, Result};
use crate::options::StoreOptions;
use crate::utils::file::{load_lines_lenient, write_text};
use crate::utils::key::fold_key;

/// Name of the unnamed section holding properties that precede any header.
pub const DEFAULT_SECTION: &str = "";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Property(Property),
    /// Full comment text, starting with the marker
    Comment(String),
}

/// Entries in file order plus a folded-key index into them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Section {
    fn position(&self, key: &str, ignore_case: bool) -> Option<usize> {
        self.index.get(&*fold_key(key, ignore_case)).copied()
    }

    fn property(&self, key: &str, ignore_case: bool) -> Option<&Property> {
        match self.entries.get(self.position(key, ignore_case)?) {
            Some(Entry::Property(p)) => Some(p),
            _ => None,
        }
    }

    fn property_mut(&mut self, key: &str, ignore_case: bool) -> Option<&mut Property> {
        let idx = self.position(key, ignore_case)?;
        match self.entries.get_mut(idx) {
            Some(Entry::Property(p)) => Some(p),
            _ => None,
        }
    }

    /// Append a property unless the key is already present.
    fn push_property(&mut self, key: &str, value: &str, ignore_case: bool) {
        let folded = fold_key(key, ignore_case).into_owned();
        if self.index.contains_key(&folded) {
            return;
        }
        self.index.insert(folded, self.entries.len());
        self.entries.push(Entry::Property(Property {
            key: key.to_string(),
            value: value.to_string(),
        }));
    }

    fn push_comment(&mut self, text: &str) {
        self.entries.push(Entry::Comment(text.to_string()));
    }

    fn remove_property(&mut self, key: &str, ignore_case: bool) {
        if let Some(idx) = self.index.remove(&*fold_key(key, ignore_case)) {
            self.entries.remove(idx);
            for pos in self.index.values_mut() {
                if *pos > idx {
                    *pos -= 1;
                }
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Value part of a raw entry with its inline comment and the whitespace
/// before it removed. Values without a comment are returned untouched.
fn strip_comment(raw: &str, marker: char) -> &str {
    match raw.find(marker) {
        Some(idx) => raw[..idx].trim(),
        None => raw,
    }
}

/// Replace the value part of `raw`, keeping whatever follows it (the inline
/// comment and the spacing in front of it).
fn replace_keeping_comment(raw: &str, new_value: &str, marker: char) -> String {
    let value_end = match raw.find(marker) {
        Some(idx) => raw[..idx].trim_end().len(),
        None => raw.len(),
    };
    format!("{}{}", new_value, &raw[value_end..])
}

/// A sectioned key-value file held in memory.
///
/// Section names are always compared case-sensitively. Keys follow
/// [`StoreOptions::ignore_case`].
#[derive(Debug, Clone)]
pub struct SectionedStore {
    path: Option<PathBuf>,
    options: StoreOptions,
    sections: LinkedHashMap<String, Section>,
}

impl SectionedStore {
    /// Open a store with default options. A missing or unreadable file gives an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_options(path, StoreOptions::default())
    }

    pub fn with_options<P: AsRef<Path>>(path: P, options: StoreOptions) -> Self {
        let mut store = SectionedStore {
            path: Some(path.as_ref().to_path_buf()),
            options,
            sections: LinkedHashMap::new(),
        };
        store.reload();
        store
    }

    /// Build a store from text. The result has no backing file.
    pub fn parse(content: &str, options: StoreOptions) -> Self {
        let mut store = SectionedStore {
            path: None,
            options,
            sections: LinkedHashMap::new(),
        };
        store.load_lines(content.lines());
        store
    }

    /// Discard the in-memory model and load the backing file again.
    pub fn reload(&mut self) {
        self.sections.clear();
        if let Some(path) = self.path.clone() {
            let lines = load_lines_lenient(&path);
            self.load_lines(lines.iter().map(String::as_str));
            log::debug!(
                "Loaded {} section(s) from {}",
                self.sections.len(),
                path.display()
            );
        }
    }

    fn load_lines<'a, I: IntoIterator<Item = &'a str>>(&mut self, lines: I) {
        let ignore_case = self.options.ignore_case;
        let mut current_name = String::from(DEFAULT_SECTION);
        let mut current = Section::default();

        for line in lines {
            if let (Some(open), Some(close)) = (line.find('['), line.find(']')) {
                if close <= open + 1 {
                    continue;
                }
                let name = line[open + 1..close].to_string();
                let finished = mem::replace(&mut current_name, name);
                self.flush_section(finished, mem::take(&mut current));
            } else if let Some((key, value)) = split_property(line, self.options.separator) {
                current.push_property(key, value, ignore_case);
            } else if let Some(idx) = line.find(self.options.comment) {
                current.push_comment(&line[idx..]);
            }
        }
        self.flush_section(current_name, current);
    }

    /// Store a parsed block. A repeated header replaces the earlier block in place.
    fn flush_section(&mut self, name: String, section: Section) {
        if section.is_empty() {
            return;
        }
        if let Some(existing) = self.sections.get_mut(&name) {
            *existing = section;
        } else {
            self.sections.insert(name, section);
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Get the value of `key` in `section` without its inline comment, or an
    /// empty string if either is absent.
    pub fn get(&self, section: &str, key: &str) -> String {
        self.sections
            .get(section)
            .and_then(|s| s.property(key, self.options.ignore_case))
            .map(|p| strip_comment(&p.value, self.options.comment).to_string())
            .unwrap_or_default()
    }

    /// [`get`](Self::get) against the default section.
    pub fn get_key(&self, key: &str) -> String {
        self.get(DEFAULT_SECTION, key)
    }

    /// Set `key` in `section`, creating the section if needed. `None` deletes the key.
    ///
    /// Overwriting an existing key keeps its inline comment:
    /// `a=1 # note` set to `2` becomes `a=2 # note`.
    pub fn set(&mut self, section: &str, key: &str, value: Option<&str>) -> Result<()> {
        let ignore_case = self.options.ignore_case;
        let marker = self.options.comment;
        match value {
            Some(value) => {
                if !self.sections.contains_key(section) {
                    self.sections.insert(section.to_string(), Section::default());
                }
                if let Some(target) = self.sections.get_mut(section) {
                    if let Some(property) = target.property_mut(key, ignore_case) {
                        property.value = replace_keeping_comment(&property.value, value, marker);
                    } else {
                        target.push_property(key, value, ignore_case);
                    }
                }
            }
            None => {
                if let Some(target) = self.sections.get_mut(section) {
                    target.remove_property(key, ignore_case);
                }
            }
        }
        self.autosave()
    }

    /// [`set`](Self::set) against the default section.
    pub fn set_key(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        self.set(DEFAULT_SECTION, key, value)
    }

    /// Remove a section with all its properties and comments.
    pub fn delete_section(&mut self, section: &str) -> Result<()> {
        if self.sections.remove(section).is_some() {
            self.autosave()?;
        }
        Ok(())
    }

    pub fn section_exists(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Named sections in file order. The default section is not listed.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections
            .keys()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn contains_key(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| s.position(key, self.options.ignore_case).is_some())
    }

    /// Property keys of `section` as written, in file order.
    pub fn keys<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|s| s.entries.iter())
            .filter_map(|entry| match entry {
                Entry::Property(p) => Some(p.key.as_str()),
                Entry::Comment(_) => None,
            })
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

    fn write_entries(&self, f: &mut fmt::Formatter<'_>, section: &Section) -> fmt::Result {
        for entry in &section.entries {
            match entry {
                Entry::Property(p) => {
                    write!(f, "{}{}{}{}", p.key, self.options.separator, p.value, LINE_END)?
                }
                Entry::Comment(text) => write!(f, "{}{}", text, LINE_END)?,
            }
        }
        f.write_str(LINE_END)
    }
}

impl fmt::Display for SectionedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(default) = self.sections.get(DEFAULT_SECTION) {
            self.write_entries(f, default)?;
        }
        for (name, section) in self.sections.iter() {
            if name.is_empty() {
                continue;
            }
            write!(f, "[{}]{}", name, LINE_END)?;
            self.write_entries(f, section)?;
        }
        Ok(())
    }
}
