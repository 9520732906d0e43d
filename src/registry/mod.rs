//! Registry-style hierarchical store
//!
//! Values live in a tree of named keys. A [`HierarchicalStore`] is anchored at
//! `Software\<company>\<product>` under a user or machine root and reads and
//! writes through to the backend on every call; nothing is buffered.
//!
//! The tree itself is provided by a [`RegistryBackend`]. [`MemoryRegistry`]
//! keeps it in process memory; on Windows, `WindowsRegistry` talks to the
//! system registry.

pub mod memory;
#[cfg(windows)]
pub mod windows;

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub use memory::{MemoryKey, MemoryRegistry};
#[cfg(windows)]
pub use windows::{WinKey, WindowsRegistry};

/// Separator between key names in a textual subkey path.
pub const PATH_SEPARATOR: char = '\\';

/// Key created under the selected root before the company and product keys.
pub const SOFTWARE_KEY: &str = "Software";

/// Root a store is anchored under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryNode {
    #[default]
    CurrentUser,
    LocalMachine,
}

/// An open key. Dropping the handle releases it.
pub trait RegistryKey: Sized {
    /// Open the child `name`, creating it if absent.
    fn create_subkey(&self, name: &str) -> Result<Self>;

    /// Open the child `name`, or `None` if it does not exist.
    fn open_subkey(&self, name: &str) -> Result<Option<Self>>;

    /// Read a value rendered as text, or `None` if absent.
    fn get_value(&self, name: &str) -> Result<Option<String>>;

    fn set_value(&self, name: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting an absent value is not an error.
    fn delete_value(&self, name: &str) -> Result<()>;

    /// Delete a child key that has no children of its own.
    fn delete_subkey(&self, name: &str) -> Result<()>;

    /// Delete a child key and everything below it.
    fn delete_subkey_tree(&self, name: &str) -> Result<()>;
}

/// Source of root keys.
pub trait RegistryBackend {
    type Key: RegistryKey;

    fn root(&self, node: RegistryNode) -> Result<Self::Key>;
}

/// Location of a key below a store's base key.
///
/// Built either from a `\`-separated string or from a sequence of names; both
/// forms address the same key. Empty names are dropped, so `""` is the base
/// key itself and `a\b\` equals `a\b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubkeyPath(Vec<String>);

impl SubkeyPath {
    /// The base key.
    pub fn root() -> Self {
        SubkeyPath(Vec::new())
    }

    pub fn parse(path: &str) -> Self {
        Self::from_names(path.split(PATH_SEPARATOR))
    }

    fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SubkeyPath(
            names
                .into_iter()
                .filter(|name| !name.as_ref().is_empty())
                .map(|name| name.as_ref().to_string())
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SubkeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = PATH_SEPARATOR.to_string();
        f.write_str(&self.0.join(&separator))
    }
}

impl From<&str> for SubkeyPath {
    fn from(path: &str) -> Self {
        SubkeyPath::parse(path)
    }
}

impl From<String> for SubkeyPath {
    fn from(path: String) -> Self {
        SubkeyPath::parse(&path)
    }
}

impl From<&String> for SubkeyPath {
    fn from(path: &String) -> Self {
        SubkeyPath::parse(path)
    }
}

impl From<&[&str]> for SubkeyPath {
    fn from(names: &[&str]) -> Self {
        SubkeyPath::from_names(names)
    }
}

impl<const N: usize> From<[&str; N]> for SubkeyPath {
    fn from(names: [&str; N]) -> Self {
        SubkeyPath::from_names(names)
    }
}

impl From<Vec<&str>> for SubkeyPath {
    fn from(names: Vec<&str>) -> Self {
        SubkeyPath::from_names(names)
    }
}

impl From<Vec<String>> for SubkeyPath {
    fn from(names: Vec<String>) -> Self {
        SubkeyPath::from_names(names)
    }
}

impl From<&SubkeyPath> for SubkeyPath {
    fn from(path: &SubkeyPath) -> Self {
        path.clone()
    }
}

/// Either the store's base key or a handle opened below it.
enum KeyRef<'a, K> {
    Base(&'a K),
    Owned(K),
}

impl<K> Deref for KeyRef<'_, K> {
    type Target = K;

    fn deref(&self) -> &K {
        match self {
            KeyRef::Base(key) => key,
            KeyRef::Owned(key) => key,
        }
    }
}

/// Configuration values kept under `Software\<company>\<product>`.
///
/// The base key stays open for the lifetime of the store and is released
/// when the store is dropped. Handles opened while walking a subkey path are
/// released before each call returns.
pub struct HierarchicalStore<K: RegistryKey> {
    base: K,
    company: Option<String>,
    product: String,
    node: RegistryNode,
}

impl<K: RegistryKey> HierarchicalStore<K> {
    /// Open (creating as needed) `Software`, then `company` if given, then
    /// `product` under the `node` root of `backend`.
    pub fn open<B>(
        backend: &B,
        company: Option<&str>,
        product: &str,
        node: RegistryNode,
    ) -> Result<Self>
    where
        B: RegistryBackend<Key = K>,
    {
        let root = backend.root(node)?;
        let mut base = root.create_subkey(SOFTWARE_KEY)?;
        if let Some(company) = company {
            base = base.create_subkey(company)?;
        }
        base = base.create_subkey(product)?;
        log::debug!(
            "Opened {:?} store {}\\{}{}",
            node,
            SOFTWARE_KEY,
            company.map(|c| format!("{}\\", c)).unwrap_or_default(),
            product
        );
        Ok(HierarchicalStore {
            base,
            company: company.map(str::to_string),
            product: product.to_string(),
            node,
        })
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn node(&self) -> RegistryNode {
        self.node
    }

    /// Walk `path` without creating anything. `None` if any key is missing.
    fn open_path(&self, path: &SubkeyPath) -> Result<Option<KeyRef<'_, K>>> {
        let mut current: Option<K> = None;
        for name in path.segments() {
            let parent = current.as_ref().unwrap_or(&self.base);
            let child = parent.open_subkey(name)?;
            match child {
                Some(child) => current = Some(child),
                None => return Ok(None),
            }
        }
        Ok(Some(match current {
            Some(key) => KeyRef::Owned(key),
            None => KeyRef::Base(&self.base),
        }))
    }

    /// Walk `path`, creating every missing key on the way.
    fn create_path(&self, path: &SubkeyPath) -> Result<KeyRef<'_, K>> {
        let mut current: Option<K> = None;
        for name in path.segments() {
            let parent = current.as_ref().unwrap_or(&self.base);
            let child = parent.create_subkey(name)?;
            current = Some(child);
        }
        Ok(match current {
            Some(key) => KeyRef::Owned(key),
            None => KeyRef::Base(&self.base),
        })
    }

    /// Read `name` from the key at `path`. A missing key or value reads as an
    /// empty string.
    pub fn get<P: Into<SubkeyPath>>(&self, path: P, name: &str) -> Result<String> {
        let path = path.into();
        match self.open_path(&path)? {
            Some(key) => Ok(key.get_value(name)?.unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    /// [`get`](Self::get) directly under the base key.
    pub fn get_key(&self, name: &str) -> Result<String> {
        self.get(SubkeyPath::root(), name)
    }

    /// Write `name` at `path`, creating missing keys. `None` deletes the value.
    pub fn set<P>(&self, path: P, name: &str, value: Option<&str>) -> Result<()>
    where
        P: Into<SubkeyPath>,
    {
        let path = path.into();
        let key = self.create_path(&path)?;
        match value {
            Some(value) => key.set_value(name, value),
            None => key.delete_value(name),
        }
    }

    /// [`set`](Self::set) directly under the base key.
    pub fn set_key(&self, name: &str, value: Option<&str>) -> Result<()> {
        self.set(SubkeyPath::root(), name, value)
    }

    fn parent_for_delete(&self, parent: &SubkeyPath) -> Result<KeyRef<'_, K>> {
        self.open_path(parent)?
            .ok_or_else(|| ConfigError::KeyNotFound(parent.to_string()))
    }

    /// Delete the childless key `name` below `parent`.
    pub fn delete_subkey_in<P: Into<SubkeyPath>>(&self, parent: P, name: &str) -> Result<()> {
        let parent = parent.into();
        self.parent_for_delete(&parent)?.delete_subkey(name)
    }

    /// Delete the childless key `name` directly below the base key.
    pub fn delete_subkey(&self, name: &str) -> Result<()> {
        self.base.delete_subkey(name)
    }

    /// Delete `name` below `parent` together with all of its descendants.
    pub fn delete_subkey_tree_in<P>(&self, parent: P, name: &str) -> Result<()>
    where
        P: Into<SubkeyPath>,
    {
        let parent = parent.into();
        self.parent_for_delete(&parent)?.delete_subkey_tree(name)
    }

    /// Delete `name` directly below the base key together with its descendants.
    pub fn delete_subkey_tree(&self, name: &str) -> Result<()> {
        self.base.delete_subkey_tree(name)
    }
}
