//! Keyed access to human-editable configuration stores.
//!
//! - [`FlatStore`]: `key=value` lines, nothing else.
//! - [`SectionedStore`]: INI files with `[sections]`, inline comments and
//!   standalone comment lines, all preserved across rewrites.
//! - [`HierarchicalStore`]: values under `Software\<company>\<product>` in a
//!   registry-style key tree.
//!
//! Reads never fail for missing entries; they return an empty string. Writes
//! take `Option<&str>` and `None` deletes.

pub mod error;
pub mod options;
pub mod registry;
pub mod store;
pub mod utils;

pub use error::{ConfigError, Result};
pub use options::StoreOptions;
pub use registry::{
    HierarchicalStore, MemoryRegistry, RegistryBackend, RegistryKey, RegistryNode, SubkeyPath,
};
pub use store::{FlatStore, SectionedStore, DEFAULT_SECTION};
