//! Text-file backed stores

pub mod flat;
pub mod sectioned;

pub use flat::FlatStore;
pub use sectioned::{SectionedStore, DEFAULT_SECTION};

/// Line terminator written by every text store.
pub const LINE_END: &str = "\r\n";

/// A key as written in the file together with its raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Property {
    pub key: String,
    pub value: String,
}

/// Split a line at the first `separator` into a trimmed key and value.
pub(crate) fn split_property(line: &str, separator: char) -> Option<(&str, &str)> {
    line.split_once(separator)
        .map(|(key, value)| (key.trim(), value.trim()))
}
