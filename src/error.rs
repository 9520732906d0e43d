use thiserror::Error;

/// Errors surfaced by the configuration stores.
///
/// Lookups never fail with "not found": absent keys, sections and subkeys
/// read as an empty string. Errors are reserved for writes and traversals.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded bytes are not valid UTF-16LE text")]
    InvalidText,

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Key has subkeys and cannot be deleted: {0}")]
    SubkeyHasChildren(String),

    #[error("Store has no backing file")]
    NoBackingFile,

    #[error("Registry call {op} failed with status {code}")]
    Registry { op: &'static str, code: i32 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
