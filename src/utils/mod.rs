pub mod base64;
pub mod file;
pub mod key;
pub mod string;

// Re-export common utilities
pub use self::base64::{decode_b64, decode_b64_utf8, encode_b64, encode_b64_utf8};
pub use string::{add_quotes, remove_quotes};
