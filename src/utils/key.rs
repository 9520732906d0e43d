//! Normalized-key lookup layer
//!
//! Stores keep the key as written for serialization and compare through a
//! folded form, so case-insensitive lookup does not depend on a special map type.

use std::borrow::Cow;

/// Fold `key` for comparison. Case-sensitive stores compare keys verbatim.
pub fn fold_key(key: &str, ignore_case: bool) -> Cow<'_, str> {
    if ignore_case {
        Cow::Owned(key.to_lowercase())
    } else {
        Cow::Borrowed(key)
    }
}
