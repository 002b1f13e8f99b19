//! Canonical join keys for matching records across layers.
//!
//! Settlement names arrive with inconsistent casing and stray whitespace
//! depending on which upstream form they were typed into, so every lookup
//! and aggregation goes through [`normalize_name`]. Administrative codes,
//! when present, provide a second key in a separate `code_` namespace so
//! a code can never collide with a settlement that happens to be named
//! like one.

use std::collections::BTreeSet;

/// Normalizes a display name into a canonical join key.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The code-namespace key for an administrative code.
#[must_use]
pub fn code_key(code: &str) -> String {
    format!("code_{}", code.trim().to_lowercase())
}

/// All join keys for a record: a name key and a code key, each when
/// available and non-blank. An empty set means the record is unkeyed and
/// cannot participate in aggregation.
#[must_use]
pub fn join_keys(name: Option<&str>, code: Option<&str>) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();

    if let Some(name) = name {
        let key = normalize_name(name);
        if !key.is_empty() {
            keys.insert(key);
        }
    }

    if let Some(code) = code {
        let trimmed = code.trim();
        if !trimmed.is_empty() {
            keys.insert(code_key(trimmed));
        }
    }

    keys
}
