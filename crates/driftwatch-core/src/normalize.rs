//! Device-name normalization.
//!
//! Maps a raw display name to the canonical key used to match records
//! across services despite casing and length differences. Pure and
//! deterministic; the most directly testable unit in the crate.

/// Default maximum width of a normalized comparison key, in characters.
pub const MAX_NAME_WIDTH: usize = 15;

/// Normalize a raw device name with the default width.
pub fn normalize(raw: &str) -> Option<String> {
    normalize_with(raw, MAX_NAME_WIDTH)
}

/// Normalize a raw device name: trim surrounding whitespace, lowercase,
/// truncate to `max_len` characters.
///
/// Truncation counts characters, not bytes, so multi-byte names never
/// split a code point. Truncation can expose interior whitespace at the
/// end of the key (`"ABCDEFGHIJKLMN Z"` cut at 15), which is trimmed
/// again so the function stays idempotent on its own output. Returns
/// `None` for empty or whitespace-only input; such records are excluded
/// from matching, not treated as errors. No other transformation is
/// applied (no diacritic folding, no punctuation stripping).
pub fn normalize_with(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key: String = trimmed.to_lowercase().chars().take(max_len).collect();
    Some(key.trim_end().to_string())
}
