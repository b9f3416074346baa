//! Cache Key Codec
//!
//! Deterministically encodes an ordered list of key parts plus producer
//! arguments into a canonical cache key string.

use std::fmt;

use serde::Serialize;

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Separator between key parts. Escaped when it appears inside a part.
const PART_SEPARATOR: char = ':';

/// Separator between the part list and the canonicalized arguments.
const ARGS_SEPARATOR: char = '#';

// == Cache Key ==
/// A canonical cache key.
///
/// Built only by [`encode`]; two logically identical calls (same parts,
/// structurally equal arguments) always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the encoded key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Encode ==
/// Encodes key parts and producer arguments into a canonical [`CacheKey`].
///
/// Parts are escaped and joined with `:`; the arguments are appended after
/// `#` as canonical JSON. Canonicalization goes through `serde_json::Value`,
/// whose object representation keeps keys sorted, so structurally equal
/// arguments encode identically regardless of field order.
///
/// # Errors
/// Returns [`CacheError::KeyEncoding`] if the arguments cannot be serialized
/// or the encoded key exceeds [`MAX_KEY_LENGTH`].
pub fn encode<A: Serialize>(parts: &[String], args: &A) -> Result<CacheKey> {
    let canonical_args = serde_json::to_value(args)
        .and_then(|value| serde_json::to_string(&value))
        .map_err(|e| CacheError::KeyEncoding(e.to_string()))?;

    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(PART_SEPARATOR);
        }
        escape_part_into(part, &mut key);
    }
    key.push(ARGS_SEPARATOR);
    key.push_str(&canonical_args);

    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::KeyEncoding(format!(
            "Encoded key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }

    Ok(CacheKey(key))
}

/// Escapes `\`, `:` and `#` inside a key part so that parts can never
/// collide with the separators or with argument content.
fn escape_part_into(part: &str, out: &mut String) {
    for c in part.chars() {
        if matches!(c, '\\' | PART_SEPARATOR | ARGS_SEPARATOR) {
            out.push('\\');
        }
        out.push(c);
    }
}
