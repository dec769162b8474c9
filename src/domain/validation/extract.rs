//! Candidate key extraction from pasted text
//!
//! One candidate per line: the first substring matching the key pattern. A
//! key embedded in surrounding text still matches; a line without a full
//! pattern token yields nothing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Key shape: required literal prefix followed by URL-safe token characters.
static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tvly-dev-[A-Za-z0-9_-]+").expect("valid key pattern"));

/// Result of extracting candidate keys from pasted text. `keys` preserves
/// input order and repeated occurrences; deduplication happens when the row
/// set is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeys {
    /// Total lines, including blank and non-matching ones
    pub input_lines: usize,
    /// Lines that yielded a key match (`keys.len()`)
    pub valid_lines: usize,
    /// Matched keys in input order, duplicates included
    pub keys: Vec<String>,
}

/// Extract the first key-shaped token from a single line, if any.
pub fn extract_key_from_line(line: &str) -> Option<&str> {
    API_KEY_PATTERN.find(line).map(|m| m.as_str())
}

/// Split pasted text into lines and extract at most one candidate key per
/// line.
pub fn parse_key_input(text: &str) -> ParsedKeys {
    let mut input_lines = 0;
    let mut keys = Vec::new();

    for line in text.lines() {
        input_lines += 1;
        if let Some(key) = extract_key_from_line(line) {
            keys.push(key.to_owned());
        }
    }

    ParsedKeys {
        input_lines,
        valid_lines: keys.len(),
        keys,
    }
}
