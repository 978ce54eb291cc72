//! Assertion helpers for generated output

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Read a generated text file, panicking with its path when it is missing
pub fn read_output(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("expected output {}: {}", path.display(), e))
}

/// Assert that `needles` occur in `haystack` in the given order
///
/// # Examples
///
/// ```ignore
/// assert_in_order("a b c", &["a", "c"]);
/// ```
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(offset) => from += offset + needle.len(),
            None => panic!(
                "'{}' not found after byte {} in:\n{}",
                needle, from, haystack
            ),
        }
    }
}

/// Assert that nothing exists at `path`
pub fn assert_not_written(path: &Path) {
    assert!(!path.exists(), "{} should not exist", path.display());
}
