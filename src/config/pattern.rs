//! Regex-backed file matchers used by transform and lint rules

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// A compiled file-path matcher.
///
/// Patterns are regular expressions tested against the module's absolute path
/// with `/` separators. Inline flags such as `(?i)` are supported.
///
/// # Examples
///
/// ```
/// use assetpipe::config::Pattern;
/// use std::path::Path;
///
/// let pattern = Pattern::new(r"(?i)\.(jpe?g|png)$").unwrap();
/// assert!(pattern.matches(Path::new("/app/src/img/Logo.PNG")));
/// assert!(!pattern.matches(Path::new("/app/src/js/app.js")));
/// ```
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern from its regex source
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// The pattern as written in the descriptor
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test a path, normalizing separators to `/`
    pub fn matches(&self, path: &Path) -> bool {
        self.matches_str(&slash_path(path))
    }

    /// Test an already-normalized path string
    pub fn matches_str(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Render a path with forward slashes regardless of platform
pub fn slash_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source.clone()).map_err(|e| {
            serde::de::Error::custom(format!("invalid pattern '{}': {}", source, e))
        })
    }
}
