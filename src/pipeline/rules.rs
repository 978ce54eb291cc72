//! Transform rule selection

use std::path::Path;

use super::error::BuildError;
use crate::config::{slash_path, TransformRule};

/// Extensions treated as plain JavaScript when no rule matches
pub const PLAIN_SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// How a file will be transformed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// The first matching rule and its index
    Rule(usize, &'a TransformRule),
    /// No rule matched, but the file is plain JavaScript
    Plain,
}

/// Ordered transform rules
#[derive(Debug, Clone, Copy)]
pub struct RuleSet<'a> {
    rules: &'a [TransformRule],
}

impl<'a> RuleSet<'a> {
    /// Wrap the descriptor's rules
    pub fn new(rules: &'a [TransformRule]) -> Self {
        Self { rules }
    }

    /// First rule whose test matches and whose exclusion does not
    ///
    /// # Examples
    ///
    /// ```
    /// use assetpipe::config::{Pattern, TransformRule, TransformStep};
    /// use assetpipe::pipeline::rules::RuleSet;
    /// use std::path::Path;
    ///
    /// let rules = vec![
    ///     TransformRule::new(Pattern::new(r"\.svg$").unwrap(), vec![TransformStep::new("file")]),
    ///     TransformRule::new(Pattern::new(r"\.(png|svg)$").unwrap(), vec![TransformStep::new("url")]),
    /// ];
    /// let (index, _) = RuleSet::new(&rules).select(Path::new("/p/logo.svg")).unwrap();
    /// assert_eq!(index, 0);
    /// ```
    pub fn select(&self, path: &Path) -> Option<(usize, &'a TransformRule)> {
        let path = slash_path(path);
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.applies_to(&path))
    }

    /// Rule for `path`, falling back to plain JavaScript
    pub fn resolve(&self, path: &Path) -> Result<Selection<'a>, BuildError> {
        if let Some((index, rule)) = self.select(path) {
            return Ok(Selection::Rule(index, rule));
        }
        let plain = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PLAIN_SCRIPT_EXTENSIONS.contains(&ext));
        if plain {
            Ok(Selection::Plain)
        } else {
            Err(BuildError::transform(path, "no transform rule matches this file"))
        }
    }
}
