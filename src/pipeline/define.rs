//! Compile-time constant substitution
//!
//! References to defined identifier paths are replaced by the literal text
//! verbatim. Only expressions the parser reports as identifier references or
//! static member chains are touched, so strings, comments, template text,
//! property names and declarations keep their spelling.

use indexmap::IndexMap;
use oxc::ast::ast::{
    Expression, IdentifierReference, ObjectProperty, StaticMemberExpression,
};
use oxc::ast::visit::walk;
use oxc::ast::Visit;

use super::syntax::{with_program, SyntaxError};
use crate::config::BuildConfig;

/// Defined globals, ready to apply
///
/// # Examples
///
/// ```
/// use assetpipe::pipeline::define::DefineTable;
///
/// let table = DefineTable::new([("__DEV__", "false"), ("process.env.NODE_ENV", "\"production\"")]);
/// assert_eq!(
///     table.apply("if (__DEV__ || process.env.NODE_ENV !== 'x') {}").unwrap(),
///     "if (false || \"production\" !== 'x') {}"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefineTable {
    entries: IndexMap<String, String>,
}

impl DefineTable {
    /// Table from key/literal pairs
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Table for a descriptor, including the mode's `process.env.NODE_ENV`
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            entries: config.effective_defines(),
        }
    }

    /// Number of defined keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is defined
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute every defined reference in `code`
    pub fn apply(&self, code: &str) -> Result<String, SyntaxError> {
        if self.entries.is_empty() {
            return Ok(code.to_string());
        }

        let mut edits = with_program(code, |program| {
            let mut finder = ReferenceFinder {
                table: self,
                src: code,
                edits: Vec::new(),
            };
            finder.visit_program(program);
            finder.edits
        })?;
        edits.sort_by_key(|edit| edit.0);

        let mut out = String::with_capacity(code.len());
        let mut copied = 0;
        for (start, end, replacement) in edits {
            out.push_str(&code[copied..start]);
            out.push_str(&replacement);
            copied = end;
        }
        out.push_str(&code[copied..]);
        Ok(out)
    }

    fn literal(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Collects `(start, end, replacement)` edits
struct ReferenceFinder<'t> {
    table: &'t DefineTable,
    src: &'t str,
    edits: Vec<(usize, usize, String)>,
}

impl ReferenceFinder<'_> {
    fn replace(&mut self, start: u32, end: u32, replacement: String) {
        self.edits.push((start as usize, end as usize, replacement));
    }
}

impl<'a> Visit<'a> for ReferenceFinder<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if let Some(literal) = self.table.literal(it.name.as_str()) {
            self.replace(it.span.start, it.span.end, literal.to_string());
        }
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        let text = &self.src[it.span.start as usize..it.span.end as usize];
        if let Some(literal) = self.table.literal(text) {
            self.replace(it.span.start, it.span.end, literal.to_string());
            return;
        }
        walk::walk_static_member_expression(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        // `{ __DEV__ }` keeps its key
        if it.shorthand {
            if let Expression::Identifier(ident) = &it.value {
                let name = ident.name.as_str();
                if let Some(literal) = self.table.literal(name) {
                    self.replace(it.span.start, it.span.end, format!("{}: {}", name, literal));
                    return;
                }
            }
        }
        walk::walk_object_property(self, it);
    }
}
