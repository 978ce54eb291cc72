//! Parsed views of module source
//!
//! Modules are parsed as CommonJS scripts with `oxc`. The rewriting passes
//! work from what the parser reports: byte ranges of literals and comments,
//! `require("...")` call sites, and references to defined globals.

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Argument, CallExpression, Expression, Program, RegExpLiteral, StringLiteral, TemplateLiteral,
};
use oxc::ast::visit::walk;
use oxc::ast::Visit;
use oxc::parser::{ParseOptions, Parser};
use oxc::span::SourceType;
use thiserror::Error;

/// Source that does not parse as JavaScript
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not valid JavaScript: {message}")]
pub struct SyntaxError {
    /// First parser diagnostic
    pub message: String,
}

/// Parse `src` as a CommonJS module body and hand the program to `inspect`
///
/// A top-level `return` is allowed, as it is inside a module factory.
pub fn with_program<T>(
    src: &str,
    inspect: impl FnOnce(&Program<'_>) -> T,
) -> Result<T, SyntaxError> {
    let allocator = Allocator::default();
    let options = ParseOptions {
        allow_return_outside_function: true,
        ..ParseOptions::default()
    };
    let ret = Parser::new(&allocator, src, SourceType::default().with_module(false))
        .with_options(options)
        .parse();
    if let Some(error) = ret.errors.first() {
        return Err(SyntaxError {
            message: error.to_string(),
        });
    }
    if ret.panicked {
        return Err(SyntaxError {
            message: "unrecoverable parse error".to_string(),
        });
    }
    Ok(inspect(&ret.program))
}

/// Kind of a source segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Plain code
    Code,
    /// `// ...` up to (not including) the newline
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// Single- or double-quoted string literal
    String,
    /// Literal part of a template, including its backticks and `${` / `}` delimiters
    Template,
    /// Regular expression literal with flags
    Regex,
}

/// A byte range of the source and its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Segment kind
    pub kind: SegmentKind,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Segment {
    /// Source text of this segment
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    /// Whether the segment is a comment
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, SegmentKind::LineComment | SegmentKind::BlockComment)
    }

    /// Whether the segment's bytes are literal content that must not change
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::String | SegmentKind::Template | SegmentKind::Regex
        )
    }
}

/// Split `src` into segments covering it completely and in order
///
/// # Examples
///
/// ```
/// use assetpipe::pipeline::syntax::{segments, SegmentKind};
///
/// let src = "var a = \"x\"; // note\n";
/// let kinds: Vec<SegmentKind> = segments(src).unwrap().iter().map(|s| s.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         SegmentKind::Code,
///         SegmentKind::String,
///         SegmentKind::Code,
///         SegmentKind::LineComment,
///         SegmentKind::Code,
///     ]
/// );
/// ```
pub fn segments(src: &str) -> Result<Vec<Segment>, SyntaxError> {
    let mut literals = with_program(src, |program| {
        let mut collector = LiteralCollector::default();
        collector.visit_program(program);
        collector.literals
    })?;
    literals.sort_by_key(|seg| seg.start);

    let mut out = Vec::with_capacity(literals.len() * 2 + 1);
    let mut offset = 0;
    for literal in literals {
        split_comments(src, offset, literal.start, &mut out);
        out.push(literal);
        offset = literal.end;
    }
    split_comments(src, offset, src.len(), &mut out);
    Ok(out)
}

/// Split the non-literal range `start..end` into code and comments
///
/// Outside literals, `//` and `/*` always open a comment.
fn split_comments(src: &str, start: usize, end: usize, out: &mut Vec<Segment>) {
    let bytes = src.as_bytes();
    let mut push = |kind, from: usize, to: usize| {
        if from < to {
            out.push(Segment {
                kind,
                start: from,
                end: to,
            });
        }
    };

    let mut code_start = start;
    let mut i = start;
    while i + 1 < end {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'/') => {
                let close = bytes[i..end]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(end, |p| i + p);
                push(SegmentKind::Code, code_start, i);
                push(SegmentKind::LineComment, i, close);
                i = close;
                code_start = i;
            }
            (b'/', b'*') => {
                let close = bytes[i + 2..end]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(end, |p| i + 2 + p + 2);
                push(SegmentKind::Code, code_start, i);
                push(SegmentKind::BlockComment, i, close);
                i = close;
                code_start = i;
            }
            _ => i += 1,
        }
    }
    push(SegmentKind::Code, code_start, end);
}

#[derive(Default)]
struct LiteralCollector {
    literals: Vec<Segment>,
}

impl LiteralCollector {
    fn push(&mut self, kind: SegmentKind, start: u32, end: u32) {
        self.literals.push(Segment {
            kind,
            start: start as usize,
            end: end as usize,
        });
    }
}

impl<'a> Visit<'a> for LiteralCollector {
    fn visit_string_literal(&mut self, it: &StringLiteral<'a>) {
        self.push(SegmentKind::String, it.span.start, it.span.end);
    }

    fn visit_reg_exp_literal(&mut self, it: &RegExpLiteral<'a>) {
        self.push(SegmentKind::Regex, it.span.start, it.span.end);
    }

    fn visit_template_literal(&mut self, it: &TemplateLiteral<'a>) {
        // Element spans hold the raw text only
        let last = it.quasis.len().saturating_sub(1);
        for (index, quasi) in it.quasis.iter().enumerate() {
            let close = if index == last { 1 } else { 2 };
            self.push(
                SegmentKind::Template,
                quasi.span.start - 1,
                quasi.span.end + close,
            );
        }
        walk::walk_template_literal(self, it);
    }
}

/// A `require("literal")` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireCall {
    /// Start of the call expression
    pub start: usize,
    /// End of the call expression (exclusive)
    pub end: usize,
    /// Decoded specifier
    pub specifier: String,
}

/// Every `require("literal")` call in `src`, in source order
///
/// Member calls such as `loader.require(...)` and calls with anything but a
/// single string literal argument are not included.
pub fn require_calls(src: &str) -> Result<Vec<RequireCall>, SyntaxError> {
    let mut calls = with_program(src, |program| {
        let mut collector = RequireCollector::default();
        collector.visit_program(program);
        collector.calls
    })?;
    calls.sort_by_key(|call| call.start);
    Ok(calls)
}

#[derive(Default)]
struct RequireCollector {
    calls: Vec<RequireCall>,
}

impl<'a> Visit<'a> for RequireCollector {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let (Expression::Identifier(callee), [Argument::StringLiteral(arg)]) =
            (&it.callee, it.arguments.as_slice())
        {
            if callee.name.as_str() == "require" {
                self.calls.push(RequireCall {
                    start: it.span.start as usize,
                    end: it.span.end as usize,
                    specifier: arg.value.as_str().to_string(),
                });
            }
        }
        walk::walk_call_expression(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(src: &str) -> Vec<(SegmentKind, &str)> {
        segments(src)
            .unwrap()
            .into_iter()
            .map(|s| (s.kind, s.text(src)))
            .collect()
    }

    #[test]
    fn test_segments_cover_source_without_gaps() {
        let src = "a = `x${b + '}'}y` / 2; /* c */ r = /[/]/g.test(s) // end";
        let segs = segments(src).unwrap();
        let mut offset = 0;
        for seg in &segs {
            assert_eq!(seg.start, offset);
            offset = seg.end;
        }
        assert_eq!(offset, src.len());
    }

    #[test]
    fn test_division_is_not_a_regex() {
        let src = "var half = total / 2 / count;";
        assert_eq!(kinds_and_text(src), vec![(SegmentKind::Code, src)]);
    }

    #[test]
    fn test_division_after_postfix_increment() {
        let src = "x = i++ / 2 / y;";
        assert_eq!(kinds_and_text(src), vec![(SegmentKind::Code, src)]);
    }

    #[test]
    fn test_regex_after_closing_paren() {
        let src = "if (ok) /[/*]/.test(s);";
        let segs = kinds_and_text(src);
        assert_eq!(segs[1], (SegmentKind::Regex, "/[/*]/"));
        assert!(segs.iter().all(|(kind, _)| !matches!(kind, SegmentKind::BlockComment)));
    }

    #[test]
    fn test_regex_after_operator_and_return() {
        let segs = kinds_and_text("var re = /ab+c\\/d/gi; x");
        assert_eq!(segs[1], (SegmentKind::Regex, "/ab+c\\/d/gi"));
        let segs = kinds_and_text("return /x/.test(s)");
        assert_eq!(segs[1], (SegmentKind::Regex, "/x/"));
    }

    #[test]
    fn test_escaped_quotes_stay_inside_string() {
        let segs = kinds_and_text(r#"s = "say \"hi\"" + t"#);
        assert_eq!(segs[1], (SegmentKind::String, r#""say \"hi\"""#));
        assert_eq!(segs[2], (SegmentKind::Code, " + t"));
    }

    #[test]
    fn test_template_substitution_is_code() {
        let src = "`a ${__DEV__ ? 'x' : 'y'} b`";
        let segs = kinds_and_text(src);
        assert_eq!(segs[0], (SegmentKind::Template, "`a ${"));
        assert_eq!(segs[1], (SegmentKind::Code, "__DEV__ ? "));
        assert_eq!(segs.last().unwrap(), &(SegmentKind::Template, "} b`"));
    }

    #[test]
    fn test_comments_are_split_out() {
        let segs = kinds_and_text("a; // one\n/* two */ b");
        assert_eq!(segs[1], (SegmentKind::LineComment, "// one"));
        assert_eq!(segs[3], (SegmentKind::BlockComment, "/* two */"));
    }

    #[test]
    fn test_invalid_source_is_a_syntax_error() {
        for src in ["'open", "`open ${x", "/* open", "var = ;"] {
            assert!(segments(src).is_err(), "{src}");
        }
    }

    #[test]
    fn test_top_level_return_is_accepted() {
        assert!(segments("return module.exports;").is_ok());
    }

    #[test]
    fn test_non_ascii_text_is_sliced_safely() {
        let src = "var s = 'héllo' /* ünï */; ç / 2";
        for seg in segments(src).unwrap() {
            let _ = seg.text(src);
        }
    }

    #[test]
    fn test_require_calls_with_literal_argument() {
        let src = concat!(
            "var a = require('./a');\n",
            "var b = require ( \"./b\\u0021\" );\n",
            "loader.require('./c'); myrequire('./d'); require(name);\n",
            "// require('./e')\n",
            "f(require('./g'));\n",
        );
        let calls = require_calls(src).unwrap();
        let specifiers: Vec<&str> = calls.iter().map(|c| c.specifier.as_str()).collect();
        assert_eq!(specifiers, vec!["./a", "./b!", "./g"]);
        assert_eq!(&src[calls[0].start..calls[0].end], "require('./a')");
        assert_eq!(&src[calls[1].start..calls[1].end], "require ( \"./b\\u0021\" )");
    }
}
