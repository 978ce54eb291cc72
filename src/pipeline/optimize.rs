//! Post-assembly optimization passes

use std::collections::HashMap;
use xxhash_rust::xxh3::xxh3_64;

use super::engine::{Bundle, REQUIRE_FN};
use super::syntax::{segments, SegmentKind, SyntaxError};
use crate::config::OptimizationPass;

/// Apply `passes` to `bundle` in order
pub fn apply_passes(bundle: &mut Bundle, passes: &[OptimizationPass]) {
    for pass in passes {
        let before = bundle.modules.len();
        match pass {
            OptimizationPass::Dedupe => dedupe(bundle),
            OptimizationPass::Minify => minify(bundle),
            OptimizationPass::Merge => merge(bundle),
        }
        log::debug!(
            "{}: {} pass, {} -> {} modules",
            bundle.entry_name,
            pass,
            before,
            bundle.modules.len()
        );
    }
}

/// Point modules with byte-identical code at the first such module's factory
pub fn dedupe(bundle: &mut Bundle) {
    let mut first_by_hash: HashMap<u64, usize> = HashMap::new();
    let mut first_code: HashMap<usize, usize> = HashMap::new();

    for index in 0..bundle.modules.len() {
        let module = &bundle.modules[index];
        if module.alias_of.is_some() {
            continue;
        }
        let hash = xxh3_64(module.code.as_bytes());
        match first_by_hash.get(&hash) {
            Some(&first) if bundle.modules[first_code[&first]].code == module.code => {
                bundle.modules[index].alias_of = Some(first);
            }
            Some(_) => {}
            None => {
                first_by_hash.insert(hash, module.id);
                first_code.insert(module.id, index);
            }
        }
    }
}

/// Strip comments and indentation and drop blank lines from every module
///
/// A module that no longer parses is left as it is.
pub fn minify(bundle: &mut Bundle) {
    for module in &mut bundle.modules {
        let (code, kept) = match minify_code(&module.code) {
            Ok(minified) => minified,
            Err(e) => {
                log::warn!("{}: not minified, {}", module.path.display(), e);
                continue;
            }
        };
        module.line_origins = kept
            .iter()
            .map(|&line| {
                module
                    .line_origins
                    .get(line as usize)
                    .copied()
                    .unwrap_or(line)
            })
            .collect();
        module.code = code;
    }
}

/// Fold data modules with a single importing call site into their importer
pub fn merge(bundle: &mut Bundle) {
    let mut call_sites: HashMap<usize, usize> = HashMap::new();
    let mut importer_of: HashMap<usize, usize> = HashMap::new();
    for module in &bundle.modules {
        for &target in &module.requires {
            *call_sites.entry(target).or_default() += 1;
            importer_of.insert(target, module.id);
        }
    }
    let aliased: Vec<usize> = bundle.modules.iter().filter_map(|m| m.alias_of).collect();

    let foldable: Vec<(usize, usize, String)> = bundle
        .modules
        .iter()
        .filter(|m| m.id != 0 && !aliased.contains(&m.id))
        .filter(|m| call_sites.get(&m.id) == Some(&1))
        .filter_map(|m| {
            let literal = m.data_literal.clone()?;
            let importer = importer_of[&m.id];
            (importer != m.id).then_some((m.id, importer, literal))
        })
        .collect();

    for (id, importer, literal) in foldable {
        let call = format!("{}({})", REQUIRE_FN, id);
        let Some(host) = bundle.modules.iter_mut().find(|m| m.id == importer) else {
            continue;
        };
        if !host.code.contains(&call) {
            continue;
        }
        host.code = host.code.replacen(&call, &format!("({})", literal), 1);
        host.requires.retain(|&target| target != id);
        bundle.modules.retain(|m| m.id != id);
        log::debug!("{}: merged data module {} into {}", bundle.entry_name, id, importer);
    }
}

/// Minify one module's code
///
/// Returns the new code and, for each kept line, its 0-based line in `code`.
/// Line breaks are kept, so automatic semicolon insertion is unaffected.
///
/// # Examples
///
/// ```
/// use assetpipe::pipeline::optimize::minify_code;
///
/// let (code, lines) = minify_code("// header\n\nfunction f() {\n    return 1; /* one */\n}\n").unwrap();
/// assert_eq!(code, "function f() {\nreturn 1;\n}\n");
/// assert_eq!(lines, vec![2, 3, 4]);
/// ```
pub fn minify_code(code: &str) -> Result<(String, Vec<u32>), SyntaxError> {
    // Comments removed, block comments keeping their line breaks
    let mut stripped = String::with_capacity(code.len());
    let mut protected: Vec<bool> = Vec::with_capacity(code.len());
    for seg in segments(code)? {
        let text = seg.text(code);
        match seg.kind {
            SegmentKind::LineComment => {}
            SegmentKind::BlockComment => {
                let breaks = text.matches('\n').count();
                let replacement = if breaks == 0 {
                    " ".to_string()
                } else {
                    "\n".repeat(breaks)
                };
                protected.extend(std::iter::repeat_n(false, replacement.len()));
                stripped.push_str(&replacement);
            }
            SegmentKind::Code => {
                protected.extend(std::iter::repeat_n(false, text.len()));
                stripped.push_str(text);
            }
            SegmentKind::String | SegmentKind::Template | SegmentKind::Regex => {
                protected.extend(std::iter::repeat_n(true, text.len()));
                stripped.push_str(text);
            }
        }
    }

    let mut out = String::with_capacity(stripped.len());
    let mut kept = Vec::new();
    let mut start = 0;
    let mut starts_protected = false;
    let mut line_no = 0u32;

    while start <= stripped.len() {
        let end = stripped[start..]
            .find('\n')
            .map_or(stripped.len(), |offset| start + offset);
        let ends_protected = end < stripped.len() && protected[end];
        let raw = &stripped[start..end];

        let mut line = raw;
        if !starts_protected {
            line = line.trim_start_matches([' ', '\t']);
        }
        if !ends_protected {
            line = line.trim_end_matches([' ', '\t', '\r']);
        }
        if !line.is_empty() || starts_protected || ends_protected {
            out.push_str(line);
            out.push('\n');
            kept.push(line_no);
        }

        if end == stripped.len() {
            break;
        }
        starts_protected = ends_protected;
        start = end + 1;
        line_no += 1;
    }

    if !code.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    Ok((out, kept))
}
