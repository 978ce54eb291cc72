//! Bundle rendering
//!
//! A bundle is an IIFE holding a module cache, called with an object of
//! module factories keyed by registry id and an object of dedupe aliases.

use std::path::{Path, PathBuf};
use sugar_path::SugarPath;

use super::engine::{Bundle, Module, REQUIRE_FN};
use super::sourcemap::LineMap;
use super::transform::builtin::js_string;
use crate::config::{slash_path, SourceMapMode};

/// URL scheme for module sources in maps and `sourceURL` comments
pub const SOURCE_URL_PREFIX: &str = "assetpipe:///";

/// Rendered bundle text and, for external maps, the map to write beside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBundle {
    /// Bundle JavaScript
    pub code: String,
    /// Source map JSON for [`SourceMapMode::External`]
    pub map: Option<String>,
}

/// Path of the external map written next to `bundle_path`
pub fn map_path(bundle_path: &Path) -> PathBuf {
    let mut path = bundle_path.as_os_str().to_os_string();
    path.push(".map");
    PathBuf::from(path)
}

/// Name of a module's source relative to `root`
pub fn source_name(path: &Path, root: &Path) -> String {
    format!("{}{}", SOURCE_URL_PREFIX, slash_path(&path.relative(root)))
}

struct Writer {
    code: String,
    map: LineMap,
}

impl Writer {
    fn line(&mut self, text: &str, origin: Option<(u32, u32)>) {
        self.code.push_str(text);
        self.code.push('\n');
        self.map.add_line(origin);
    }
}

/// Render `bundle` with the runtime and the requested source map mode
pub fn render(bundle: &Bundle, mode: SourceMapMode, root: &Path) -> RenderedBundle {
    let file = bundle
        .output_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.js", bundle.entry_name));
    let mut w = Writer {
        code: String::new(),
        map: LineMap::new(&file),
    };

    w.line("(function (modules, aliases) {", None);
    w.line("  var cache = {};", None);
    w.line(&format!("  function {}(id) {{", REQUIRE_FN), None);
    w.line("    if (cache[id]) return cache[id].exports;", None);
    w.line("    var module = (cache[id] = { exports: {} });", None);
    w.line("    var factory = modules[id] || modules[aliases[id]];", None);
    w.line(
        &format!(
            "    factory.call(module.exports, module, module.exports, {});",
            REQUIRE_FN
        ),
        None,
    );
    w.line("    return module.exports;", None);
    w.line("  }", None);
    w.line(&format!("  return {}(0);", REQUIRE_FN), None);
    w.line("})({", None);

    let mut aliases = serde_json::Map::new();
    for module in &bundle.modules {
        if let Some(target) = module.alias_of {
            aliases.insert(module.id.to_string(), target.into());
            continue;
        }
        render_module(&mut w, module, mode, root);
    }

    let aliases = serde_json::Value::Object(aliases).to_string();
    w.line(&format!("}}, {});", aliases), None);

    let Writer { mut code, map } = w;
    let map = match mode {
        SourceMapMode::None | SourceMapMode::Eval => None,
        SourceMapMode::Inline => {
            let encoded = base64_simd::STANDARD.encode_to_string(map.into_json().as_bytes());
            code.push_str(&format!(
                "//# sourceMappingURL=data:application/json;charset=utf-8;base64,{}\n",
                encoded
            ));
            None
        }
        SourceMapMode::External => {
            code.push_str(&format!("//# sourceMappingURL={}.map\n", file));
            Some(map.into_json())
        }
    };

    RenderedBundle { code, map }
}

fn render_module(w: &mut Writer, module: &Module, mode: SourceMapMode, root: &Path) {
    let name = source_name(&module.path, root);
    w.line(
        &format!("/* {}: {} */", module.id, name.trim_start_matches(SOURCE_URL_PREFIX)),
        None,
    );
    w.line(
        &format!("{}: function (module, exports, {}) {{", module.id, REQUIRE_FN),
        None,
    );

    if mode == SourceMapMode::Eval {
        let body = format!("{}\n//# sourceURL={}", module.code, name);
        w.line(&format!("eval({});", js_string(&body)), None);
    } else {
        let source = w.map.add_source(&name, &module.source);
        for (i, line) in module.code.lines().enumerate() {
            let origin = module.line_origins.get(i).copied().unwrap_or(i as u32);
            w.line(line, Some((source, origin)));
        }
    }
    w.line("},", None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn bundle() -> Bundle {
        let entry = Module::new(
            0,
            PathBuf::from("/p/src/app.js"),
            "var a = __assetpipe_require__(1);\nconsole.log(a);\n".to_string(),
            Arc::from("var a = require('./a');\nconsole.log(a);\n"),
        );
        let a = Module::new(
            1,
            PathBuf::from("/p/src/a.js"),
            "module.exports = 1;\n".to_string(),
            Arc::from("module.exports = 1;\n"),
        );
        let mut dup = a.clone();
        dup.id = 2;
        dup.alias_of = Some(1);
        Bundle {
            entry_name: "app".to_string(),
            output_path: PathBuf::from("/p/dist/app.bundle.js"),
            modules: vec![entry, a, dup],
            assets: Vec::new(),
        }
    }

    #[test]
    fn test_runtime_registry_and_aliases() {
        let out = render(&bundle(), SourceMapMode::None, Path::new("/p"));
        assert!(out.code.starts_with("(function (modules, aliases) {\n"));
        assert!(out.code.contains("0: function (module, exports, __assetpipe_require__) {\nvar a"));
        assert!(out.code.contains("/* 1: src/a.js */"));
        assert!(!out.code.contains("2: function"));
        assert!(out.code.contains("}, {\"2\":1});\n"));
        assert!(!out.code.contains("sourceMappingURL"));
        assert!(out.map.is_none());
    }

    #[test]
    fn test_eval_mode_wraps_factories() {
        let out = render(&bundle(), SourceMapMode::Eval, Path::new("/p"));
        assert!(out.code.contains(
            r#"eval("module.exports = 1;\n\n//# sourceURL=assetpipe:///src/a.js");"#
        ));
        assert!(out.map.is_none());
    }

    #[test]
    fn test_external_map_points_at_module_lines() {
        let out = render(&bundle(), SourceMapMode::External, Path::new("/p"));
        assert!(out.code.ends_with("//# sourceMappingURL=app.bundle.js.map\n"));

        let map: serde_json::Value = serde_json::from_str(out.map.as_deref().unwrap()).unwrap();
        assert_eq!(map["sources"][0], "assetpipe:///src/app.js");
        assert_eq!(map["sources"].as_array().unwrap().len(), 2);

        // 11 runtime lines, then a comment and the factory header
        let mappings: Vec<&str> = map["mappings"].as_str().unwrap().split(';').collect();
        assert_eq!(mappings[13], "AAAA");
        assert_eq!(mappings[14], "AACA");
    }

    #[test]
    fn test_inline_map_is_a_data_url() {
        let out = render(&bundle(), SourceMapMode::Inline, Path::new("/p"));
        assert!(out
            .code
            .contains("//# sourceMappingURL=data:application/json;charset=utf-8;base64,"));
        assert!(out.map.is_none());
    }

    #[test]
    fn test_map_path_appends_extension() {
        assert_eq!(
            map_path(Path::new("/p/dist/app.bundle.js")),
            PathBuf::from("/p/dist/app.bundle.js.map")
        );
    }
}
