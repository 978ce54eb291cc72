//! Bundling engine seam
//!
//! A [`BundlingEngine`] turns one entry point into a [`Bundle`], pulling
//! modules through a [`ModuleLoader`] that has already lint-gated,
//! transformed and define-substituted them. [`CommonJsEngine`] is the
//! reference engine: it stitches `require("...")` graphs into a registry.

use indexmap::IndexMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::BuildError;
use super::syntax::require_calls;
use super::transform::EmittedAsset;

/// Name of the module-local require function in rendered bundles
pub const REQUIRE_FN: &str = "__assetpipe_require__";

/// One entry point to assemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPlan {
    /// Entry name from the descriptor
    pub name: String,
    /// Resolved entry module
    pub path: PathBuf,
    /// Bundle file to write
    pub output_path: PathBuf,
}

/// A module after lint gate, transform chain and define substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Source file
    pub path: PathBuf,
    /// JavaScript code
    pub code: String,
    /// Exported literal for data modules
    pub data_literal: Option<String>,
    /// Assets emitted by the transform chain
    pub emitted: Vec<EmittedAsset>,
}

/// Supplies modules to an engine
pub trait ModuleLoader: Send + Sync {
    /// Load and transform `path`
    fn load(&self, path: &Path) -> Result<Arc<LoadedModule>, BuildError>;

    /// Resolve `specifier` as written in `importer`
    fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, BuildError>;
}

/// A module in a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Registry id; the entry is 0
    pub id: usize,
    /// Source file
    pub path: PathBuf,
    /// Code with requires rewritten to registry ids
    pub code: String,
    /// Exported literal for data modules
    pub data_literal: Option<String>,
    /// Ids required by this module, one per call site
    pub requires: Vec<usize>,
    /// For each line of `code`, the 0-based line of `source` it came from
    pub line_origins: Vec<u32>,
    /// Code as loaded, before any optimization pass
    pub source: Arc<str>,
    /// Module whose factory this one reuses
    pub alias_of: Option<usize>,
}

impl Module {
    /// Module whose lines map one-to-one onto its source
    pub fn new(id: usize, path: PathBuf, code: String, source: Arc<str>) -> Self {
        let line_origins = (0..code.lines().count().max(1) as u32).collect();
        Self {
            id,
            path,
            code,
            data_literal: None,
            requires: Vec::new(),
            line_origins,
            source,
            alias_of: None,
        }
    }
}

/// The assembled output of one entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Entry name
    pub entry_name: String,
    /// Bundle file to write
    pub output_path: PathBuf,
    /// Modules, ordered by id
    pub modules: Vec<Module>,
    /// Assets emitted by any module, deduplicated by file name
    pub assets: Vec<EmittedAsset>,
}

impl Bundle {
    /// Module with registry id `id`
    pub fn module(&self, id: usize) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }
}

/// Assembles an entry point into a bundle
pub trait BundlingEngine: Send + Sync {
    /// Engine name, for logs
    fn name(&self) -> &str;

    /// Assemble `entry`, loading modules through `loader`
    fn assemble(&self, entry: &EntryPlan, loader: &dyn ModuleLoader) -> Result<Bundle, BuildError>;
}

/// Stitches CommonJS modules into an id-keyed registry
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonJsEngine;

impl BundlingEngine for CommonJsEngine {
    fn name(&self) -> &str {
        "commonjs"
    }

    fn assemble(&self, entry: &EntryPlan, loader: &dyn ModuleLoader) -> Result<Bundle, BuildError> {
        let mut ids: IndexMap<PathBuf, usize> = IndexMap::new();
        let mut queue = VecDeque::new();
        ids.insert(entry.path.clone(), 0);
        queue.push_back(entry.path.clone());

        let mut modules = Vec::new();
        let mut assets: IndexMap<String, EmittedAsset> = IndexMap::new();

        while let Some(path) = queue.pop_front() {
            let loaded = loader.load(&path)?;
            let id = ids[&path];

            let mut requires = Vec::new();
            let code = rewrite_requires(&path, &loaded.code, |specifier| {
                let target = loader.resolve(specifier, &path)?;
                let next = ids.len();
                let target_id = *ids.entry(target.clone()).or_insert_with(|| {
                    queue.push_back(target);
                    next
                });
                requires.push(target_id);
                Ok(target_id)
            })?;
            log::debug!(
                "{}: module {} {} ({} requires)",
                entry.name,
                id,
                path.display(),
                requires.len()
            );

            for asset in &loaded.emitted {
                assets
                    .entry(asset.file_name.clone())
                    .or_insert_with(|| asset.clone());
            }

            let mut module = Module::new(id, path, code, Arc::from(loaded.code.as_str()));
            module.data_literal = loaded.data_literal.clone();
            module.requires = requires;
            modules.push(module);
        }

        modules.sort_by_key(|m| m.id);
        Ok(Bundle {
            entry_name: entry.name.clone(),
            output_path: entry.output_path.clone(),
            modules,
            assets: assets.into_values().collect(),
        })
    }
}

/// Rewrite every `require("spec")` call in the module at `path`
///
/// `resolve` maps a specifier to a registry id. Calls whose argument is not
/// a single string literal are left alone, as are `x.require(...)` member
/// calls.
///
/// # Examples
///
/// ```
/// use assetpipe::pipeline::engine::rewrite_requires;
/// use std::path::Path;
///
/// let code = "var a = require('./a'); // require('./b')\n";
/// let out = rewrite_requires(Path::new("/src/app.js"), code, |spec| {
///     assert_eq!(spec, "./a");
///     Ok(7)
/// })
/// .unwrap();
/// assert_eq!(out, "var a = __assetpipe_require__(7); // require('./b')\n");
/// ```
pub fn rewrite_requires<F>(path: &Path, code: &str, mut resolve: F) -> Result<String, BuildError>
where
    F: FnMut(&str) -> Result<usize, BuildError>,
{
    let calls = require_calls(code).map_err(|e| BuildError::transform(path, e.to_string()))?;
    let mut out = String::with_capacity(code.len());
    let mut copied = 0;
    for call in calls {
        let id = resolve(&call.specifier)?;
        out.push_str(&code[copied..call.start]);
        out.push_str(&format!("{}({})", REQUIRE_FN, id));
        copied = call.end;
    }
    out.push_str(&code[copied..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves modules from memory; specifiers are looked up verbatim
    struct MemoryLoader {
        modules: HashMap<PathBuf, LoadedModule>,
    }

    impl MemoryLoader {
        fn new(files: &[(&str, &str)]) -> Self {
            let modules = files
                .iter()
                .map(|(path, code)| {
                    (
                        PathBuf::from(path),
                        LoadedModule {
                            path: PathBuf::from(path),
                            code: code.to_string(),
                            data_literal: None,
                            emitted: Vec::new(),
                        },
                    )
                })
                .collect();
            Self { modules }
        }
    }

    impl ModuleLoader for MemoryLoader {
        fn load(&self, path: &Path) -> Result<Arc<LoadedModule>, BuildError> {
            self.modules
                .get(path)
                .cloned()
                .map(Arc::new)
                .ok_or_else(|| BuildError::transform(path, "not in memory"))
        }

        fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, BuildError> {
            let path = PathBuf::from(specifier);
            if self.modules.contains_key(&path) {
                Ok(path)
            } else {
                Err(BuildError::Resolve {
                    specifier: specifier.to_string(),
                    importer: importer.to_path_buf(),
                })
            }
        }
    }

    fn plan() -> EntryPlan {
        EntryPlan {
            name: "app".to_string(),
            path: PathBuf::from("/app.js"),
            output_path: PathBuf::from("/dist/app.bundle.js"),
        }
    }

    #[test]
    fn test_ids_follow_breadth_first_discovery() {
        let loader = MemoryLoader::new(&[
            ("/app.js", "require('/a.js'); require('/b.js');"),
            ("/a.js", "require('/c.js');"),
            ("/b.js", "require('/a.js');"),
            ("/c.js", "module.exports = 1;"),
        ]);
        let bundle = CommonJsEngine.assemble(&plan(), &loader).unwrap();
        let order: Vec<_> = bundle
            .modules
            .iter()
            .map(|m| (m.id, m.path.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "/app.js".to_string()),
                (1, "/a.js".to_string()),
                (2, "/b.js".to_string()),
                (3, "/c.js".to_string()),
            ]
        );
        assert_eq!(bundle.module(2).unwrap().code, "__assetpipe_require__(1);");
        assert_eq!(bundle.module(0).unwrap().requires, vec![1, 2]);
    }

    #[test]
    fn test_cycles_terminate() {
        let loader = MemoryLoader::new(&[
            ("/app.js", "require('/a.js');"),
            ("/a.js", "require('/app.js');"),
        ]);
        let bundle = CommonJsEngine.assemble(&plan(), &loader).unwrap();
        assert_eq!(bundle.modules.len(), 2);
        assert_eq!(bundle.module(1).unwrap().code, "__assetpipe_require__(0);");
    }

    #[test]
    fn test_unresolvable_require_fails() {
        let loader = MemoryLoader::new(&[("/app.js", "require('./nowhere');")]);
        let err = CommonJsEngine.assemble(&plan(), &loader).unwrap_err();
        assert!(matches!(err, BuildError::Resolve { .. }));
    }

    #[test]
    fn test_requires_in_strings_comments_and_members_are_ignored() {
        let code = concat!(
            "var s = \"require('/x.js')\";\n",
            "/* require('/x.js') */\n",
            "loader.require('/x.js');\n",
            "myrequire('/x.js');\n",
            "require(name);\n",
        );
        let out = rewrite_requires(Path::new("/app.js"), code, |_| panic!("nothing should resolve")).unwrap();
        assert_eq!(out, code);
    }

    #[test]
    fn test_unparsable_module_names_the_file() {
        let loader = MemoryLoader::new(&[("/app.js", "require('/a.js'")]);
        let err = CommonJsEngine.assemble(&plan(), &loader).unwrap_err();
        assert!(matches!(err, BuildError::Transform { ref path, .. } if path == Path::new("/app.js")));
    }

    #[test]
    fn test_whitespace_inside_call_is_allowed() {
        let out = rewrite_requires(Path::new("/app.js"), "x = require ( \"./a\" ) ;", |_| Ok(4)).unwrap();
        assert_eq!(out, "x = __assetpipe_require__(4) ;");
    }

    #[test]
    fn test_emitted_assets_are_deduplicated() {
        let asset = EmittedAsset {
            file_name: "abc.png".to_string(),
            source: PathBuf::from("/logo.png"),
            bytes: vec![1],
        };
        let mut loader = MemoryLoader::new(&[
            ("/app.js", "require('/a.js'); require('/b.js');"),
            ("/a.js", ""),
            ("/b.js", ""),
        ]);
        for path in ["/a.js", "/b.js"] {
            loader
                .modules
                .get_mut(Path::new(path))
                .unwrap()
                .emitted
                .push(asset.clone());
        }
        let bundle = CommonJsEngine.assemble(&plan(), &loader).unwrap();
        assert_eq!(bundle.assets, vec![asset]);
    }
}
