//! Transform chains
//!
//! A rule's chain is a list of named steps applied left to right. Each step
//! is resolved through the [`TransformRegistry`]: built-ins first, then the
//! descriptor's external transformers, then transforms registered in code.

pub mod builtin;
pub mod external;

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::BuildError;
use crate::config::{BuildConfig, TransformStep};
use crate::infra::CommandExecutor;

use builtin::{CssTransform, FileTransform, JsonTransform, RawTransform, StyleTransform, UrlTransform};
use external::ExternalTransform;

/// Names of transforms available without any declaration
pub const BUILTIN_TRANSFORMS: &[&str] = &["raw", "json", "css", "style", "url", "file"];

/// Content flowing between steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContent {
    /// Current bytes
    pub bytes: Vec<u8>,
    /// Exported literal when the content is a data module
    pub data_literal: Option<String>,
}

impl ModuleContent {
    /// Raw bytes, not a data module
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            data_literal: None,
        }
    }

    /// JavaScript code, not a data module
    pub fn code(code: String) -> Self {
        Self::from_bytes(code.into_bytes())
    }

    /// A data module exporting `literal`
    pub fn data(literal: String) -> Self {
        Self {
            bytes: data_module_code(&literal).into_bytes(),
            data_literal: Some(literal),
        }
    }

    /// Content as UTF-8 text
    pub fn text(&self) -> Result<&str, String> {
        std::str::from_utf8(&self.bytes).map_err(|e| format!("content is not UTF-8 text: {}", e))
    }
}

/// Code of a data module exporting `literal`
pub fn data_module_code(literal: &str) -> String {
    format!("module.exports = {};\n", literal)
}

/// A file produced by a transform and written next to the bundles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Path relative to the output directory
    pub file_name: String,
    /// Source module
    pub source: PathBuf,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Per-step state handed to a transform
pub struct TransformContext<'a> {
    /// Source file being transformed
    pub path: &'a Path,
    /// Step being applied, with its options
    pub step: &'a TransformStep,
    /// Assets emitted so far by this chain
    pub emitted: Vec<EmittedAsset>,
}

impl<'a> TransformContext<'a> {
    /// Context for one step with no emitted assets
    pub fn new(path: &'a Path, step: &'a TransformStep) -> Self {
        Self {
            path,
            step,
            emitted: Vec::new(),
        }
    }
}

/// One named transform
pub trait Transform: Send + Sync {
    /// Name steps refer to
    fn name(&self) -> &str;

    /// Transform `input`; the error string becomes the build error's reason
    fn apply(
        &self,
        ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String>;
}

/// Result of a whole chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedModule {
    /// Final JavaScript code
    pub code: String,
    /// Exported literal when the module is a data module
    pub data_literal: Option<String>,
    /// Assets emitted by the chain
    pub emitted: Vec<EmittedAsset>,
}

/// Resolves step names to transforms
#[derive(Clone)]
pub struct TransformRegistry {
    transforms: IndexMap<String, Arc<dyn Transform>>,
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TransformRegistry {
    /// Registry holding the built-in transforms
    pub fn builtin() -> Self {
        let mut registry = Self {
            transforms: IndexMap::new(),
        };
        let builtins: [Arc<dyn Transform>; 6] = [
            Arc::new(RawTransform),
            Arc::new(JsonTransform),
            Arc::new(CssTransform),
            Arc::new(StyleTransform),
            Arc::new(UrlTransform),
            Arc::new(FileTransform),
        ];
        for transform in builtins {
            registry.register(transform);
        }
        registry
    }

    /// Built-ins plus the descriptor's external transformers
    pub fn for_config<CE>(config: &BuildConfig, root: &Path, cmd_executor: CE) -> Self
    where
        CE: CommandExecutor + Clone + Send + Sync + 'static,
    {
        let mut registry = Self::builtin();
        for (name, declaration) in &config.transformers {
            registry.register(Arc::new(ExternalTransform::new(
                name.clone(),
                declaration,
                root,
                cmd_executor.clone(),
            )));
        }
        registry
    }

    /// Register a transform; a name already present keeps its first binding
    pub fn register(&mut self, transform: Arc<dyn Transform>) {
        let name = transform.name().to_string();
        if self.transforms.contains_key(&name) {
            log::debug!("transform '{}' already registered, keeping the first", name);
            return;
        }
        self.transforms.insert(name, transform);
    }

    /// Look a transform up by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Transform>> {
        self.transforms.get(name)
    }

    /// Every resolvable name, in registration order
    pub fn names(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }

    /// Apply `chain` to `bytes`, left to right
    pub fn run_chain(
        &self,
        path: &Path,
        rule: Option<usize>,
        chain: &[TransformStep],
        bytes: Vec<u8>,
    ) -> Result<TransformedModule, BuildError> {
        let mut content = ModuleContent::from_bytes(bytes);
        let mut emitted = Vec::new();

        for step in chain {
            let fail = |reason: String| BuildError::Transform {
                path: path.to_path_buf(),
                rule,
                step: Some(step.name.clone()),
                reason,
            };
            let transform = self
                .get(&step.name)
                .ok_or_else(|| fail(format!("unknown transform '{}'", step.name)))?;

            let mut ctx = TransformContext::new(path, step);
            content = transform.apply(&mut ctx, content).map_err(fail)?;
            emitted.append(&mut ctx.emitted);
        }

        let code = String::from_utf8(content.bytes).map_err(|_| BuildError::Transform {
            path: path.to_path_buf(),
            rule,
            step: chain.last().map(|step| step.name.clone()),
            reason: "chain produced binary output; end it with url or file".to_string(),
        })?;
        Ok(TransformedModule {
            code,
            data_literal: content.data_literal,
            emitted,
        })
    }
}
