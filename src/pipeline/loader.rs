//! Build-wide module cache
//!
//! Loads every module at most once per build, whichever entry reaches it
//! first: read, lint gate, transform chain, then defined-global
//! substitution.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::define::DefineTable;
use super::engine::{LoadedModule, ModuleLoader};
use super::error::BuildError;
use super::lint::LintGate;
use super::resolver::Resolver;
use super::rules::{RuleSet, Selection};
use super::transform::{TransformRegistry, TransformedModule};
use crate::infra::FileSystem;

type Slot = Arc<Mutex<Option<Arc<LoadedModule>>>>;

/// [`ModuleLoader`] shared by every entry of one build
pub struct ModuleCache<'a, FS: FileSystem> {
    fs: &'a FS,
    rules: RuleSet<'a>,
    registry: &'a TransformRegistry,
    defines: DefineTable,
    gate: Option<LintGate<'a>>,
    resolver: Resolver,
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl<'a, FS: FileSystem> ModuleCache<'a, FS> {
    /// Cache loading through `fs`
    pub fn new(
        fs: &'a FS,
        rules: RuleSet<'a>,
        registry: &'a TransformRegistry,
        defines: DefineTable,
        extensions: &'a [String],
    ) -> Self {
        Self {
            fs,
            rules,
            registry,
            defines,
            gate: None,
            resolver: Resolver::new(extensions),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Lint every covered module before transforming it
    pub fn with_lint_gate(mut self, gate: LintGate<'a>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of modules loaded so far
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    /// Whether nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_uncached(&self, path: &Path) -> Result<LoadedModule, BuildError> {
        let bytes = self
            .fs
            .read(path)
            .map_err(|e| BuildError::io(format!("reading {}", path.display()), e))?;

        if let Some(gate) = &self.gate {
            gate.check(path, &bytes)?;
        }

        let transformed = match self.rules.resolve(path)? {
            Selection::Rule(index, rule) => {
                log::debug!(
                    "{}: rule #{} [{}]",
                    path.display(),
                    index,
                    rule.step_names().join(" -> ")
                );
                self.registry
                    .run_chain(path, Some(index), &rule.chain, bytes)?
            }
            Selection::Plain => TransformedModule {
                code: String::from_utf8(bytes)
                    .map_err(|_| BuildError::transform(path, "file is not UTF-8 text"))?,
                data_literal: None,
                emitted: Vec::new(),
            },
        };

        let code = if transformed.data_literal.is_some() {
            transformed.code
        } else {
            self.defines
                .apply(&transformed.code)
                .map_err(|e| BuildError::transform(path, e.to_string()))?
        };
        Ok(LoadedModule {
            path: path.to_path_buf(),
            code,
            data_literal: transformed.data_literal,
            emitted: transformed.emitted,
        })
    }
}

impl<FS: FileSystem + Sync> ModuleLoader for ModuleCache<'_, FS> {
    fn load(&self, path: &Path) -> Result<Arc<LoadedModule>, BuildError> {
        let slot = self
            .slots
            .lock()
            .entry(path.to_path_buf())
            .or_default()
            .clone();

        // Holding the slot makes a concurrent load of the same path wait
        let mut loaded = slot.lock();
        if let Some(module) = loaded.as_ref() {
            return Ok(Arc::clone(module));
        }
        let module = Arc::new(self.load_uncached(path)?);
        *loaded = Some(Arc::clone(&module));
        Ok(module)
    }

    fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, BuildError> {
        self.resolver.resolve(specifier, importer)
    }
}
