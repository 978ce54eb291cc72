//! Module specifier resolution
//!
//! Lookup is delegated to `oxc_resolver`. The configured extensions are tried
//! in order and only those: `""` stands for the specifier as written, so a
//! list without it never matches an exact file name. Directories resolve to
//! their `index`, and bare specifiers walk up through `node_modules` and
//! honor a package's `main` field.

use oxc_resolver::{EnforceExtension, ResolveOptions};
use std::path::{Path, PathBuf};
use sugar_path::SugarPath;

use super::error::BuildError;

/// Resolves specifiers against the filesystem
pub struct Resolver {
    modules: oxc_resolver::Resolver,
    entries: oxc_resolver::Resolver,
}

impl Resolver {
    /// Resolver trying `extensions` in order
    pub fn new(extensions: &[String]) -> Self {
        let options = ResolveOptions {
            extensions: extensions.to_vec(),
            main_fields: vec!["main".to_string()],
            enforce_extension: EnforceExtension::Enabled,
            exports_fields: Vec::new(),
            symlinks: false,
            ..ResolveOptions::default()
        };
        let modules = oxc_resolver::Resolver::new(options.clone());
        // Entry paths are checked as written before any extension
        let entries = modules.clone_with_options(ResolveOptions {
            enforce_extension: EnforceExtension::Disabled,
            ..options
        });
        Self { modules, entries }
    }

    /// Resolve `specifier` as written in `importer`
    ///
    /// A `?query` suffix is ignored for lookup.
    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, BuildError> {
        let request = specifier.split_once('?').map_or(specifier, |(path, _)| path);
        let importer_dir = importer.parent().unwrap_or(Path::new("/")).absolutize();

        self.modules
            .resolve(&importer_dir, request)
            .map(|resolution| resolution.into_path_buf())
            .map_err(|e| {
                log::debug!("{}: '{}' not resolved: {}", importer.display(), specifier, e);
                BuildError::Resolve {
                    specifier: specifier.to_string(),
                    importer: importer.to_path_buf(),
                }
            })
    }

    /// Resolve an entry point path relative to the project root
    ///
    /// The path as written wins over any extension.
    pub fn resolve_entry(&self, root: &Path, entry: &Path) -> Result<PathBuf, BuildError> {
        let root = root.absolutize();
        let path = root.join(entry).normalize();
        self.entries
            .resolve(&root, &path.to_string_lossy())
            .map(|resolution| resolution.into_path_buf())
            .map_err(|e| {
                log::debug!("entry {} not resolved: {}", entry.display(), e);
                BuildError::Resolve {
                    specifier: entry.display().to_string(),
                    importer: root.clone(),
                }
            })
    }
}
