//! Build orchestration logic
//!
//! Runs the stages of one build invocation in order. Everything up to and
//! including rendering happens in memory, so a failure in validation, copy
//! planning, lint gating, resolution or transformation writes nothing.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{BuildConfig, ValidationContext, ValidationIssue, ValidatorRegistry};
use crate::infra::{CommandExecutor, FileSystem};

use super::copy::{CopyExecutor, CopyPlanner, CopyTask};
use super::define::DefineTable;
use super::engine::{Bundle, BundlingEngine, EntryPlan};
use super::error::BuildError;
use super::lint::{CommandLinter, LintGate, Linter};
use super::loader::ModuleCache;
use super::optimize::apply_passes;
use super::render::{map_path, render, RenderedBundle};
use super::report::{BuildPlan, BuildReport, BundleReport, PlannedBundle};
use super::resolver::Resolver;
use super::rules::RuleSet;
use super::transform::TransformRegistry;

/// Runs the stages of a build against one descriptor
pub struct BuildOrchestrator<'a, FS: FileSystem, CE: CommandExecutor> {
    root: &'a Path,
    config: &'a BuildConfig,
    fs: &'a FS,
    cmd_executor: &'a CE,
    linter: Option<&'a dyn Linter>,
    engine: &'a dyn BundlingEngine,
    registry: &'a TransformRegistry,
    validators: &'a ValidatorRegistry,
    check_tools: bool,
}

impl<'a, FS, CE> BuildOrchestrator<'a, FS, CE>
where
    FS: FileSystem + Sync,
    CE: CommandExecutor + Clone + Send + Sync,
{
    /// Orchestrator over borrowed build inputs
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        root: &'a Path,
        config: &'a BuildConfig,
        fs: &'a FS,
        cmd_executor: &'a CE,
        engine: &'a dyn BundlingEngine,
        registry: &'a TransformRegistry,
        validators: &'a ValidatorRegistry,
        check_tools: bool,
    ) -> Self {
        Self {
            root,
            config,
            fs,
            cmd_executor,
            linter: None,
            engine,
            registry,
            validators,
            check_tools,
        }
    }

    /// Use `linter` instead of running the descriptor's lint command
    pub fn with_linter(mut self, linter: &'a dyn Linter) -> Self {
        self.linter = Some(linter);
        self
    }

    /// Stage 1: validate the descriptor
    ///
    /// Returns the non-fatal issues when validation passes.
    pub fn validate(&self) -> Result<Vec<ValidationIssue>, BuildError> {
        let ctx = ValidationContext::new(self.config, self.root)
            .with_file_system(self.fs)
            .with_known_transforms(self.registry.names())
            .with_tool_check(self.check_tools);
        let result = self.validators.validate_all(&ctx);
        if result.has_errors() {
            return Err(BuildError::Configuration {
                issues: result.issues,
            });
        }
        for issue in result.warnings() {
            log::warn!("{}", issue);
        }
        Ok(result.issues)
    }

    /// Stage 2: expand copy rules without writing
    pub fn plan_copies(&self) -> Result<Vec<CopyTask>, BuildError> {
        CopyPlanner::new(self.fs, self.root, self.config.output_dir(self.root))
            .plan(&self.config.copy)
    }

    /// Resolve every entry point and its bundle path
    pub fn entry_plans(&self) -> Result<Vec<EntryPlan>, BuildError> {
        let resolver = Resolver::new(&self.config.resolve.extensions);
        self.config
            .entry
            .iter()
            .map(|(name, entry)| {
                Ok(EntryPlan {
                    name: name.clone(),
                    path: resolver.resolve_entry(self.root, entry)?,
                    output_path: self.config.bundle_path(self.root, name),
                })
            })
            .collect()
    }

    /// Stages 1 and 2 only
    pub fn plan(&self) -> Result<BuildPlan, BuildError> {
        let warnings = self.validate()?;
        let copies = self.plan_copies()?;
        let bundles = self
            .entry_plans()?
            .into_iter()
            .map(|plan| PlannedBundle {
                name: plan.name,
                entry: plan.path,
                output: plan.output_path,
            })
            .collect();
        Ok(BuildPlan {
            bundles,
            copies,
            warnings,
        })
    }

    /// Stage 3: assemble every entry in parallel through one module cache
    ///
    /// The first failing entry in declaration order determines the error.
    pub fn assemble(&self, plans: &[EntryPlan]) -> Result<Vec<Bundle>, BuildError> {
        let command_linter;
        let mut linter: Option<&dyn Linter> = self.linter;
        if let (None, Some(rule)) = (linter, &self.config.lint) {
            command_linter = CommandLinter::new(rule, self.root, self.cmd_executor.clone());
            linter = Some(&command_linter);
        }

        let mut cache = ModuleCache::new(
            self.fs,
            RuleSet::new(&self.config.rules),
            self.registry,
            DefineTable::from_config(self.config),
            &self.config.resolve.extensions,
        );
        if let (Some(rule), Some(linter)) = (&self.config.lint, linter) {
            cache = cache.with_lint_gate(LintGate::new(rule, linter));
        }

        log::debug!(
            "assembling {} entries with the {} engine",
            plans.len(),
            self.engine.name()
        );
        let results: Vec<Result<Bundle, BuildError>> = plans
            .par_iter()
            .map(|plan| self.engine.assemble(plan, &cache))
            .collect();
        let bundles = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        log::debug!("{} modules loaded", cache.len());
        Ok(bundles)
    }

    /// Run every stage and write the output
    pub fn execute(&self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();

        let warnings = self.validate()?;
        let copies = self.plan_copies()?;
        let plans = self.entry_plans()?;
        let bundles = self.assemble(&plans)?;

        // Stages 4 and 5: optimize and render
        let rendered: Vec<(Bundle, RenderedBundle)> = bundles
            .into_iter()
            .map(|mut bundle| {
                apply_passes(&mut bundle, &self.config.optimize);
                let output = render(&bundle, self.config.sourcemap, self.root);
                (bundle, output)
            })
            .collect();

        // Stage 6: write bundles, maps and emitted assets
        let out_dir = self.config.output_dir(self.root);
        self.fs
            .create_dir_all(&out_dir)
            .map_err(|e| BuildError::io(format!("creating {}", out_dir.display()), e))?;

        let mut report = BuildReport {
            warnings,
            ..Default::default()
        };
        for (bundle, output) in &rendered {
            self.write(&bundle.output_path, output.code.as_bytes())?;
            let source_map = match &output.map {
                Some(map) => {
                    let path = map_path(&bundle.output_path);
                    self.write(&path, map.as_bytes())?;
                    Some(path)
                }
                None => None,
            };
            report.bundles.push(BundleReport {
                name: bundle.entry_name.clone(),
                path: bundle.output_path.clone(),
                size: output.code.len() as u64,
                modules: bundle.modules.len(),
                source_map,
            });

            for asset in &bundle.assets {
                let path = out_dir.join(&asset.file_name);
                if report.assets.contains(&path) {
                    continue;
                }
                self.write(&path, &asset.bytes)?;
                report.assets.push(path);
            }
        }

        // Stage 7: copy static assets
        report.copied = CopyExecutor::new(self.fs).execute(&copies)?;
        report.duration_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
        if let Some(parent) = path.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| BuildError::io(format!("creating {}", parent.display()), e))?;
        }
        self.fs
            .write(path, bytes)
            .map_err(|e| BuildError::io(format!("writing {}", path.display()), e))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }

    /// Bundle path for every entry, without resolving anything
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.config
            .entry
            .keys()
            .map(|name| self.config.bundle_path(self.root, name))
            .collect()
    }
}
