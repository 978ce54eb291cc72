//! Build pipeline executor
//!
//! Owns the inputs of one build invocation and hands them to the
//! [`BuildOrchestrator`]:
//! 1. validate the descriptor
//! 2. plan copy rules
//! 3. assemble entries (lint gate, transforms, defines)
//! 4. optimize and render bundles
//! 5. write bundles and emitted assets, then copy static assets

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{BuildConfig, ValidatorRegistry};
use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem};

use super::build_orchestrator::BuildOrchestrator;
use super::engine::{BundlingEngine, CommonJsEngine};
use super::error::BuildError;
use super::lint::Linter;
use super::report::{BuildPlan, BuildReport};
use super::transform::{Transform, TransformRegistry};

/// One build invocation over a descriptor
pub struct BuildPipeline<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor>
{
    root: PathBuf,
    config: BuildConfig,
    fs: FS,
    cmd_executor: CE,
    linter: Option<Arc<dyn Linter>>,
    engine: Arc<dyn BundlingEngine>,
    transforms: Vec<Arc<dyn Transform>>,
    validators: ValidatorRegistry,
    check_tools: bool,
}

impl BuildPipeline {
    /// Create a new build pipeline for the project at `project_root`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use assetpipe::config::ConfigLoader;
    /// use assetpipe::pipeline::BuildPipeline;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ConfigLoader::load(std::path::Path::new("."))?;
    /// let report = BuildPipeline::new(".", config).build()?;
    /// for bundle in &report.bundles {
    ///     println!("{} -> {}", bundle.name, bundle.path.display());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(project_root: impl AsRef<Path>, config: BuildConfig) -> Self {
        Self::with_executors(project_root, config, RealFileSystem, RealCommandExecutor)
    }
}

impl<FS, CE> BuildPipeline<FS, CE>
where
    FS: FileSystem + Sync,
    CE: CommandExecutor + Clone + Send + Sync + 'static,
{
    /// Create a new build pipeline with custom filesystem and command executor implementations
    pub fn with_executors(
        project_root: impl AsRef<Path>,
        config: BuildConfig,
        fs: FS,
        cmd_executor: CE,
    ) -> Self {
        Self {
            root: project_root.as_ref().to_path_buf(),
            config,
            fs,
            cmd_executor,
            linter: None,
            engine: Arc::new(CommonJsEngine),
            transforms: Vec::new(),
            validators: ValidatorRegistry::with_defaults(),
            check_tools: false,
        }
    }

    /// Lint with `linter` instead of the descriptor's lint command
    pub fn with_linter(mut self, linter: Arc<dyn Linter>) -> Self {
        self.linter = Some(linter);
        self
    }

    /// Assemble bundles with `engine` instead of [`CommonJsEngine`]
    pub fn with_engine(mut self, engine: Arc<dyn BundlingEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Make `transform` available to rule chains
    ///
    /// Built-in and declared transforms keep precedence over a transform
    /// registered here under the same name.
    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Require every external command to be installed before building
    pub fn with_tool_check(mut self, enabled: bool) -> Self {
        self.check_tools = enabled;
        self
    }

    /// Validate with `validators` instead of the built-in set
    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Descriptor being built
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn registry(&self) -> TransformRegistry {
        let mut registry =
            TransformRegistry::for_config(&self.config, &self.root, self.cmd_executor.clone());
        for transform in &self.transforms {
            registry.register(Arc::clone(transform));
        }
        registry
    }

    /// Run the complete build
    ///
    /// # Errors
    /// Returns the first fatal error: an invalid descriptor, a copy rule
    /// matching nothing, a lint failure, an unresolvable specifier, a failed
    /// transform, or an I/O error while writing.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let registry = self.registry();
        self.with_orchestrator(&registry, |orchestrator| orchestrator.execute())
    }

    /// Validate and plan without assembling or writing anything
    pub fn plan(&self) -> Result<BuildPlan, BuildError> {
        let registry = self.registry();
        self.with_orchestrator(&registry, |orchestrator| orchestrator.plan())
    }

    fn with_orchestrator<T>(
        &self,
        registry: &TransformRegistry,
        run: impl FnOnce(&BuildOrchestrator<'_, FS, CE>) -> Result<T, BuildError>,
    ) -> Result<T, BuildError> {
        let mut orchestrator = BuildOrchestrator::new(
            &self.root,
            &self.config,
            &self.fs,
            &self.cmd_executor,
            self.engine.as_ref(),
            registry,
            &self.validators,
            self.check_tools,
        );
        if let Some(linter) = &self.linter {
            orchestrator = orchestrator.with_linter(linter.as_ref());
        }
        run(&orchestrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Pattern, TransformRule, TransformStep};
    use crate::pipeline::transform::{ModuleContent, TransformContext};
    use std::fs;
    use tempfile::TempDir;

    struct Shout;

    impl Transform for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn apply(
            &self,
            _ctx: &mut TransformContext<'_>,
            input: ModuleContent,
        ) -> Result<ModuleContent, String> {
            Ok(ModuleContent::code(input.text()?.replace("quiet", "QUIET")))
        }
    }

    fn project(step: &str) -> (TempDir, BuildConfig) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/main.js"), "log('quiet');\n").unwrap();

        let mut config = BuildConfig::default();
        config.entry.insert("main".to_string(), "src/main.js".into());
        config.rules.push(TransformRule::new(
            Pattern::new(r"\.js$").unwrap(),
            vec![TransformStep::new(step)],
        ));
        (temp, config)
    }

    #[test]
    fn test_programmatic_transform_is_used_by_rules() {
        let (temp, config) = project("shout");
        let report = BuildPipeline::new(temp.path(), config)
            .with_transform(Arc::new(Shout))
            .build()
            .unwrap();
        let code = fs::read_to_string(&report.bundles[0].path).unwrap();
        assert!(code.contains("log('QUIET');"));
    }

    #[test]
    fn test_unknown_transform_fails_validation() {
        let (temp, config) = project("shout");
        let err = BuildPipeline::new(temp.path(), config).build().unwrap_err();
        assert!(!err.configuration_errors().is_empty());
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    fn test_plan_is_a_dry_run() {
        let (temp, config) = project("raw");
        let plan = BuildPipeline::new(temp.path(), config).plan().unwrap();
        assert_eq!(plan.bundles[0].name, "main");
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    fn test_empty_validator_set_skips_checks() {
        let (temp, config) = project("shout");
        let err = BuildPipeline::new(temp.path(), config)
            .with_validators(ValidatorRegistry::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::Transform { ref step, .. } if step.as_deref() == Some("shout")));
    }
}
