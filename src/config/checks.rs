//! Built-in descriptor validators
//!
//! Each validator covers one descriptor section. Filesystem checks are limited
//! to `stat` calls and glob walks; nothing is read or written.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::descriptor::BuildConfig;
use super::validator::{ConfigValidator, ValidationContext, ValidationIssue, ValidationResult};
use crate::pipeline::copy::expand_glob_with_fs;
use crate::pipeline::transform::BUILTIN_TRANSFORMS;

/// Extensions probed when looking for overlapping transform rules
const SAMPLE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "json", "css", "less", "scss", "html", "png", "jpg",
    "jpeg", "gif", "svg", "webp", "woff", "woff2", "ttf", "eot", "otf",
];

/// Every built-in validator, in priority order
pub fn default_validators() -> Vec<Arc<dyn ConfigValidator>> {
    vec![
        Arc::new(EntryValidator),
        Arc::new(OutputValidator),
        Arc::new(DefineValidator),
        Arc::new(RulesValidator),
        Arc::new(TransformersValidator),
        Arc::new(LintValidator),
        Arc::new(ResolveValidator),
        Arc::new(CopyValidator),
        Arc::new(OptimizeValidator),
        Arc::new(ToolsValidator),
    ]
}

/// Entry points exist and have usable names
pub struct EntryValidator;

impl ConfigValidator for EntryValidator {
    fn name(&self) -> &str {
        "entry"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        if ctx.config.entry.is_empty() {
            result.add_issue(
                ValidationIssue::error("entry", "no entry points declared")
                    .with_suggestion("Add one under [entry], e.g. app = \"src/js/app.js\""),
            );
            return result;
        }

        for (name, path) in &ctx.config.entry {
            let field = format!("entry.{}", name);
            if name.trim().is_empty() || name.contains(['/', '\\']) || name == ".." {
                result.add_issue(ValidationIssue::error(
                    &field,
                    format!("'{}' is not a usable entry name", name),
                ));
                continue;
            }
            let absolute = ctx.root.join(path);
            if !ctx.fs.is_file(&absolute) {
                result.add_issue(
                    ValidationIssue::error(
                        &field,
                        format!("entry file {} does not exist", absolute.display()),
                    )
                    .with_suggestion("Entry paths are relative to the project root"),
                );
            }
        }
        result
    }
}

/// Output naming cannot make two bundles collide
pub struct OutputValidator;

impl ConfigValidator for OutputValidator {
    fn name(&self) -> &str {
        "output"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        let output = &ctx.config.output;

        if output.filename.trim().is_empty() {
            result.add_issue(ValidationIssue::error(
                "output.filename",
                "output file name is empty",
            ));
            return result;
        }
        if output.dir.as_os_str().is_empty() {
            result.add_issue(ValidationIssue::error("output.dir", "output directory is empty"));
        }

        if !output.has_name_placeholder() {
            let entries = ctx.config.entry.len();
            if entries > 1 {
                result.add_issue(
                    ValidationIssue::error(
                        "output.filename",
                        format!(
                            "'{}' has no {{name}} placeholder, so {} bundles would overwrite each other",
                            output.filename, entries
                        ),
                    )
                    .with_suggestion("Use a pattern such as \"{name}.bundle.js\""),
                );
            } else {
                result.add_issue(ValidationIssue::warning(
                    "output.filename",
                    format!("'{}' has no {{name}} placeholder", output.filename),
                ));
            }
        }
        result
    }
}

/// Defined globals are identifier paths mapped to literal text
pub struct DefineValidator;

impl ConfigValidator for DefineValidator {
    fn name(&self) -> &str {
        "define"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        for (key, value) in &ctx.config.define {
            let field = format!("define.\"{}\"", key);
            if !is_identifier_path(key) {
                result.add_issue(ValidationIssue::error(
                    &field,
                    format!("'{}' is not an identifier or dotted identifier path", key),
                ));
            }
            if let super::descriptor::DefineValue::Literal(text) = value {
                if !is_serialized_literal(text) {
                    result.add_issue(
                        ValidationIssue::error(
                            &field,
                            format!("'{}' is not a serialized literal", text),
                        )
                        .with_suggestion(format!(
                            "Strings must carry their own quotes, e.g. '\"{}\"'",
                            text
                        )),
                    );
                }
            }
        }
        result
    }
}

/// Whether `key` looks like `a`, `a.b` or `process.env.NODE_ENV`
pub fn is_identifier_path(key: &str) -> bool {
    !key.is_empty()
        && key.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}

fn is_serialized_literal(text: &str) -> bool {
    let text = text.trim();
    text == "undefined" || serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Transform rules have chains made of resolvable steps
pub struct RulesValidator;

impl ConfigValidator for RulesValidator {
    fn name(&self) -> &str {
        "rules"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        let rules = &ctx.config.rules;

        for (index, rule) in rules.iter().enumerate() {
            if rule.chain.is_empty() {
                result.add_issue(ValidationIssue::error(
                    format!("rules[{}].use", index),
                    "transform chain is empty",
                ));
            }
            for step in &rule.chain {
                if !ctx.is_known_transform(&step.name) {
                    result.add_issue(
                        ValidationIssue::error(
                            format!("rules[{}].use", index),
                            format!("unknown transform '{}'", step.name),
                        )
                        .with_suggestion(format!(
                            "Declare it under [transformers.{}] with the command to run",
                            step.name
                        )),
                    );
                }
            }
        }

        // (earlier, later) -> sample extensions both rules match
        let mut overlaps: BTreeMap<(usize, usize), Vec<&str>> = BTreeMap::new();
        for ext in SAMPLE_EXTENSIONS {
            let sample = format!("/__sample__/file.{}", ext);
            let matching: Vec<usize> = rules
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.applies_to(&sample))
                .map(|(index, _)| index)
                .collect();
            if let [winner, rest @ ..] = matching.as_slice() {
                for shadowed in rest {
                    overlaps.entry((*winner, *shadowed)).or_default().push(ext);
                }
            }
        }
        for ((winner, shadowed), exts) in overlaps {
            result.add_issue(ValidationIssue::info(
                format!("rules[{}]", shadowed),
                format!(
                    "overlaps rules[{}] on .{}; the earlier rule wins",
                    winner,
                    exts.join(", .")
                ),
            ));
        }
        result
    }
}

/// External transformer declarations are complete
pub struct TransformersValidator;

impl ConfigValidator for TransformersValidator {
    fn name(&self) -> &str {
        "transformers"
    }

    fn priority(&self) -> u32 {
        45
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        let used: HashSet<&str> = ctx
            .config
            .rules
            .iter()
            .flat_map(|rule| rule.chain.iter().map(|step| step.name.as_str()))
            .collect();

        for (name, transformer) in &ctx.config.transformers {
            let field = format!("transformers.{}", name);
            if transformer.command.trim().is_empty() {
                result.add_issue(ValidationIssue::error(&field, "command is empty"));
            }
            if BUILTIN_TRANSFORMS.contains(&name.as_str()) {
                result.add_issue(ValidationIssue::warning(
                    &field,
                    format!("'{}' is a built-in transform and takes precedence", name),
                ));
            } else if !used.contains(name.as_str()) {
                result.add_issue(ValidationIssue::info(
                    &field,
                    "declared but not used by any rule",
                ));
            }
        }
        result
    }
}

/// Lint gate configuration is usable
pub struct LintValidator;

impl ConfigValidator for LintValidator {
    fn name(&self) -> &str {
        "lint"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        let Some(lint) = &ctx.config.lint else {
            return result;
        };

        if lint.command.trim().is_empty() {
            result.add_issue(ValidationIssue::error("lint.command", "command is empty"));
        }
        let config_path = ctx.root.join(&lint.config);
        if !ctx.fs.is_file(&config_path) {
            result.add_issue(ValidationIssue::error(
                "lint.config",
                format!("linter configuration {} does not exist", config_path.display()),
            ));
        }
        if !lint.is_gating() {
            result.add_issue(ValidationIssue::warning(
                "lint",
                "fail-on-error and fail-on-warning are both false, so linting never stops a build",
            ));
        }
        result
    }
}

/// Resolution extensions are well-formed
pub struct ResolveValidator;

impl ConfigValidator for ResolveValidator {
    fn name(&self) -> &str {
        "resolve"
    }

    fn priority(&self) -> u32 {
        60
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        let mut seen = HashSet::new();
        for ext in &ctx.config.resolve.extensions {
            if !ext.is_empty() && !ext.starts_with('.') {
                result.add_issue(
                    ValidationIssue::error(
                        "resolve.extensions",
                        format!("extension '{}' must be empty or start with '.'", ext),
                    )
                    .with_suggestion(format!("Use \".{}\"", ext)),
                );
            }
            if !seen.insert(ext.as_str()) {
                result.add_issue(ValidationIssue::warning(
                    "resolve.extensions",
                    format!("extension '{}' is listed more than once", ext),
                ));
            }
        }
        result
    }
}

fn exists(ctx: &ValidationContext<'_>, path: &std::path::Path) -> bool {
    ctx.fs.is_file(path) || ctx.fs.is_dir(path)
}

/// Copy sources exist
pub struct CopyValidator;

impl ConfigValidator for CopyValidator {
    fn name(&self) -> &str {
        "copy"
    }

    fn priority(&self) -> u32 {
        70
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        for (index, rule) in ctx.config.copy.iter().enumerate() {
            let field = format!("copy[{}].from", index);
            if rule.from.trim().is_empty() {
                result.add_issue(ValidationIssue::error(&field, "source is empty"));
                continue;
            }
            if rule.is_glob() {
                match expand_glob_with_fs(ctx.fs, ctx.root, &rule.from) {
                    Ok((_, matches)) if matches.is_empty() => {
                        result.add_issue(ValidationIssue::error(
                            &field,
                            format!("glob '{}' matches no files", rule.from),
                        ));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        result.add_issue(ValidationIssue::error(
                            &field,
                            format!("cannot expand '{}': {}", rule.from, e),
                        ));
                    }
                }
            } else if !exists(ctx, &ctx.root.join(&rule.from)) {
                result.add_issue(ValidationIssue::error(
                    &field,
                    format!("'{}' does not exist", rule.from),
                ));
            }
        }
        result
    }
}

/// Optimization passes are listed once
pub struct OptimizeValidator;

impl ConfigValidator for OptimizeValidator {
    fn name(&self) -> &str {
        "optimize"
    }

    fn priority(&self) -> u32 {
        80
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        let mut seen = HashSet::new();
        for pass in &ctx.config.optimize {
            if !seen.insert(*pass) {
                result.add_issue(ValidationIssue::warning(
                    "optimize",
                    format!("pass '{}' is listed more than once", pass),
                ));
            }
        }
        result
    }
}

/// External commands can be found on this machine
pub struct ToolsValidator;

impl ConfigValidator for ToolsValidator {
    fn name(&self) -> &str {
        "tools"
    }

    fn priority(&self) -> u32 {
        90
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::success();
        if !ctx.check_tools {
            return result;
        }

        for (field, command) in required_commands(ctx.config) {
            if command.trim().is_empty() {
                continue;
            }
            if crate::tools::locate(command, ctx.root).is_none() {
                result.add_issue(
                    ValidationIssue::error(field, format!("command '{}' not found", command))
                        .with_suggestion(format!(
                            "Install it locally (npm install --save-dev {}) or put it on PATH",
                            command
                        )),
                );
            }
        }
        result
    }
}

fn required_commands(config: &BuildConfig) -> Vec<(String, &str)> {
    let mut commands = Vec::new();
    if let Some(lint) = &config.lint {
        commands.push(("lint.command".to_string(), lint.command.as_str()));
    }
    let used: HashSet<&str> = config
        .rules
        .iter()
        .flat_map(|rule| rule.chain.iter().map(|step| step.name.as_str()))
        .collect();
    for (name, transformer) in &config.transformers {
        if used.contains(name.as_str()) && !BUILTIN_TRANSFORMS.contains(&name.as_str()) {
            commands.push((
                format!("transformers.{}.command", name),
                transformer.command.as_str(),
            ));
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CopyRule, DefineValue, ExternalTransformer, LintRule, OptimizationPass, Pattern,
        TransformRule, TransformStep, ValidatorRegistry,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn project_with_entry() -> (TempDir, BuildConfig) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/app.js"), "module.exports = 1;\n").unwrap();
        let mut config = BuildConfig::default();
        config
            .entry
            .insert("app".to_string(), PathBuf::from("src/app.js"));
        (temp, config)
    }

    fn run(validator: &dyn ConfigValidator, config: &BuildConfig, root: &Path) -> ValidationResult {
        let ctx = ValidationContext::new(config, root)
            .with_known_transforms(BUILTIN_TRANSFORMS.iter().copied());
        validator.validate(&ctx)
    }

    #[test]
    fn test_default_registry_accepts_minimal_project() {
        let (temp, config) = project_with_entry();
        let registry = ValidatorRegistry::with_defaults();
        let ctx = ValidationContext::new(&config, temp.path())
            .with_known_transforms(BUILTIN_TRANSFORMS.iter().copied());
        let result = registry.validate_all(&ctx);
        assert!(result.is_valid(), "{:?}", result.issues);
    }

    #[test]
    fn test_missing_entry_file_is_an_error() {
        let (temp, mut config) = project_with_entry();
        config
            .entry
            .insert("admin".to_string(), PathBuf::from("src/admin.js"));
        let result = run(&EntryValidator, &config, temp.path());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "entry.admin");
    }

    #[test]
    fn test_no_entries_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = run(&EntryValidator, &BuildConfig::default(), temp.path());
        assert!(result.has_errors());
    }

    #[test]
    fn test_path_like_entry_name_is_rejected() {
        let (temp, mut config) = project_with_entry();
        config
            .entry
            .insert("js/app".to_string(), PathBuf::from("src/app.js"));
        let result = run(&EntryValidator, &config, temp.path());
        assert_eq!(result.errors()[0].field, "entry.js/app");
    }

    #[test]
    fn test_fixed_filename_with_many_entries_is_an_error() {
        let (temp, mut config) = project_with_entry();
        config
            .entry
            .insert("other".to_string(), PathBuf::from("src/app.js"));
        config.output.filename = "bundle.js".to_string();
        let result = run(&OutputValidator, &config, temp.path());
        assert!(result.has_errors());

        config.entry.shift_remove("other");
        let result = run(&OutputValidator, &config, temp.path());
        assert!(!result.has_errors());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_define_rejects_bare_words_and_bad_keys() {
        let (temp, mut config) = project_with_entry();
        config
            .define
            .insert("process.env.NODE_ENV".to_string(), DefineValue::literal("production"));
        config
            .define
            .insert("bad key".to_string(), DefineValue::Bool(true));
        config
            .define
            .insert("API_URL".to_string(), DefineValue::literal("\"/api\""));
        config
            .define
            .insert("MISSING".to_string(), DefineValue::literal("undefined"));

        let result = run(&DefineValidator, &config, temp.path());
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_identifier_paths() {
        assert!(is_identifier_path("__DEV__"));
        assert!(is_identifier_path("process.env.NODE_ENV"));
        assert!(is_identifier_path("$config.api"));
        assert!(!is_identifier_path("process..env"));
        assert!(!is_identifier_path("1abc"));
        assert!(!is_identifier_path(""));
    }

    #[test]
    fn test_unknown_transform_is_an_error() {
        let (temp, mut config) = project_with_entry();
        config.rules.push(TransformRule::new(
            Pattern::new(r"\.less$").unwrap(),
            vec![TransformStep::new("less"), TransformStep::new("css")],
        ));
        let result = run(&RulesValidator, &config, temp.path());
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].message.contains("less"));
    }

    #[test]
    fn test_empty_chain_is_an_error() {
        let (temp, mut config) = project_with_entry();
        config
            .rules
            .push(TransformRule::new(Pattern::new(r"\.js$").unwrap(), vec![]));
        let result = run(&RulesValidator, &config, temp.path());
        assert_eq!(result.errors()[0].field, "rules[0].use");
    }

    #[test]
    fn test_overlapping_rules_are_reported_as_info() {
        let (temp, mut config) = project_with_entry();
        config.rules.push(TransformRule::new(
            Pattern::new(r"(?i)\.(jpe?g|png|gif|svg)$").unwrap(),
            vec![TransformStep::new("url")],
        ));
        config.rules.push(TransformRule::new(
            Pattern::new(r"\.svg(\?v=\d+\.\d+\.\d+)?$").unwrap(),
            vec![TransformStep::new("file")],
        ));

        let result = run(&RulesValidator, &config, temp.path());
        assert!(result.is_valid());
        let infos = result.infos();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].field, "rules[1]");
        assert!(infos[0].message.contains(".svg"));
        assert!(infos[0].message.contains("rules[0]"));
    }

    #[test]
    fn test_transformer_shadowing_builtin_is_a_warning() {
        let (temp, mut config) = project_with_entry();
        config
            .transformers
            .insert("css".to_string(), ExternalTransformer::new("postcss", &[]));
        let result = run(&TransformersValidator, &config, temp.path());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_lint_config_must_exist() {
        let (temp, mut config) = project_with_entry();
        config.lint = Some(LintRule::new(".eslintrc"));
        let result = run(&LintValidator, &config, temp.path());
        assert_eq!(result.errors()[0].field, "lint.config");

        fs::write(temp.path().join(".eslintrc"), "{}").unwrap();
        let result = run(&LintValidator, &config, temp.path());
        assert!(result.is_valid());
    }

    #[test]
    fn test_non_gating_lint_is_a_warning() {
        let (temp, mut config) = project_with_entry();
        fs::write(temp.path().join(".eslintrc"), "{}").unwrap();
        let mut lint = LintRule::new(".eslintrc");
        lint.fail_on_error = false;
        config.lint = Some(lint);
        let result = run(&LintValidator, &config, temp.path());
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_extension_without_dot_is_an_error() {
        let (temp, mut config) = project_with_entry();
        config.resolve.extensions = vec![String::new(), "jsx".to_string(), String::new()];
        let result = run(&ResolveValidator, &config, temp.path());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_copy_sources_must_exist() {
        let (temp, mut config) = project_with_entry();
        fs::create_dir_all(temp.path().join("src/img")).unwrap();
        fs::write(temp.path().join("src/img/logo.png"), [0u8; 4]).unwrap();
        config.copy.push(CopyRule::new("src/img").to("img"));
        config.copy.push(CopyRule::new("src/img/*.png"));
        assert!(run(&CopyValidator, &config, temp.path()).is_valid());

        config.copy.push(CopyRule::new("src/html/app.html"));
        config.copy.push(CopyRule::new("src/img/*.gif"));
        let result = run(&CopyValidator, &config, temp.path());
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_duplicate_pass_is_a_warning() {
        let (temp, mut config) = project_with_entry();
        config.optimize = vec![OptimizationPass::Minify, OptimizationPass::Minify];
        let result = run(&OptimizeValidator, &config, temp.path());
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_tools_validator_flags_missing_commands_when_enabled() {
        let (temp, mut config) = project_with_entry();
        config.transformers.insert(
            "ghost".to_string(),
            ExternalTransformer::new("assetpipe-no-such-tool-xyz", &[]),
        );
        config.rules.push(TransformRule::new(
            Pattern::new(r"\.ghost$").unwrap(),
            vec![TransformStep::new("ghost")],
        ));

        let ctx = ValidationContext::new(&config, temp.path());
        assert!(ToolsValidator.validate(&ctx).is_valid());

        let ctx = ctx.with_tool_check(true);
        let result = ToolsValidator.validate(&ctx);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "transformers.ghost.command");
    }

    /// Answers existence checks from a fixed list; everything else fails
    struct ListedFileSystem {
        files: Vec<PathBuf>,
    }

    impl crate::infra::FileSystem for ListedFileSystem {
        fn copy(&self, _from: &Path, _to: &Path) -> std::io::Result<u64> {
            Err(std::io::Error::other("not supported"))
        }

        fn create_dir_all(&self, _path: &Path) -> std::io::Result<()> {
            Err(std::io::Error::other("not supported"))
        }

        fn read_dir(&self, _path: &Path) -> std::io::Result<fs::ReadDir> {
            Err(std::io::Error::other("not supported"))
        }

        fn metadata(&self, _path: &Path) -> std::io::Result<fs::Metadata> {
            Err(std::io::Error::other("not supported"))
        }

        fn read(&self, _path: &Path) -> std::io::Result<Vec<u8>> {
            Err(std::io::Error::other("not supported"))
        }

        fn read_to_string(&self, _path: &Path) -> std::io::Result<String> {
            Err(std::io::Error::other("not supported"))
        }

        fn write(&self, _path: &Path, _contents: impl AsRef<[u8]>) -> std::io::Result<()> {
            Err(std::io::Error::other("not supported"))
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.iter().any(|file| file == path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.files.iter().any(|file| file.starts_with(path) && file != path)
        }
    }

    #[test]
    fn test_path_checks_go_through_the_context_filesystem() {
        let root = Path::new("/assetpipe-virtual-project");
        let listed = ListedFileSystem {
            files: vec![
                root.join("src/app.js"),
                root.join(".eslintrc"),
                root.join("src/img/logo.png"),
            ],
        };
        let mut config = BuildConfig::default();
        config
            .entry
            .insert("app".to_string(), PathBuf::from("src/app.js"));
        config.lint = Some(LintRule::new(".eslintrc"));
        config.copy.push(CopyRule::new("src/img"));

        let ctx = ValidationContext::new(&config, root).with_file_system(&listed);
        assert!(EntryValidator.validate(&ctx).is_valid());
        assert!(LintValidator.validate(&ctx).is_valid());
        assert!(CopyValidator.validate(&ctx).is_valid());

        config
            .entry
            .insert("admin".to_string(), PathBuf::from("src/admin.js"));
        let ctx = ValidationContext::new(&config, root).with_file_system(&listed);
        let result = EntryValidator.validate(&ctx);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "entry.admin");
    }
}
