//! Pre-transform lint gate
//!
//! The [`Linter`] produces per-file diagnostics; [`LintGate`] applies the
//! rule's file patterns and fail flags and decides whether the build stops.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::BuildError;
use crate::config::{slash_path, LintRule};
use crate::infra::CommandExecutor;

/// Severity of one lint diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Reported, never fatal unless `fail-on-warning`
    Warning,
    /// Fatal when `fail-on-error`
    Error,
}

/// One diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintMessage {
    /// Severity
    pub severity: LintSeverity,
    /// 1-based line, 0 when unknown
    pub line: u32,
    /// Rule identifier, if the linter reports one
    pub rule_id: Option<String>,
    /// Message text
    pub message: String,
}

impl LintMessage {
    /// `line:N message (rule)` rendering used in errors and logs
    pub fn describe(&self, path: &Path) -> String {
        let rule = self
            .rule_id
            .as_deref()
            .map(|id| format!(" ({})", id))
            .unwrap_or_default();
        format!("{}:{} {}{}", path.display(), self.line, self.message, rule)
    }
}

/// Diagnostics for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    /// All diagnostics, in linter order
    pub messages: Vec<LintMessage>,
}

impl LintReport {
    /// Number of errors
    pub fn error_count(&self) -> usize {
        self.count(LintSeverity::Error)
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(LintSeverity::Warning)
    }

    fn count(&self, severity: LintSeverity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }
}

/// A static checker run on source files before any transform
pub trait Linter: Send + Sync {
    /// Lint one file given its on-disk path and current contents
    fn lint(&self, path: &Path, source: &[u8]) -> Result<LintReport, BuildError>;
}

/// Runs an ESLint-compatible command and reads its JSON report
///
/// The command line is `<command> --no-eslintrc --config <config> --format json <args…> <file>`.
pub struct CommandLinter<CE: CommandExecutor> {
    command: String,
    config: PathBuf,
    args: Vec<String>,
    cmd_executor: CE,
}

impl<CE: CommandExecutor> CommandLinter<CE> {
    /// Linter for `rule`, with the config path resolved against `root`
    pub fn new(rule: &LintRule, root: &Path, cmd_executor: CE) -> Self {
        let command = crate::tools::locate(&rule.command, root)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|| rule.command.clone());
        Self {
            command,
            config: root.join(&rule.config),
            args: rule.args.clone(),
            cmd_executor,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintFileResult {
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintMessage {
    #[serde(default)]
    rule_id: Option<String>,
    severity: u8,
    #[serde(default)]
    message: String,
    #[serde(default)]
    line: u32,
}

/// Parse ESLint's `--format json` output
pub fn parse_eslint_json(output: &str) -> Result<LintReport, String> {
    let files: Vec<EslintFileResult> =
        serde_json::from_str(output.trim()).map_err(|e| format!("unreadable lint report: {}", e))?;
    let messages = files
        .into_iter()
        .flat_map(|file| file.messages)
        .map(|m| LintMessage {
            severity: if m.severity >= 2 {
                LintSeverity::Error
            } else {
                LintSeverity::Warning
            },
            line: m.line,
            rule_id: m.rule_id,
            message: m.message,
        })
        .collect();
    Ok(LintReport { messages })
}

impl<CE: CommandExecutor + Send + Sync> Linter for CommandLinter<CE> {
    fn lint(&self, path: &Path, _source: &[u8]) -> Result<LintReport, BuildError> {
        let output = self
            .cmd_executor
            .execute(
                |cmd| {
                    cmd.arg("--no-eslintrc")
                        .arg("--config")
                        .arg(&self.config)
                        .arg("--format")
                        .arg("json")
                        .args(&self.args)
                        .arg(path)
                },
                &self.command,
            )
            .map_err(|e| BuildError::LintTool {
                path: path.to_path_buf(),
                reason: format!("cannot run '{}': {}", self.command, e),
            })?;

        // ESLint exits 1 when it found problems; only the report matters
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_eslint_json(&stdout).map_err(|reason| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            BuildError::LintTool {
                path: path.to_path_buf(),
                reason: if stderr.trim().is_empty() {
                    reason
                } else {
                    format!("{} ({})", reason, stderr.trim())
                },
            }
        })
    }
}

/// Applies a [`LintRule`] to files entering the build
pub struct LintGate<'a> {
    rule: &'a LintRule,
    linter: &'a dyn Linter,
}

impl<'a> LintGate<'a> {
    /// Gate for `rule` backed by `linter`
    pub fn new(rule: &'a LintRule, linter: &'a dyn Linter) -> Self {
        Self { rule, linter }
    }

    /// Whether `path` is subject to this gate
    pub fn covers(&self, path: &Path) -> bool {
        self.rule.covers(&slash_path(path))
    }

    /// Lint `path` if covered, failing the build per the rule's flags
    pub fn check(&self, path: &Path, source: &[u8]) -> Result<LintReport, BuildError> {
        if !self.covers(path) {
            return Ok(LintReport::default());
        }

        let report = self.linter.lint(path, source)?;
        let errors = report.error_count();
        let warnings = report.warning_count();

        let fails = (self.rule.fail_on_error && errors > 0)
            || (self.rule.fail_on_warning && warnings > 0);
        if fails {
            return Err(BuildError::LintGate {
                path: path.to_path_buf(),
                errors,
                warnings,
                messages: report.messages.iter().map(|m| m.describe(path)).collect(),
            });
        }

        for message in &report.messages {
            log::warn!("lint: {}", message.describe(path));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pattern;
    use crate::infra::mock_exit_status;
    use parking_lot::Mutex;
    use std::io;
    use std::process::{Command, Output};
    use std::sync::Arc;

    const REPORT_WITH_WARNING: &str = r#"[{"filePath":"/p/src/app.jsx","messages":[
        {"ruleId":"no-unused-vars","severity":1,"message":"'x' is defined but never used.","line":3}
    ],"errorCount":0,"warningCount":1}]"#;

    const REPORT_WITH_ERROR: &str = r#"[{"filePath":"/p/src/app.jsx","messages":[
        {"ruleId":"no-undef","severity":2,"message":"'y' is not defined.","line":7},
        {"ruleId":"semi","severity":1,"message":"Missing semicolon.","line":8}
    ]}]"#;

    struct StaticLinter(LintReport);

    impl Linter for StaticLinter {
        fn lint(&self, _path: &Path, _source: &[u8]) -> Result<LintReport, BuildError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingExecutor {
        stdout: String,
        args: Arc<Mutex<Vec<String>>>,
    }

    impl CommandExecutor for RecordingExecutor {
        fn output(&self, cmd: &mut Command) -> io::Result<Output> {
            *self.args.lock() = cmd
                .get_args()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            Ok(Output {
                status: mock_exit_status(1),
                stdout: self.stdout.clone().into_bytes(),
                stderr: Vec::new(),
            })
        }

        fn output_with_input(&self, cmd: &mut Command, _input: &[u8]) -> io::Result<Output> {
            self.output(cmd)
        }
    }

    fn rule() -> LintRule {
        let mut rule = LintRule::new(".eslintrc");
        rule.exclude = Some(Pattern::new("node_modules").unwrap());
        rule
    }

    #[test]
    fn test_parse_eslint_json_maps_severities() {
        let report = parse_eslint_json(REPORT_WITH_ERROR).unwrap();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.messages[0].rule_id.as_deref(), Some("no-undef"));
        assert_eq!(report.messages[0].line, 7);
    }

    #[test]
    fn test_parse_eslint_json_rejects_garbage() {
        assert!(parse_eslint_json("Oops! Something went wrong").is_err());
    }

    #[test]
    fn test_warnings_do_not_fail_by_default() {
        let linter = StaticLinter(parse_eslint_json(REPORT_WITH_WARNING).unwrap());
        let rule = rule();
        let gate = LintGate::new(&rule, &linter);
        let report = gate.check(Path::new("/p/src/app.jsx"), b"").unwrap();
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_errors_fail_the_gate() {
        let linter = StaticLinter(parse_eslint_json(REPORT_WITH_ERROR).unwrap());
        let rule = rule();
        let gate = LintGate::new(&rule, &linter);
        let err = gate.check(Path::new("/p/src/app.jsx"), b"").unwrap_err();
        match err {
            BuildError::LintGate {
                errors,
                warnings,
                messages,
                ..
            } => {
                assert_eq!((errors, warnings), (1, 1));
                assert!(messages[0].contains("/p/src/app.jsx:7"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fail_on_warning_is_independent() {
        let linter = StaticLinter(parse_eslint_json(REPORT_WITH_WARNING).unwrap());
        let mut rule = rule();
        rule.fail_on_warning = true;
        rule.fail_on_error = false;
        let gate = LintGate::new(&rule, &linter);
        assert!(gate.check(Path::new("/p/src/app.jsx"), b"").is_err());

        let linter = StaticLinter(parse_eslint_json(REPORT_WITH_ERROR).unwrap());
        let mut rule = self::rule();
        rule.fail_on_error = false;
        let gate = LintGate::new(&rule, &linter);
        assert!(gate.check(Path::new("/p/src/app.jsx"), b"").is_ok());
    }

    #[test]
    fn test_excluded_and_unmatched_files_are_not_linted() {
        let linter = StaticLinter(parse_eslint_json(REPORT_WITH_ERROR).unwrap());
        let rule = rule();
        let gate = LintGate::new(&rule, &linter);
        assert!(gate
            .check(Path::new("/p/node_modules/react/index.js"), b"")
            .is_ok());
        assert!(gate.check(Path::new("/p/src/style.less"), b"").is_ok());
    }

    #[test]
    fn test_command_linter_passes_config_and_format() {
        let executor = RecordingExecutor {
            stdout: REPORT_WITH_WARNING.to_string(),
            ..Default::default()
        };
        let rule = rule();
        let linter = CommandLinter::new(&rule, Path::new("/p"), executor.clone());
        let report = linter.lint(Path::new("/p/src/app.jsx"), b"").unwrap();
        assert_eq!(report.warning_count(), 1);

        let args = executor.args.lock().clone();
        assert_eq!(
            args,
            vec![
                "--no-eslintrc",
                "--config",
                "/p/.eslintrc",
                "--format",
                "json",
                "/p/src/app.jsx"
            ]
        );
    }

    #[test]
    fn test_command_linter_unreadable_output_is_lint_tool_error() {
        let executor = RecordingExecutor {
            stdout: "crash".to_string(),
            ..Default::default()
        };
        let linter = CommandLinter::new(&rule(), Path::new("/p"), executor);
        assert!(matches!(
            linter.lint(Path::new("/p/src/app.jsx"), b""),
            Err(BuildError::LintTool { .. })
        ));
    }
}
