//! Transforms backed by external commands
//!
//! The module's bytes go to the command's stdin and its stdout is the result.

use std::path::Path;

use super::{ModuleContent, Transform, TransformContext};
use crate::config::{ExternalTransformer, TransformStep};
use crate::infra::CommandExecutor;

/// A named transform running a declared command
pub struct ExternalTransform<CE: CommandExecutor> {
    name: String,
    program: String,
    args: Vec<String>,
    cmd_executor: CE,
}

impl<CE: CommandExecutor> ExternalTransform<CE> {
    /// Transform `name` running `declaration`, looked up relative to `root`
    pub fn new(
        name: impl Into<String>,
        declaration: &ExternalTransformer,
        root: &Path,
        cmd_executor: CE,
    ) -> Self {
        let program = crate::tools::locate(&declaration.command, root)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|| declaration.command.clone());
        Self {
            name: name.into(),
            program,
            args: declaration.args.clone(),
            cmd_executor,
        }
    }
}

/// Expand `{file}`, `{options}` and `{option:KEY}` in one argument
///
/// # Examples
///
/// ```
/// use assetpipe::config::TransformStep;
/// use assetpipe::pipeline::transform::external::expand_arg;
/// use std::path::Path;
///
/// let step = TransformStep::new("babel").with_option("presets", vec!["react", "es2015"]);
/// assert_eq!(expand_arg("{option:presets}", Path::new("/p/a.jsx"), &step), "react,es2015");
/// assert_eq!(expand_arg("--filename={file}", Path::new("/p/a.jsx"), &step), "--filename=/p/a.jsx");
/// ```
pub fn expand_arg(arg: &str, path: &Path, step: &TransformStep) -> String {
    let mut expanded = arg.replace("{file}", &path.to_string_lossy());
    if expanded.contains("{options}") {
        let options = serde_json::Value::Object(step.options.clone()).to_string();
        expanded = expanded.replace("{options}", &options);
    }

    // Substituted values are never rescanned
    let mut cursor = 0;
    while let Some(found) = expanded[cursor..].find("{option:") {
        let start = cursor + found;
        let Some(len) = expanded[start..].find('}') else {
            break;
        };
        let key = &expanded[start + "{option:".len()..start + len];
        let value = step.options.get(key).map(option_text).unwrap_or_default();
        expanded.replace_range(start..start + len + 1, &value);
        cursor = start + value.len();
    }
    expanded
}

fn option_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(option_text)
            .collect::<Vec<_>>()
            .join(","),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl<CE: CommandExecutor + Send + Sync> Transform for ExternalTransform<CE> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        &self,
        ctx: &mut TransformContext<'_>,
        input: ModuleContent,
    ) -> Result<ModuleContent, String> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| expand_arg(arg, ctx.path, ctx.step))
            .collect();
        log::debug!("{}: {} {}", ctx.path.display(), self.program, args.join(" "));

        let output = self
            .cmd_executor
            .execute_with_input(|cmd| cmd.args(&args), &self.program, &input.bytes)
            .map_err(|e| format!("cannot run '{}': {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(if detail.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                format!("'{}' exited with {}: {}", self.program, output.status, detail)
            });
        }
        Ok(ModuleContent::from_bytes(output.stdout))
    }
}
