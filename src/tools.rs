//! External tool detection
//!
//! Locates the commands a descriptor depends on: the lint command and every
//! declared external transformer. Commands are looked up in the project's
//! `node_modules/.bin` first, then on `PATH`.

use crate::config::BuildConfig;
use crate::fmt::{CHECK, CROSS, LIGHTBULB, WRENCH};
use crate::infra::{CommandExecutor, RealCommandExecutor};
use console::style;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during tool operations
#[derive(Error, Debug)]
pub enum ToolError {
    /// I/O error during tool execution
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool execution failed
    #[error("Failed to get version for {0}")]
    VersionFailed(String),

    /// Required tool is missing
    #[error("Required tool missing: {0}")]
    MissingTool(String),
}

/// Search path for project tools: `<root>/node_modules/.bin` followed by `PATH`
pub fn search_path(root: &Path) -> Option<OsString> {
    let mut dirs = vec![root.join("node_modules").join(".bin")];
    if let Some(path) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path));
    }
    std::env::join_paths(dirs).ok()
}

/// Locate `binary` for a project rooted at `root`
///
/// Absolute and relative paths are checked as given; bare names go through
/// [`search_path`].
pub fn locate(binary: &str, root: &Path) -> Option<PathBuf> {
    if binary.contains('/') || binary.contains(std::path::MAIN_SEPARATOR) {
        let path = root.join(binary);
        return path.is_file().then_some(path);
    }
    which::which_in(binary, search_path(root), root).ok()
}

/// A command the build depends on
///
/// # Examples
///
/// ```
/// use assetpipe::tools::Tool;
///
/// let tool = Tool::new("lint", "eslint");
/// assert_eq!(tool.binary, "eslint");
/// ```
#[derive(Debug)]
pub struct Tool<CE: CommandExecutor = RealCommandExecutor> {
    /// What the build uses the tool for, e.g. `lint` or `transform 'babel'`
    pub role: String,
    /// Binary name or path
    pub binary: String,
    cmd_executor: CE,
}

impl Tool<RealCommandExecutor> {
    /// Create a new Tool with real command execution
    pub fn new(role: impl Into<String>, binary: impl Into<String>) -> Self {
        Self::with_executor(role, binary, RealCommandExecutor)
    }
}

impl<CE: CommandExecutor> Tool<CE> {
    /// Create a new Tool with a custom command executor
    pub fn with_executor(role: impl Into<String>, binary: impl Into<String>, cmd_executor: CE) -> Self {
        Self {
            role: role.into(),
            binary: binary.into(),
            cmd_executor,
        }
    }

    /// Resolved location of the binary, if installed
    pub fn location(&self, root: &Path) -> Option<PathBuf> {
        locate(&self.binary, root)
    }

    /// First line printed by `<binary> --version`
    pub fn version(&self, location: &Path) -> Result<String, ToolError> {
        let program = location.to_string_lossy();
        let output = self
            .cmd_executor
            .execute(|cmd| cmd.arg("--version"), &program)?;

        if !output.status.success() {
            return Err(ToolError::VersionFailed(self.binary.clone()));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string())
    }

    /// Check and report the tool status
    pub fn check(&self, root: &Path) -> ToolStatus {
        match self.location(root) {
            Some(location) => match self.version(&location) {
                Ok(version) if !version.is_empty() => ToolStatus::Available(version),
                _ => ToolStatus::InstalledButVersionUnknown,
            },
            None => ToolStatus::Missing,
        }
    }
}

/// Status of a tool check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// Tool is available and version was successfully retrieved
    Available(String),
    /// Tool binary exists but version check failed
    InstalledButVersionUnknown,
    /// Tool binary not found
    Missing,
}

/// Every external command a descriptor depends on
pub struct ToolChain<CE: CommandExecutor = RealCommandExecutor> {
    /// Tools in descriptor order: the lint command first, then transformers
    pub tools: Vec<Tool<CE>>,
}

impl ToolChain<RealCommandExecutor> {
    /// Collect tools for `config` with real command execution
    pub fn for_config(config: &BuildConfig) -> Self {
        Self::with_executor(config, RealCommandExecutor)
    }
}

impl<CE: CommandExecutor + Clone> ToolChain<CE> {
    /// Collect tools for `config` with a custom command executor
    pub fn with_executor(config: &BuildConfig, cmd_executor: CE) -> Self {
        let mut tools = Vec::new();
        if let Some(lint) = &config.lint {
            tools.push(Tool::with_executor(
                "lint",
                lint.command.clone(),
                cmd_executor.clone(),
            ));
        }
        for (name, transformer) in &config.transformers {
            tools.push(Tool::with_executor(
                format!("transform '{}'", name),
                transformer.command.clone(),
                cmd_executor.clone(),
            ));
        }
        Self { tools }
    }
}

impl<CE: CommandExecutor> ToolChain<CE> {
    /// Binaries that cannot be located
    pub fn missing(&self, root: &Path) -> Vec<&Tool<CE>> {
        self.tools
            .iter()
            .filter(|tool| tool.location(root).is_none())
            .collect()
    }

    /// Check all tools and print their status
    pub fn check_all(&self, root: &Path) -> Result<(), ToolError> {
        if self.tools.is_empty() {
            return Ok(());
        }
        println!("\n{} Checking external tools...", WRENCH);

        let mut missing = Vec::new();
        for tool in &self.tools {
            match tool.check(root) {
                ToolStatus::Available(version) => println!(
                    "   {} {} ({}) - {}",
                    style(CHECK).green(),
                    style(&tool.binary).bold(),
                    tool.role,
                    style(version).dim()
                ),
                ToolStatus::InstalledButVersionUnknown => println!(
                    "   {} {} ({}) - {}",
                    style(CHECK).green(),
                    style(&tool.binary).bold(),
                    tool.role,
                    style("(version unknown)").dim()
                ),
                ToolStatus::Missing => {
                    println!(
                        "   {} {} ({}) - {}",
                        style(CROSS).red(),
                        style(&tool.binary).bold(),
                        tool.role,
                        style("NOT FOUND").red()
                    );
                    missing.push(tool.binary.as_str());
                }
            }
        }

        if missing.is_empty() {
            return Ok(());
        }
        println!(
            "\n{} Install project tools locally, e.g. npm install --save-dev {}",
            LIGHTBULB,
            missing.join(" ")
        );
        Err(ToolError::MissingTool(missing.join(", ")))
    }
}
