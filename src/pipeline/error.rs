//! Error types for the build pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::config::{ValidationIssue, ValidationSeverity};

/// Errors that abort a build invocation
///
/// Every variant is fatal for the invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The descriptor failed validation
    #[error("invalid build configuration: {}", summarize(.issues))]
    Configuration {
        /// Every issue found, errors and warnings alike
        issues: Vec<ValidationIssue>,
    },

    /// The lint gate rejected a file
    #[error("lint failed for {}: {errors} error(s), {warnings} warning(s)", .path.display())]
    LintGate {
        /// Linted file
        path: PathBuf,
        /// Error count
        errors: usize,
        /// Warning count
        warnings: usize,
        /// Formatted diagnostics
        messages: Vec<String>,
    },

    /// The linter could not be run or its report could not be read
    #[error("linter failed on {}: {reason}", .path.display())]
    LintTool {
        /// File being linted
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A file could not be transformed
    #[error("cannot transform {}{}: {reason}", .path.display(), describe_step(*.rule, .step.as_deref()))]
    Transform {
        /// Source file
        path: PathBuf,
        /// Index of the matching rule, if any
        rule: Option<usize>,
        /// Failing step, if any
        step: Option<String>,
        /// What went wrong
        reason: String,
    },

    /// A module specifier matched no file
    #[error("cannot resolve '{specifier}' from {}", .importer.display())]
    Resolve {
        /// Specifier as written
        specifier: String,
        /// Importing module
        importer: PathBuf,
    },

    /// A copy rule could not be honored
    #[error("copy rule '{from}' failed: {reason}")]
    Copy {
        /// Source as written in the rule
        from: String,
        /// What went wrong
        reason: String,
    },

    /// Filesystem error
    #[error("I/O error: {context}")]
    Io {
        /// Operation and path
        context: String,
        #[source]
        /// Underlying error
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Transform failure outside any particular step
    pub fn transform(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Transform {
            path: path.into(),
            rule: None,
            step: None,
            reason: reason.into(),
        }
    }

    /// Error-severity issues of a configuration error
    pub fn configuration_errors(&self) -> Vec<&ValidationIssue> {
        match self {
            Self::Configuration { issues } => issues
                .iter()
                .filter(|issue| issue.severity == ValidationSeverity::Error)
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    let errors: Vec<&ValidationIssue> = issues
        .iter()
        .filter(|issue| issue.severity == ValidationSeverity::Error)
        .collect();
    match errors.as_slice() {
        [] => "no errors".to_string(),
        [only] => format!("{}: {}", only.field, only.message),
        [first, rest @ ..] => format!(
            "{}: {} (and {} more)",
            first.field,
            first.message,
            rest.len()
        ),
    }
}

fn describe_step(rule: Option<usize>, step: Option<&str>) -> String {
    match (rule, step) {
        (Some(rule), Some(step)) => format!(" (rule #{}, step '{}')", rule, step),
        (Some(rule), None) => format!(" (rule #{})", rule),
        (None, Some(step)) => format!(" (step '{}')", step),
        (None, None) => String::new(),
    }
}
