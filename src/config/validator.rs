//! Descriptor validation framework
//!
//! Validators inspect a [`BuildConfig`] together with the project root and
//! report issues by severity. Any Error-severity issue aborts the build before
//! anything is read or written.

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::descriptor::BuildConfig;
use crate::infra::{FileSystem, RealFileSystem};

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Informational message
    Info,
    /// Warning - should be addressed but not blocking
    Warning,
    /// Error - must be fixed
    Error,
}

impl ValidationSeverity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationSeverity::Info => "INFO",
            ValidationSeverity::Warning => "WARNING",
            ValidationSeverity::Error => "ERROR",
        }
    }
}

/// A validation issue found in the descriptor
///
/// # Examples
///
/// ```
/// use assetpipe::config::{ValidationIssue, ValidationSeverity};
///
/// let issue = ValidationIssue::error("entry.app", "file not found")
///     .with_suggestion("Check the path is relative to the project root");
/// assert_eq!(issue.severity, ValidationSeverity::Error);
/// assert_eq!(issue.field, "entry.app");
/// assert!(issue.suggestion.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Severity level
    pub severity: ValidationSeverity,
    /// Descriptor field the issue is about, e.g. `rules[2].use`
    pub field: String,
    /// Description of the issue
    pub message: String,
    /// Suggested fix (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(
        severity: ValidationSeverity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create an error issue
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, field, message)
    }

    /// Create a warning issue
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, field, message)
    }

    /// Create an info issue
    pub fn info(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Info, field, message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity.as_str(),
            self.field,
            self.message
        )
    }
}

/// Result of descriptor validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Issues found during validation, in validator order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self::default()
    }

    /// Create a result from collected issues
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Whether validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error)
    }

    /// Get only errors
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.of_severity(ValidationSeverity::Error)
    }

    /// Get only warnings
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.of_severity(ValidationSeverity::Warning)
    }

    /// Get only informational issues
    pub fn infos(&self) -> Vec<&ValidationIssue> {
        self.of_severity(ValidationSeverity::Info)
    }

    fn of_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

/// Everything a validator may look at
pub struct ValidationContext<'a> {
    /// Descriptor under validation
    pub config: &'a BuildConfig,
    /// Project root all relative paths are resolved against
    pub root: &'a Path,
    /// Filesystem the existence checks go through
    pub fs: &'a dyn FileSystem,
    /// Transform names the registry can resolve
    pub known_transforms: Vec<String>,
    /// Whether external commands must be present on this machine
    pub check_tools: bool,
}

impl<'a> ValidationContext<'a> {
    /// Context on the real filesystem, with no known transforms and tool
    /// checks disabled
    pub fn new(config: &'a BuildConfig, root: &'a Path) -> Self {
        Self {
            config,
            root,
            fs: &RealFileSystem,
            known_transforms: Vec::new(),
            check_tools: false,
        }
    }

    /// Set the transform names the registry resolves
    pub fn with_known_transforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_transforms = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check paths through `fs` instead of the real filesystem
    pub fn with_file_system(mut self, fs: &'a dyn FileSystem) -> Self {
        self.fs = fs;
        self
    }

    /// Enable or disable external command checks
    pub fn with_tool_check(mut self, enabled: bool) -> Self {
        self.check_tools = enabled;
        self
    }

    /// Whether a transform name resolves
    pub fn is_known_transform(&self, name: &str) -> bool {
        self.known_transforms.iter().any(|known| known == name)
    }
}

/// Trait for pluggable descriptor validators
pub trait ConfigValidator: Send + Sync {
    /// Validator name
    fn name(&self) -> &str;

    /// Validate the descriptor
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult;

    /// Get validator priority (lower runs first)
    fn priority(&self) -> u32 {
        100
    }
}

/// Registry for managing descriptor validators
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Mutex<Vec<Arc<dyn ConfigValidator>>>,
}

impl ValidatorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in validator
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        for validator in super::checks::default_validators() {
            registry.register(validator);
        }
        registry
    }

    /// Register a validator
    pub fn register(&self, validator: Arc<dyn ConfigValidator>) {
        let mut validators = self.validators.lock();
        validators.push(validator);
        validators.sort_by_key(|v| v.priority());
    }

    /// Run all validators
    pub fn validate_all(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let validators = self.validators.lock();

        let mut result = ValidationResult::success();
        for validator in validators.iter() {
            let validator_result = validator.validate(ctx);
            log::debug!(
                "validator '{}' reported {} issue(s)",
                validator.name(),
                validator_result.issues.len()
            );
            result.issues.extend(validator_result.issues);
        }
        result
    }

    /// Names of registered validators, in run order
    pub fn names(&self) -> Vec<String> {
        self.validators
            .lock()
            .iter()
            .map(|v| v.name().to_string())
            .collect()
    }

    /// Clear all validators
    pub fn clear(&self) {
        self.validators.lock().clear();
    }

    /// Get validator count
    pub fn count(&self) -> usize {
        self.validators.lock().len()
    }
}
