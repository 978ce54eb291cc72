//! User-facing error types with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes
//! - Documentation links
//! - Exit codes following sysexits.h
//!
//! # Examples
//!
//! ```no_run
//! use assetpipe::config::ConfigLoader;
//! use assetpipe::error::AssetPipeError;
//! use std::path::Path;
//!
//! match ConfigLoader::load(Path::new(".")) {
//!     Ok(config) => println!("{} entry point(s)", config.entry.len()),
//!     Err(e) => {
//!         eprintln!("{}", e);
//!         if let Some(help) = e.suggestion() {
//!             eprintln!("help: {}", help);
//!         }
//!         std::process::exit(e.exit_code());
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::BuildError;

/// Errors surfaced by the command-line interface
#[derive(Error, Debug)]
pub enum AssetPipeError {
    /// Descriptor file not found
    #[error("Configuration file not found: {}", .path.display())]
    ConfigNotFound {
        /// Path to config file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Descriptor file could not be parsed
    #[error("failed to parse {}: {message}", .path.display())]
    ConfigParse {
        /// Path to config file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Unknown preset name
    #[error("Invalid preset: '{name}'")]
    InvalidPreset {
        /// Requested preset name
        name: String,
        /// List of valid preset names
        available: Vec<String>,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// The build itself failed
    #[error("build failed: {0}")]
    Build(#[from] BuildError),
}

impl AssetPipeError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetpipe::error::AssetPipeError;
    ///
    /// let error = AssetPipeError::InvalidPreset {
    ///     name: "fast".to_string(),
    ///     available: vec!["production".to_string(), "minimal".to_string()],
    /// };
    ///
    /// assert!(error.suggestion().unwrap().contains("production"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Run 'assetpipe init' to create assetpipe.toml".to_string())
            }
            Self::ConfigParse { .. } => Some(
                "Check the descriptor syntax; 'assetpipe init' writes a working example"
                    .to_string(),
            ),
            Self::InvalidPreset { available, .. } => {
                Some(format!("Available presets: {}", available.join(", ")))
            }
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
            Self::Build(e) => build_suggestion(e),
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => {
                Some("https://github.com/assetpipe/assetpipe#configuration")
            }
            Self::Build(BuildError::Configuration { .. }) => {
                Some("https://github.com/assetpipe/assetpipe#validation")
            }
            Self::Build(BuildError::Transform { .. }) => {
                Some("https://github.com/assetpipe/assetpipe#transform-rules")
            }
            _ => None,
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Returns Unix-style exit codes based on the error type, following sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetpipe::error::AssetPipeError;
    /// use assetpipe::pipeline::BuildError;
    ///
    /// let error = AssetPipeError::Build(BuildError::Configuration { issues: vec![] });
    /// assert_eq!(error.exit_code(), 78); // EX_CONFIG
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } => 66, // EX_NOINPUT
            Self::ConfigParse { .. } => 65,    // EX_DATAERR
            Self::InvalidPreset { .. } => 64,  // EX_USAGE
            Self::Io { .. } => 74,             // EX_IOERR
            Self::Build(e) => match e {
                BuildError::Configuration { .. } => 78, // EX_CONFIG
                BuildError::LintTool { .. } => 69,      // EX_UNAVAILABLE
                BuildError::Io { .. } => 74,            // EX_IOERR
                _ => 1,
            },
        }
    }

    /// Returns the build error if this is a `Build` variant.
    pub fn as_build_error(&self) -> Option<&BuildError> {
        match self {
            Self::Build(e) => Some(e),
            _ => None,
        }
    }
}

fn build_suggestion(error: &BuildError) -> Option<String> {
    match error {
        BuildError::Configuration { issues } => {
            let fixes: Vec<String> = issues
                .iter()
                .filter_map(|issue| {
                    issue
                        .suggestion
                        .as_ref()
                        .map(|s| format!("{}: {}", issue.field, s))
                })
                .collect();
            if fixes.is_empty() {
                Some("Run 'assetpipe check' to list every issue".to_string())
            } else {
                Some(fixes.join("\n"))
            }
        }
        BuildError::LintGate { .. } => {
            Some("Fix the reported lint errors or relax fail-on-error in [lint]".to_string())
        }
        BuildError::LintTool { .. } => Some(
            "Make sure the lint command is installed and accepts --format json".to_string(),
        ),
        BuildError::Transform { rule: None, .. } => Some(
            "Add a rule whose test matches this file, or import only JavaScript".to_string(),
        ),
        BuildError::Transform { .. } => {
            Some("Check the transform's output above for the underlying problem".to_string())
        }
        BuildError::Resolve { .. } => Some(
            "Check the specifier, the file on disk, and [resolve].extensions".to_string(),
        ),
        BuildError::Copy { .. } => Some("Check the copy rule's 'from' path".to_string()),
        BuildError::Io { .. } => None,
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(ap_error) = error.downcast_ref::<AssetPipeError>() {
            if let Some(BuildError::Configuration { issues }) = ap_error.as_build_error() {
                for issue in issues {
                    output.push_str(&format!("  {}\n", issue));
                }
            }
            if let Some(BuildError::LintGate { messages, .. }) = ap_error.as_build_error() {
                for message in messages {
                    output.push_str(&format!("  {}\n", message));
                }
            }

            if let Some(suggestion) = ap_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = ap_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        if let Some(ap_error) = error.downcast_ref::<AssetPipeError>() {
            ap_error.exit_code()
        } else {
            1
        }
    }
}
