#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! assetpipe library
//!
//! Builds browser bundles from a declarative descriptor: entry points,
//! transform rules, defined globals, resolution extensions, a lint gate,
//! copy rules and optimization passes. Everything the CLI does is
//! available programmatically.
//!
//! # Basic Example
//!
//! Parsing a descriptor and validating it against a project root:
//!
//! ```
//! use assetpipe::config::{ConfigFormat, ConfigLoader, ValidationContext, ValidatorRegistry};
//! use std::path::Path;
//!
//! let config = ConfigLoader::parse(
//!     r#"
//! [entry]
//! app = "src/app.js"
//!
//! [[rules]]
//! test = '\.json$'
//! use = ["json"]
//! "#,
//!     ConfigFormat::Toml,
//! )
//! .unwrap();
//!
//! assert_eq!(config.entry.len(), 1);
//! assert_eq!(config.rules[0].step_names(), vec!["json"]);
//!
//! // The entry file does not exist under this root
//! let ctx = ValidationContext::new(&config, Path::new("/nonexistent"));
//! let result = ValidatorRegistry::with_defaults().validate_all(&ctx);
//! assert!(result.has_errors());
//! ```
//!
//! # Advanced Example: Programmatic Build
//!
//! ```
//! use assetpipe::config::{BuildConfig, Pattern, TransformRule, TransformStep};
//! use assetpipe::pipeline::BuildPipeline;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let project = TempDir::new().unwrap();
//! fs::create_dir_all(project.path().join("src")).unwrap();
//! fs::write(project.path().join("src/app.js"), "module.exports = require('./data.json');").unwrap();
//! fs::write(project.path().join("src/data.json"), r#"{"ok": true}"#).unwrap();
//!
//! let mut config = BuildConfig::default();
//! config.entry.insert("app".to_string(), "src/app.js".into());
//! config.rules.push(TransformRule::new(
//!     Pattern::new(r"\.json$").unwrap(),
//!     vec![TransformStep::new("json")],
//! ));
//!
//! let report = BuildPipeline::new(project.path(), config).build().unwrap();
//! assert_eq!(report.bundles[0].name, "app");
//! assert!(report.bundles[0].path.exists());
//! ```

/// Command handlers for CLI operations
pub mod cmd;
/// Build descriptor, presets and validation
pub mod config;
/// Enhanced error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Build pipeline orchestration
pub mod pipeline;
/// External tool detection and version checking
pub mod tools;
