//! Check command implementation
//!
//! Validates the descriptor with every built-in validator and checks that
//! the external commands it names are installed, without building.

use anyhow::Result;
use console::style;
use std::env;
use std::path::Path;

use crate::cmd::load_descriptor;
use crate::config::{ValidationContext, ValidationSeverity, ValidatorRegistry};
use crate::error::AssetPipeError;
use crate::fmt::{CHECKMARK, CROSSMARK, INFO, WARNING, WRENCH};
use crate::infra::RealCommandExecutor;
use crate::pipeline::{BuildError, TransformRegistry};
use crate::tools::ToolChain;

/// Validate the descriptor and check external tools
///
/// # Errors
/// Fails with the validation errors when any validator reports one, or when
/// a required command is missing.
pub fn cmd_check(config_path: Option<&Path>) -> Result<()> {
    let cwd = env::current_dir()?;
    let (root, config) = load_descriptor(&cwd, config_path)?;

    println!("{} {} Descriptor Check", WRENCH, style("assetpipe").bold());
    println!(
        "   {} entry point(s), {} rule(s), {} copy rule(s)",
        config.entry.len(),
        config.rules.len(),
        config.copy.len()
    );

    let registry = TransformRegistry::for_config(&config, &root, RealCommandExecutor);
    let validators = ValidatorRegistry::with_defaults();
    let ctx = ValidationContext::new(&config, &root).with_known_transforms(registry.names());
    let result = validators.validate_all(&ctx);

    println!();
    for issue in &result.issues {
        let marker = match issue.severity {
            // Printed by the error formatter
            ValidationSeverity::Error => continue,
            ValidationSeverity::Warning => WARNING,
            ValidationSeverity::Info => INFO,
        };
        println!("{}{}: {}", marker, style(&issue.field).bold(), issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("   {}", style(suggestion).dim());
        }
    }

    if result.has_errors() {
        println!("{}{} error(s)", CROSSMARK, result.errors().len());
        return Err(AssetPipeError::from(BuildError::Configuration {
            issues: result.errors().into_iter().cloned().collect(),
        })
        .into());
    }
    println!(
        "{}Descriptor is valid ({} validator(s), {} warning(s))",
        CHECKMARK,
        validators.count(),
        result.warnings().len()
    );

    ToolChain::for_config(&config).check_all(&root)?;
    Ok(())
}
