//! Build command implementation
//!
//! Thin presentation layer over [`BuildPipeline`].

use anyhow::Result;
use console::style;
use serde::Serialize;
use std::env;
use std::path::Path;

use crate::cmd::load_descriptor;
use crate::error::AssetPipeError;
use crate::fmt::ROCKET;
use crate::pipeline::{BuildPipeline, ResultFormatter};

/// Main build command handler (presentation layer)
///
/// # Examples
///
/// ```no_run
/// use assetpipe::cmd::build::cmd_build;
///
/// // Build with ./assetpipe.toml
/// cmd_build(None, false, false)?;
///
/// // Dry-run to preview output paths
/// cmd_build(None, true, false)?;
///
/// // Build with JSON output for CI/CD
/// cmd_build(None, false, true)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_build(config_path: Option<&Path>, dry_run: bool, json_output: bool) -> Result<()> {
    let cwd = env::current_dir()?;
    let (root, config) = load_descriptor(&cwd, config_path)?;

    if !json_output {
        println!("{} {} Build Pipeline", ROCKET, style("assetpipe").bold());
    }

    let pipeline = BuildPipeline::new(&root, config).with_tool_check(true);

    if dry_run {
        let plan = pipeline.plan().map_err(AssetPipeError::from)?;
        if json_output {
            present_json(&plan)?;
        } else {
            println!("\n[DRY RUN] Nothing will be written");
            ResultFormatter::print_plan(&plan, &root);
        }
        return Ok(());
    }

    let report = pipeline.build().map_err(AssetPipeError::from)?;
    if json_output {
        present_json(&report)?;
    } else {
        ResultFormatter::print_summary(&report, &root);
    }
    Ok(())
}

/// Present a JSON report for CI/CD systems
fn present_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
