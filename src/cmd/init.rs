//! Init command implementation
//!
//! Handles the `assetpipe init` command which writes `assetpipe.toml`
//! from a named preset.

use anyhow::Result;
use console::style;
use std::env;

use crate::config::{self, ConfigLoader, Preset};
use crate::error::AssetPipeError;
use crate::fmt::{CHECKMARK, INFO, LIGHTBULB, ROCKET, SPARKLES, WARNING};

/// Write `assetpipe.toml` from a preset
///
/// An existing descriptor is left untouched.
///
/// # Examples
///
/// ```no_run
/// use assetpipe::cmd::init::cmd_init;
///
/// // Full application build
/// cmd_init("production")?;
///
/// // Single raw JavaScript entry
/// cmd_init("minimal")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_init(preset: &str) -> Result<()> {
    println!(
        "{} {} Initializing assetpipe",
        ROCKET,
        style("assetpipe init").bold()
    );
    println!();

    let project_root = env::current_dir()?;

    if ConfigLoader::exists(&project_root) {
        println!(
            "{}Descriptor already exists in {}",
            WARNING,
            style(project_root.display()).cyan()
        );
        println!("   Delete it first or edit it manually.");
        return Ok(());
    }

    let selected = Preset::get(preset).ok_or_else(|| AssetPipeError::InvalidPreset {
        name: preset.to_string(),
        available: Preset::names().into_iter().map(String::from).collect(),
    })?;

    println!(
        "{}Selected preset: {}",
        SPARKLES,
        style(&selected.name).bold().cyan()
    );
    println!("   {}", style(&selected.description).dim());
    println!();

    println!("{}Preset contents:", INFO);
    let summary = [
        ("entry points", selected.config.entry.len()),
        ("transform rules", selected.config.rules.len()),
        ("defined globals", selected.config.define.len()),
        ("copy rules", selected.config.copy.len()),
        ("external transformers", selected.config.transformers.len()),
    ];
    for (label, count) in summary {
        println!("   {} {} {}", style("•").dim(), style(count).green(), label);
    }
    if let Some(lint) = &selected.config.lint {
        println!(
            "   {} lint gate: {} --config {}",
            style("•").dim(),
            style(&lint.command).green(),
            lint.config.display()
        );
    }
    println!();

    let path = ConfigLoader::save(&selected.config, &project_root)?;
    println!(
        "{}Created {}",
        CHECKMARK,
        style(config::CONFIG_FILE_NAME).cyan().bold()
    );
    log::debug!("wrote {}", path.display());
    println!();
    println!("{}Next Steps:", LIGHTBULB);
    println!("   1. Point [entry] at your sources");
    println!(
        "   2. Run {} to validate the descriptor",
        style("assetpipe check").cyan()
    );
    println!("   3. Run {} to build", style("assetpipe build").cyan());
    println!();

    println!("{}Available presets:", INFO);
    for name in Preset::names() {
        let indicator = if name == selected.name { "→" } else { " " };
        println!("   {} {}", style(indicator).cyan().bold(), style(name).bold());
    }

    Ok(())
}
