//! Build descriptor: types, presets, loading and validation
//!
//! This module provides:
//! - The [`BuildConfig`] descriptor and its sections
//! - `assetpipe.toml` / `assetpipe.json` loading
//! - Named presets for `assetpipe init`
//! - The validator framework and built-in validators

pub mod checks;
pub mod descriptor;
pub mod loader;
pub mod pattern;
pub mod preset;
pub mod validator;

pub use descriptor::{
    BuildConfig, BuildMode, CopyRule, DefineValue, ExternalTransformer, LintRule,
    OptimizationPass, OutputConfig, ResolveConfig, SourceMapMode, TransformRule, TransformStep,
    CONFIG_FILE_NAME, JSON_CONFIG_FILE_NAME, NODE_ENV_KEY,
};
pub use loader::{ConfigFormat, ConfigLoader};
pub use pattern::{slash_path, Pattern};
pub use preset::{Preset, PresetType};
pub use validator::{
    ConfigValidator, ValidationContext, ValidationIssue, ValidationResult, ValidationSeverity,
    ValidatorRegistry,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_name_constants_are_correct() {
        assert_eq!(CONFIG_FILE_NAME, "assetpipe.toml");
        assert_eq!(JSON_CONFIG_FILE_NAME, "assetpipe.json");
    }

    #[test]
    fn test_default_registry_has_every_section_validator() {
        let names = ValidatorRegistry::with_defaults().names();
        for expected in [
            "entry", "output", "define", "rules", "lint", "resolve", "copy", "optimize", "tools",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
