//! Named starter descriptors
//!
//! - `production`: multi-entry application build with lint gate, Babel, Less,
//!   image and font handling, static asset copies and all optimization passes
//! - `minimal`: a single raw JavaScript entry point
//!
//! # Examples
//!
//! ```
//! use assetpipe::config::{Preset, PresetType};
//!
//! let preset = Preset::new(PresetType::Production);
//! assert_eq!(preset.config.entry.len(), 2);
//!
//! assert!(Preset::get("minimal").is_some());
//! assert!(Preset::get("unknown").is_none());
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;

use super::descriptor::{
    BuildConfig, BuildMode, CopyRule, DefineValue, ExternalTransformer, LintRule,
    OptimizationPass, OutputConfig, ResolveConfig, SourceMapMode, TransformRule, TransformStep,
    NODE_ENV_KEY,
};
use super::pattern::Pattern;

/// Preset identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetType {
    /// Full application build
    Production,
    /// Single raw JavaScript entry
    Minimal,
}

impl FromStr for PresetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "minimal" => Ok(Self::Minimal),
            _ => Err(format!("Unknown preset: {}", s)),
        }
    }
}

impl PresetType {
    /// All presets, in listing order
    pub const ALL: [PresetType; 2] = [PresetType::Production, PresetType::Minimal];

    /// Preset name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Minimal => "minimal",
        }
    }

    /// Preset description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Production => {
                "Two entry points, ESLint gate, Babel/Less/image transforms, asset copies"
            }
            Self::Minimal => "Single raw JavaScript entry point",
        }
    }
}

/// A named descriptor ready to be written as `assetpipe.toml`
#[derive(Debug, Clone)]
pub struct Preset {
    /// Preset name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// The descriptor itself
    pub config: BuildConfig,
}

impl Preset {
    /// Build the preset for `preset_type`
    pub fn new(preset_type: PresetType) -> Self {
        let config = match preset_type {
            PresetType::Production => production(),
            PresetType::Minimal => minimal(),
        };
        Self {
            name: preset_type.name().to_string(),
            description: preset_type.description().to_string(),
            config,
        }
    }

    /// Look a preset up by name
    pub fn get(name: &str) -> Option<Self> {
        PresetType::from_str(name).ok().map(Self::new)
    }

    /// Names of all presets
    pub fn names() -> Vec<&'static str> {
        PresetType::ALL.iter().map(PresetType::name).collect()
    }
}

// Patterns below are literals known to compile.
fn pattern(source: &str) -> Pattern {
    Pattern::new(source).unwrap_or_else(|e| panic!("preset pattern {source}: {e}"))
}

fn step(shorthand: &str) -> TransformStep {
    TransformStep::parse(shorthand).unwrap_or_else(|e| panic!("preset step {shorthand}: {e}"))
}

fn production() -> BuildConfig {
    let mut entry = IndexMap::new();
    entry.insert(
        "controller".to_string(),
        PathBuf::from("src/js/controller.js"),
    );
    entry.insert("app".to_string(), PathBuf::from("src/js/app.jsx"));

    let mut define = IndexMap::new();
    define.insert(
        NODE_ENV_KEY.to_string(),
        DefineValue::literal("\"production\""),
    );
    define.insert("__DEV__".to_string(), DefineValue::Bool(false));

    let babel = TransformStep::new("babel")
        .with_option("presets", vec!["react", "es2015"])
        .with_option("plugins", vec!["transform-object-rest-spread"]);

    let rules = vec![
        TransformRule::new(pattern(r"\.css$"), vec![step("css"), step("style")]),
        TransformRule::new(
            pattern(r"\.less$"),
            vec![step("less"), step("css"), step("style")],
        ),
        TransformRule::new(pattern(r"\.jsx?$"), vec![babel]).excluding(pattern("node_modules")),
        TransformRule::new(
            pattern(r"(?i)\.(jpe?g|png|gif|svg)$"),
            vec![step("img?progressive=true"), step("url?limit=10000")],
        ),
        TransformRule::new(
            pattern(r"\.(woff|woff2)(\?v=\d+\.\d+\.\d+)?$"),
            vec![step("url?limit=10000&mimetype=application/font-woff")],
        ),
        TransformRule::new(
            pattern(r"\.ttf(\?v=\d+\.\d+\.\d+)?$"),
            vec![step("url?limit=10000&mimetype=application/octet-stream")],
        ),
        TransformRule::new(pattern(r"\.eot(\?v=\d+\.\d+\.\d+)?$"), vec![step("file")]),
        TransformRule::new(
            pattern(r"\.svg(\?v=\d+\.\d+\.\d+)?$"),
            vec![step("url?limit=10000&mimetype=image/svg+xml")],
        ),
    ];

    let mut lint = LintRule::new(".eslintrc");
    lint.exclude = Some(pattern("node_modules"));

    let mut transformers = IndexMap::new();
    transformers.insert(
        "babel".to_string(),
        ExternalTransformer::new(
            "babel",
            &[
                "--filename",
                "{file}",
                "--presets",
                "{option:presets}",
                "--plugins",
                "{option:plugins}",
            ],
        ),
    );
    transformers.insert("less".to_string(), ExternalTransformer::new("lessc", &["-"]));
    transformers.insert("img".to_string(), ExternalTransformer::new("imagemin", &[]));

    BuildConfig {
        mode: BuildMode::Production,
        sourcemap: SourceMapMode::Eval,
        optimize: vec![
            OptimizationPass::Dedupe,
            OptimizationPass::Minify,
            OptimizationPass::Merge,
        ],
        entry,
        output: OutputConfig::default(),
        resolve: ResolveConfig {
            extensions: vec![String::new(), ".js".to_string(), ".jsx".to_string()],
        },
        define,
        rules,
        lint: Some(lint),
        copy: vec![
            CopyRule::new("src/html/app.html"),
            CopyRule::new("src/html/controller.html"),
            CopyRule::new("src/bundle.json"),
            CopyRule::new("src/img").to("img"),
        ],
        transformers,
    }
}

fn minimal() -> BuildConfig {
    let mut entry = IndexMap::new();
    entry.insert("main".to_string(), PathBuf::from("src/index.js"));

    BuildConfig {
        entry,
        rules: vec![TransformRule::new(pattern(r"\.js$"), vec![step("raw")])],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_type_from_str_is_case_insensitive() {
        assert_eq!(
            "Production".parse::<PresetType>().unwrap(),
            PresetType::Production
        );
        assert_eq!("minimal".parse::<PresetType>().unwrap(), PresetType::Minimal);
        assert!("balanced".parse::<PresetType>().is_err());
    }

    #[test]
    fn test_production_preset_mirrors_application_build() {
        let config = Preset::new(PresetType::Production).config;

        let names: Vec<&str> = config.entry.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["controller", "app"]);
        assert_eq!(config.sourcemap, SourceMapMode::Eval);
        assert_eq!(config.resolve.extensions, vec!["", ".js", ".jsx"]);
        assert_eq!(config.copy.len(), 4);
        assert_eq!(config.copy[3].to, Some(PathBuf::from("img")));

        let lint = config.lint.as_ref().unwrap();
        assert!(!lint.fail_on_warning);
        assert!(lint.fail_on_error);
    }

    #[test]
    fn test_production_less_chain_runs_less_first() {
        let config = Preset::new(PresetType::Production).config;
        let less_rule = config
            .rules
            .iter()
            .find(|rule| rule.test.as_str() == r"\.less$")
            .unwrap();
        assert_eq!(less_rule.step_names(), vec!["less", "css", "style"]);
    }

    #[test]
    fn test_production_defines_dev_flag_and_node_env() {
        let config = Preset::new(PresetType::Production).config;
        assert_eq!(config.define.get("__DEV__"), Some(&DefineValue::Bool(false)));
        assert_eq!(
            config.define.get(NODE_ENV_KEY),
            Some(&DefineValue::literal("\"production\""))
        );
    }

    #[test]
    fn test_every_external_step_has_a_transformer() {
        let config = Preset::new(PresetType::Production).config;
        for name in ["babel", "less", "img"] {
            assert!(config.transformers.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_preset_names_lists_all() {
        assert_eq!(Preset::names(), vec!["production", "minimal"]);
    }
}
