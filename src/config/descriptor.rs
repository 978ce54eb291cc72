//! Build configuration descriptor data structures

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

use super::pattern::Pattern;

/// Configuration file name (TOML)
pub const CONFIG_FILE_NAME: &str = "assetpipe.toml";

/// Alternative configuration file name (JSON)
pub const JSON_CONFIG_FILE_NAME: &str = "assetpipe.json";

/// Placeholder substituted with the entry point name in output file names
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Identifier that always receives the build mode unless explicitly defined
pub const NODE_ENV_KEY: &str = "process.env.NODE_ENV";

/// Complete build descriptor.
///
/// Constructed once per build invocation, read-only for the duration of the
/// build, and discarded afterwards.
///
/// # Examples
///
/// ```
/// use assetpipe::config::BuildConfig;
/// use std::path::{Path, PathBuf};
///
/// let mut config = BuildConfig::default();
/// config.entry.insert("app".to_string(), PathBuf::from("src/app.js"));
///
/// assert_eq!(
///     config.bundle_path(Path::new("/project"), "app"),
///     PathBuf::from("/project/dist/app.bundle.js")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BuildConfig {
    /// Build mode, drives the injected `process.env.NODE_ENV`
    #[serde(default)]
    pub mode: BuildMode,

    /// Source map generation mode
    #[serde(default)]
    pub sourcemap: SourceMapMode,

    /// Post-assembly passes, applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optimize: Vec<OptimizationPass>,

    /// Named entry points, in declaration order
    #[serde(default)]
    pub entry: IndexMap<String, PathBuf>,

    /// Output location and naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Module resolution settings
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Compile-time constants, substituted verbatim
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub define: IndexMap<String, DefineValue>,

    /// Transform rules, first match wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<TransformRule>,

    /// Optional lint gate run before any transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint: Option<LintRule>,

    /// Static assets copied verbatim into the output directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy: Vec<CopyRule>,

    /// External commands backing named transform steps
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub transformers: IndexMap<String, ExternalTransformer>,
}

impl BuildConfig {
    /// Absolute path of the bundle written for `entry_name`
    pub fn bundle_path(&self, root: &Path, entry_name: &str) -> PathBuf {
        self.output_dir(root).join(self.output.file_name(entry_name))
    }

    /// Absolute output directory
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output.dir)
    }

    /// Defined globals as final literal text, including the mode's
    /// `process.env.NODE_ENV` unless the descriptor defines it itself.
    pub fn effective_defines(&self) -> IndexMap<String, String> {
        let mut defines: IndexMap<String, String> = self
            .define
            .iter()
            .map(|(key, value)| (key.clone(), value.literal_text()))
            .collect();
        if !defines.contains_key(NODE_ENV_KEY) {
            defines.insert(
                NODE_ENV_KEY.to_string(),
                format!("\"{}\"", self.mode.node_env()),
            );
        }
        defines
    }
}

/// Build mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Production build (default)
    #[default]
    Production,
    /// Development build
    Development,
}

impl BuildMode {
    /// Value injected as `process.env.NODE_ENV`
    pub fn node_env(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

/// Source map generation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// No source maps (fastest)
    #[default]
    None,
    /// Source map embedded as a data URL at the end of the bundle
    #[serde(alias = "inline-source-map")]
    Inline,
    /// Source map written next to the bundle as `<bundle>.map`
    #[serde(alias = "source-map")]
    External,
    /// Each module wrapped in `eval` with a `sourceURL` comment
    #[serde(alias = "eval-source-map")]
    Eval,
}

impl SourceMapMode {
    /// Descriptor spelling of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Inline => "inline",
            Self::External => "external",
            Self::Eval => "eval",
        }
    }
}

/// Named whole-bundle post-processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationPass {
    /// Share one factory between modules with identical code
    Dedupe,
    /// Strip comments, indentation and blank lines
    Minify,
    /// Fold single-use data modules into their importer
    Merge,
}

impl OptimizationPass {
    /// Descriptor spelling of the pass
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dedupe => "dedupe",
            Self::Minify => "minify",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for OptimizationPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output directory and file name pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory, relative to the project root
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name pattern containing `{name}` (or `[name]`)
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_output_filename() -> String {
    "{name}.bundle.js".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: default_output_filename(),
        }
    }
}

impl OutputConfig {
    /// Whether the pattern contains an entry-name placeholder
    pub fn has_name_placeholder(&self) -> bool {
        self.filename.contains(NAME_PLACEHOLDER) || self.filename.contains("[name]")
    }

    /// File name for one entry point
    pub fn file_name(&self, entry_name: &str) -> String {
        self.filename
            .replace(NAME_PLACEHOLDER, entry_name)
            .replace("[name]", entry_name)
    }
}

/// Module resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResolveConfig {
    /// Extensions tried in order for bare specifiers; `""` is the specifier as written
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![String::new(), ".js".to_string()]
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// File-pattern to transform-chain mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformRule {
    /// Files this rule applies to
    pub test: Pattern,

    /// Files excluded even when `test` matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,

    /// Steps applied left to right
    #[serde(rename = "use")]
    pub chain: Vec<TransformStep>,
}

impl TransformRule {
    /// Build a rule from a test pattern and a chain
    pub fn new(test: Pattern, chain: Vec<TransformStep>) -> Self {
        Self {
            test,
            exclude: None,
            chain,
        }
    }

    /// Attach an exclusion matcher
    pub fn excluding(mut self, exclude: Pattern) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// Whether the rule's test matches and its exclusion does not
    pub fn applies_to(&self, slash_path: &str) -> bool {
        self.test.matches_str(slash_path)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.matches_str(slash_path))
    }

    /// Step names in application order
    pub fn step_names(&self) -> Vec<&str> {
        self.chain.iter().map(|step| step.name.as_str()).collect()
    }
}

/// One step of a transform chain
///
/// In the descriptor a step is either a table `{ name = "url", options = { limit = 10000 } }`
/// or the loader shorthand `"url?limit=10000&mimetype=image/svg+xml"`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStep {
    /// Transform name, resolved through the transform registry
    pub name: String,
    /// Step options
    pub options: Map<String, Value>,
}

impl TransformStep {
    /// A step without options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Map::new(),
        }
    }

    /// Add an option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Parse the `name?key=value&flag` shorthand
    ///
    /// # Examples
    ///
    /// ```
    /// use assetpipe::config::TransformStep;
    ///
    /// let step = TransformStep::parse("url?limit=10000&mimetype=application/font-woff").unwrap();
    /// assert_eq!(step.name, "url");
    /// assert_eq!(step.option_u64("limit"), Some(10000));
    /// assert_eq!(step.option_str("mimetype"), Some("application/font-woff"));
    /// ```
    pub fn parse(shorthand: &str) -> Result<Self, String> {
        let (name, query) = match shorthand.split_once('?') {
            Some((name, query)) => (name.trim(), Some(query)),
            None => (shorthand.trim(), None),
        };
        if name.is_empty() {
            return Err(format!("transform step '{}' has no name", shorthand));
        }

        let mut step = Self::new(name);
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            if pair.is_empty() {
                continue;
            }
            match pair.split_once('=') {
                Some((key, value)) => {
                    step.options.insert(key.to_string(), parse_query_value(value));
                }
                None => {
                    step.options.insert(pair.to_string(), Value::Bool(true));
                }
            }
        }
        Ok(step)
    }

    /// Integer option
    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(Value::as_u64)
    }

    /// String option
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Boolean option
    pub fn option_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(Value::as_bool)
    }
}

fn parse_query_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Shorthand(String),
    Table {
        name: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Map<String, Value>,
    },
}

impl Serialize for TransformStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.options.is_empty() {
            StepRepr::Shorthand(self.name.clone()).serialize(serializer)
        } else {
            StepRepr::Table {
                name: self.name.clone(),
                options: self.options.clone(),
            }
            .serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for TransformStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StepRepr::deserialize(deserializer)? {
            StepRepr::Shorthand(text) => Self::parse(&text).map_err(serde::de::Error::custom),
            StepRepr::Table { name, options } => Ok(Self { name, options }),
        }
    }
}

/// Pre-transform static check gating the build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LintRule {
    /// Files to lint
    #[serde(default = "default_lint_test")]
    pub test: Pattern,

    /// Files never linted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,

    /// Linter configuration file, relative to the project root
    pub config: PathBuf,

    /// Linter executable
    #[serde(default = "default_lint_command")]
    pub command: String,

    /// Extra arguments placed before the file path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Abort the build when a file has warnings
    #[serde(default)]
    pub fail_on_warning: bool,

    /// Abort the build when a file has errors
    #[serde(default = "default_true")]
    pub fail_on_error: bool,
}

fn default_lint_test() -> Pattern {
    Pattern::new(r"\.jsx?$").expect("default lint pattern is valid")
}

fn default_lint_command() -> String {
    "eslint".to_string()
}

fn default_true() -> bool {
    true
}

impl LintRule {
    /// A lint rule with the default test pattern, command and flags
    pub fn new(config: impl Into<PathBuf>) -> Self {
        Self {
            test: default_lint_test(),
            exclude: None,
            config: config.into(),
            command: default_lint_command(),
            args: Vec::new(),
            fail_on_warning: false,
            fail_on_error: true,
        }
    }

    /// Whether `slash_path` is subject to linting
    pub fn covers(&self, slash_path: &str) -> bool {
        self.test.matches_str(slash_path)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.matches_str(slash_path))
    }

    /// Whether the gate can ever abort a build
    pub fn is_gating(&self) -> bool {
        self.fail_on_error || self.fail_on_warning
    }
}

/// Pre-serialized literal substituted for a defined global
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefineValue {
    /// Bare boolean, serialized as `true`/`false`
    Bool(bool),
    /// Bare integer
    Integer(i64),
    /// Bare float
    Float(f64),
    /// Final literal text, e.g. `"\"production\""`
    Literal(String),
}

impl DefineValue {
    /// Literal text from an already-serialized string
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Text substituted into bundled code
    pub fn literal_text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Literal(text) => text.clone(),
        }
    }
}

/// Static asset copy rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyRule {
    /// Source file, directory, or glob, relative to the project root
    pub from: String,

    /// Destination subdirectory of the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
}

impl CopyRule {
    /// Copy `from` into the output directory root
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: None,
        }
    }

    /// Copy into a subdirectory of the output directory
    pub fn to(mut self, to: impl Into<PathBuf>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Whether `from` contains glob metacharacters
    pub fn is_glob(&self) -> bool {
        self.from.contains(['*', '?', '[', '{'])
    }
}

/// External command backing a named transform step
///
/// The module's bytes are written to the command's stdin and its stdout
/// becomes the transformed module. `{file}` in `args` expands to the source
/// path and `{options}` to the step options as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalTransformer {
    /// Executable name or path
    pub command: String,
    /// Arguments, with `{file}` and `{options}` placeholders
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ExternalTransformer {
    /// A transformer invoking `command` with `args`
    pub fn new(command: impl Into<String>, args: &[&str]) -> Self {
        Self {
            command: command.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}
