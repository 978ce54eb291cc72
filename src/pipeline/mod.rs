//! Build pipeline
//!
//! Implements one build invocation over a validated descriptor:
//! 1. validation and copy planning (nothing written)
//! 2. module loading: lint gate, transform chain, defined globals
//! 3. bundle assembly through a [`BundlingEngine`], entries in parallel
//! 4. optimization passes and rendering
//! 5. writing bundles and emitted assets, then copying static assets

pub mod build_orchestrator;
pub mod copy;
pub mod define;
pub mod engine;
pub mod error;
pub mod executor;
pub mod lint;
pub mod loader;
pub mod optimize;
pub mod render;
pub mod report;
pub mod resolver;
pub mod result_formatter;
pub mod rules;
pub mod sourcemap;
pub mod syntax;
pub mod transform;

pub use build_orchestrator::BuildOrchestrator;
pub use copy::{CopyExecutor, CopyPlanner, CopyTask};
pub use define::DefineTable;
pub use engine::{Bundle, BundlingEngine, CommonJsEngine, EntryPlan, LoadedModule, Module, ModuleLoader};
pub use error::BuildError;
pub use executor::BuildPipeline;
pub use lint::{CommandLinter, LintGate, LintMessage, LintReport, LintSeverity, Linter};
pub use loader::ModuleCache;
pub use render::{render, RenderedBundle};
pub use report::{BuildPlan, BuildReport, BundleReport, PlannedBundle};
pub use resolver::Resolver;
pub use result_formatter::ResultFormatter;
pub use rules::{RuleSet, Selection};
pub use transform::{
    EmittedAsset, ModuleContent, Transform, TransformContext, TransformRegistry, TransformedModule,
};
