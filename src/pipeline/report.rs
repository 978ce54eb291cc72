//! Build and dry-run reports

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use super::copy::CopyTask;
use crate::config::ValidationIssue;

/// One written bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    /// Entry name
    pub name: String,
    /// Bundle file
    pub path: PathBuf,
    /// Bundle size in bytes
    pub size: u64,
    /// Modules rendered into the bundle, dedupe aliases included
    pub modules: usize,
    /// External source map, if written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<PathBuf>,
}

/// Outcome of a successful build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    /// Bundles in entry declaration order
    pub bundles: Vec<BundleReport>,
    /// Files emitted by transforms
    pub assets: Vec<PathBuf>,
    /// Files written by copy rules
    pub copied: Vec<PathBuf>,
    /// Non-fatal validation issues
    pub warnings: Vec<ValidationIssue>,
    /// Wall-clock build time in milliseconds
    pub duration_ms: u64,
}

impl BuildReport {
    /// Build time
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Sum of all bundle sizes
    pub fn total_bundle_bytes(&self) -> u64 {
        self.bundles.iter().map(|b| b.size).sum()
    }
}

/// A bundle a build would write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBundle {
    /// Entry name
    pub name: String,
    /// Resolved entry module
    pub entry: PathBuf,
    /// Bundle file
    pub output: PathBuf,
}

/// Outcome of a dry run: validation and planning only
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildPlan {
    /// Bundles in entry declaration order
    pub bundles: Vec<PlannedBundle>,
    /// Files copy rules would write
    pub copies: Vec<CopyTask>,
    /// Non-fatal validation issues
    pub warnings: Vec<ValidationIssue>,
}
