//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - Fixture projects with a descriptor and sources
//! - Assertion helpers for generated bundles
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures;
//!
//! let project = fixtures::web_project().unwrap();
//! ```

pub mod assertions;
pub mod fixtures;

/// Check if running in CI environment
#[allow(dead_code)]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
}
