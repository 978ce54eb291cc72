//! Build result formatting and display

use console::style;
use std::path::Path;
use sugar_path::SugarPath;

use super::report::{BuildPlan, BuildReport};
use crate::config::{ValidationIssue, ValidationSeverity};
use crate::fmt::{format_bytes, format_duration, CHECK, FOLDER, INFO, PACKAGE, SPARKLES, WARNING};

/// Formats and displays build results
pub struct ResultFormatter;

impl ResultFormatter {
    /// Summary of a finished build, paths shown relative to `root`
    pub fn format_report(report: &BuildReport, root: &Path) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n{}{}\n", PACKAGE, style("Bundles").bold()));
        for bundle in &report.bundles {
            out.push_str(&format!(
                "   {} {} {} ({}, {} modules)\n",
                style(CHECK).green(),
                style(&bundle.name).cyan(),
                display(&bundle.path, root),
                style(format_bytes(bundle.size)).yellow(),
                bundle.modules
            ));
            if let Some(map) = &bundle.source_map {
                out.push_str(&format!("     {} {}\n", style("map").dim(), display(map, root)));
            }
        }

        if !report.assets.is_empty() {
            out.push_str(&format!("\n{}{} emitted asset(s)\n", FOLDER, report.assets.len()));
            for asset in &report.assets {
                out.push_str(&format!("   {} {}\n", style("→").dim(), display(asset, root)));
            }
        }
        if !report.copied.is_empty() {
            out.push_str(&format!("\n{}{} file(s) copied\n", FOLDER, report.copied.len()));
        }
        out.push_str(&Self::format_issues(&report.warnings));

        out.push_str(&format!(
            "\n{}{} {} in {}\n",
            SPARKLES,
            style("Build complete!").green().bold(),
            format_bytes(report.total_bundle_bytes()),
            format_duration(report.duration())
        ));
        out
    }

    /// Summary of a dry run
    pub fn format_plan(plan: &BuildPlan, root: &Path) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n{}{}\n", PACKAGE, style("Would write").bold()));
        for bundle in &plan.bundles {
            out.push_str(&format!(
                "   {} {} {} <- {}\n",
                style(CHECK).green(),
                style(&bundle.name).cyan(),
                display(&bundle.output, root),
                display(&bundle.entry, root)
            ));
        }
        if !plan.copies.is_empty() {
            out.push_str(&format!("\n{}{}\n", FOLDER, style("Would copy").bold()));
            for task in &plan.copies {
                out.push_str(&format!(
                    "   {} {} -> {}\n",
                    style("→").dim(),
                    display(&task.source, root),
                    display(&task.destination, root)
                ));
            }
        }
        out.push_str(&Self::format_issues(&plan.warnings));
        out
    }

    /// Warnings and notes left after a passing validation
    pub fn format_issues(issues: &[ValidationIssue]) -> String {
        let mut out = String::new();
        for issue in issues {
            let marker = match issue.severity {
                ValidationSeverity::Error => continue,
                ValidationSeverity::Warning => WARNING,
                ValidationSeverity::Info => INFO,
            };
            out.push_str(&format!(
                "{}{}: {}\n",
                marker,
                style(&issue.field).bold(),
                issue.message
            ));
        }
        if !out.is_empty() {
            out.insert(0, '\n');
        }
        out
    }

    /// Print a formatted summary of a build
    pub fn print_summary(report: &BuildReport, root: &Path) {
        print!("{}", Self::format_report(report, root));
    }

    /// Print a formatted summary of a dry run
    pub fn print_plan(plan: &BuildPlan, root: &Path) {
        print!("{}", Self::format_plan(plan, root));
    }
}

fn display(path: &Path, root: &Path) -> String {
    if path.starts_with(root) {
        path.relative(root).display().to_string()
    } else {
        path.display().to_string()
    }
}
