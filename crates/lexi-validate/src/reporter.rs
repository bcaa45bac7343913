//! Validation Report Generation
//!
//! Generates reports in two formats:
//! - JSON for machine consumers
//! - Human-readable for terminal output

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::result::{Finding, ValidationResult};
use crate::rules::ValidationMode;

/// Validation report for one record
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Timestamp of the validation run (RFC 3339, UTC)
    pub timestamp: String,
    /// Record the report is about
    pub entry_id: String,
    pub mode: ValidationMode,
    pub summary: ValidationSummary,
    pub result: ValidationResult,
}

/// Summary of validation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub critical: usize,
    pub warnings: usize,
    pub info: usize,
    pub total: usize,
    /// Whether the record passed (no critical findings)
    pub passed: bool,
}

impl ValidationSummary {
    pub fn of(result: &ValidationResult) -> Self {
        Self {
            critical: result.errors().len(),
            warnings: result.warnings().len(),
            info: result.info().len(),
            total: result.error_count(),
            passed: result.is_valid(),
        }
    }
}

/// Report generator
pub struct Reporter;

impl Reporter {
    /// Wrap a result in a timestamped report
    pub fn report(
        entry_id: impl Into<String>,
        mode: ValidationMode,
        result: ValidationResult,
    ) -> ValidationReport {
        ValidationReport {
            timestamp: Utc::now().to_rfc3339(),
            entry_id: entry_id.into(),
            mode,
            summary: ValidationSummary::of(&result),
            result,
        }
    }

    /// Generate JSON report
    pub fn to_json(report: &ValidationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Generate JSON for a batch, keyed like the batch results
    pub fn set_to_json(reports: &[ValidationReport]) -> String {
        serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
    }

    /// Generate human-readable report
    pub fn to_human_readable(report: &ValidationReport) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "=== Entry Validation Report: {} ===", report.entry_id);
        let _ = writeln!(output, "Timestamp: {}", report.timestamp);
        let _ = writeln!(output, "Mode: {}\n", report.mode);
        write_findings(&mut output, &report.result);

        let summary = &report.summary;
        let _ = writeln!(
            output,
            "--- Summary: {} critical, {} warnings, {} info ---",
            summary.critical, summary.warnings, summary.info
        );
        if summary.passed {
            output.push_str("Result: PASSED\n");
        } else {
            output.push_str("Result: FAILED\n");
        }
        output
    }

    /// Human-readable report for a batch
    pub fn set_to_human_readable(
        results: &BTreeMap<String, ValidationResult>,
        mode: ValidationMode,
    ) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "=== Entry Validation Report ===");
        let _ = writeln!(output, "Timestamp: {}", Utc::now().to_rfc3339());
        let _ = writeln!(output, "Mode: {mode}");
        let _ = writeln!(output, "Records: {}\n", results.len());

        let mut failed = 0;
        for (entry_id, result) in results {
            let status = if result.is_valid() { "ok" } else { "FAILED" };
            let _ = writeln!(
                output,
                "## {entry_id} [{status}] ({} findings)",
                result.error_count()
            );
            write_findings(&mut output, result);
            if !result.is_valid() {
                failed += 1;
            }
        }

        let _ = writeln!(
            output,
            "--- Summary: {failed} of {} records failed ---",
            results.len()
        );
        output
    }
}

fn write_findings(output: &mut String, result: &ValidationResult) {
    if result.error_count() == 0 {
        output.push_str("No findings.\n\n");
        return;
    }
    for (heading, findings) in [
        ("Critical", result.errors()),
        ("Warnings", result.warnings()),
        ("Info", result.info()),
    ] {
        if findings.is_empty() {
            continue;
        }
        let _ = writeln!(output, "{heading} ({}):", findings.len());
        for finding in findings {
            write_finding(output, finding);
        }
        output.push('\n');
    }
}

fn write_finding(output: &mut String, finding: &Finding) {
    let _ = writeln!(
        output,
        "  [{}] {} ({}) at {}",
        finding.rule_id, finding.rule_name, finding.category, finding.path
    );
    let _ = writeln!(output, "      {}", finding.message);
}
