//! JSON output helpers for `--json` runs.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{ProvisioningContext, RunOutcome, StepRecord};

/// Machine-readable summary of a finished run.
///
/// ```json
/// {
///   "status": "aborted",
///   "reason": "verification failed",
///   "exit_code": 1,
///   "installed_version": null,
///   "steps": [ ... ]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    #[serde(flatten)]
    pub outcome: &'a RunOutcome,
    pub installed_version: Option<&'a str>,
    pub steps: &'a [StepRecord],
}

impl<'a> RunReport<'a> {
    #[must_use]
    pub fn new(outcome: &'a RunOutcome, ctx: &'a ProvisioningContext) -> Self {
        Self {
            outcome,
            installed_version: ctx.installed_version.as_deref(),
            steps: &ctx.log,
        }
    }
}

/// Pretty-print a run report.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &RunReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).context("JSON serialization failed")
}

/// Format a dry-run plan as an array of `{"name", "command"}` objects.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_plan(lines: &[(String, String)]) -> Result<String> {
    let steps: Vec<_> = lines
        .iter()
        .map(|(name, command)| serde_json::json!({ "name": name, "command": command }))
        .collect();
    serde_json::to_string_pretty(&steps).context("JSON serialization failed")
}

/// Format a JSON error object for failures that happen before a run starts.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: i32) -> Result<String> {
    let obj = serde_json::json!({
        "status": "aborted",
        "reason": message,
        "exit_code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
