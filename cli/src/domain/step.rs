//! Provisioning steps and the per-run step log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::command::{Capture, CommandSpec};

/// What the pipeline does when a step's command fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run.
    #[default]
    Abort,
    /// Best-effort cleanup: "not found" failures are swallowed, anything
    /// else stops the run.
    IgnoreMissing,
    /// Log the failure and keep going.
    Continue,
}

/// A named unit of work, executed exactly once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningStep {
    pub name: String,
    pub command: CommandSpec,
    pub capture: Capture,
    pub policy: FailurePolicy,
}

impl ProvisioningStep {
    /// A fatal-on-failure step whose output is buffered.
    pub fn new(name: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            name: name.into(),
            command,
            capture: Capture::Buffered,
            policy: FailurePolicy::Abort,
        }
    }

    /// A fatal-on-failure step that streams to the operator console.
    pub fn streamed(name: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            capture: Capture::Streamed,
            ..Self::new(name, command)
        }
    }

    /// A best-effort cleanup step; output must be buffered so a missing
    /// target can be told apart from other failures.
    pub fn cleanup(name: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            policy: FailurePolicy::IgnoreMissing,
            ..Self::new(name, command)
        }
    }

    #[must_use]
    pub fn allow_continue_on_failure(mut self) -> Self {
        self.policy = FailurePolicy::Continue;
        self
    }
}

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    /// Cleanup target did not exist.
    Skipped,
    /// Failed under `FailurePolicy::Continue`.
    Continued,
    Failed,
    Verified,
    Rejected,
}

/// One entry of the accumulated run log.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub finished_at: DateTime<Utc>,
}
