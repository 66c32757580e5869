//! Terminal result of a provisioning run.

use serde::Serialize;

use crate::domain::error::ProvisionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Aborted { reason: String },
}

/// Final status and the process exit code it maps to. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    #[serde(flatten)]
    pub status: RunStatus,
    pub exit_code: i32,
}

impl RunOutcome {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: RunStatus::Success,
            exit_code: 0,
        }
    }

    #[must_use]
    pub fn aborted(err: &ProvisionError) -> Self {
        Self {
            status: RunStatus::Aborted {
                reason: err.summary(),
            },
            exit_code: err.exit_code(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Abort reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Success => None,
            RunStatus::Aborted { reason } => Some(reason),
        }
    }
}
