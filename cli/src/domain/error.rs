//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, or `std::process`. Every error implements
//! `thiserror::Error` and converts to `anyhow::Error` via `?`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::command::CommandResult;

/// Generic failure code used when no external exit code is available.
pub const GENERIC_FAILURE_CODE: i32 = 1;

// ── Runner errors ─────────────────────────────────────────────────────────────

/// Failure reported by a `CommandRunner` for a single command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("could not start `{command}`: {reason}")]
    Launch { command: String, reason: String },

    #[error("`{command}` exited with status {exit_code}")]
    Failed {
        command: String,
        exit_code: i32,
        result: CommandResult,
    },

    #[error("`{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// The input artifact a preflight check was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Certificate,
    Key,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Certificate => f.write_str("certificate"),
            Self::Key => f.write_str("key"),
        }
    }
}

/// Fatal failures of a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{which} file not found: {}\n\nUsage: plus-provision <CERT> <KEY>", path.display())]
    MissingArtifact { which: ArtifactKind, path: PathBuf },

    #[error("step '{step}' could not start `{command}`: {reason}")]
    LaunchError {
        step: String,
        command: String,
        reason: String,
    },

    #[error("step '{step}' failed with exit code {exit_code}: `{command}`\n{stderr}")]
    CommandFailed {
        step: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("step '{step}' timed out after {secs}s: `{command}`")]
    TimedOut {
        step: String,
        command: String,
        secs: u64,
    },

    #[error(
        "verification failed: signing key '{key}' does not carry fingerprint {fingerprint}. \
         Removed {}; re-run once the key source is trustworthy.",
        keyring.display()
    )]
    VerificationRejected {
        key: String,
        fingerprint: String,
        keyring: PathBuf,
    },

    #[error(
        "cannot determine the distribution codename. \
         Set distribution_codename in the config file or pass --codename."
    )]
    UnknownDistribution,

    #[error("cannot inspect {}: {reason}", path.display())]
    Inspection { path: PathBuf, reason: String },
}

impl ProvisionError {
    /// Attribute a runner failure to the named step.
    #[must_use]
    pub fn from_command(step: &str, err: CommandError) -> Self {
        match err {
            CommandError::Launch { command, reason } => Self::LaunchError {
                step: step.to_owned(),
                command,
                reason,
            },
            CommandError::Failed {
                command,
                exit_code,
                result,
            } => Self::CommandFailed {
                step: step.to_owned(),
                command,
                exit_code,
                stderr: result.stderr.trim_end().to_owned(),
            },
            CommandError::TimedOut { command, secs } => Self::TimedOut {
                step: step.to_owned(),
                command,
                secs,
            },
        }
    }

    /// Process exit code for this failure.
    ///
    /// A failing external command propagates its own status (clamped into
    /// `1..=255`); everything else maps to [`GENERIC_FAILURE_CODE`].
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { exit_code, .. } if (1..=255).contains(exit_code) => *exit_code,
            _ => GENERIC_FAILURE_CODE,
        }
    }

    /// Short reason recorded in the run outcome.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::MissingArtifact { which, path } => {
                format!("{which} file not found: {}", path.display())
            }
            Self::LaunchError { step, .. } => format!("step '{step}' could not start"),
            Self::CommandFailed {
                step, exit_code, ..
            } => format!("step '{step}' failed with exit code {exit_code}"),
            Self::TimedOut { step, secs, .. } => format!("step '{step}' timed out after {secs}s"),
            Self::VerificationRejected { .. } => "verification failed".to_owned(),
            Self::UnknownDistribution => "unknown distribution codename".to_owned(),
            Self::Inspection { path, .. } => format!("cannot inspect {}", path.display()),
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating a `ProvisionConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid fingerprint for signing key '{key}': {value}\n\nExpected 40 or 64 hexadecimal characters.")]
    InvalidFingerprint { key: String, value: String },

    #[error("Repository '{repository}' is signed by unknown key '{key}'.\n\nConfigured keys: {valid}")]
    UnknownSigningKey {
        repository: String,
        key: String,
        valid: String,
    },

    #[error("At least one signing key must be configured.")]
    NoSigningKeys,

    #[error("{what} name must not be empty.")]
    EmptyName { what: &'static str },

    #[error("Signing key name '{name}' is not allowed.\n\nUse letters, digits, '.', '_' and '-' only.")]
    InvalidKeyName { name: String },

    #[error("Invalid stale configuration pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("step_timeout_secs must be greater than zero.")]
    ZeroTimeout,
}
