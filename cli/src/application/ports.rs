//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::cli`, or `crate::output`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{Capture, CommandError, CommandResult, CommandSpec, ProvisionConfig};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Executes one external command and waits for it to exit.
///
/// Commands mutate shared host state (package database, trust store), so
/// callers must await each one before starting the next.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `command` with the given output handling.
    ///
    /// # Errors
    ///
    /// - `CommandError::Launch` if the process cannot be started.
    /// - `CommandError::Failed` if it exits non-zero (the captured result
    ///   travels with the error; fatality is the caller's decision).
    /// - `CommandError::TimedOut` if it outlives the runner's timeout; the
    ///   child is killed.
    async fn execute(
        &self,
        command: &CommandSpec,
        capture: Capture,
    ) -> Result<CommandResult, CommandError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit an error message. Never suppressed.
    fn error(&self, message: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Read-only host filesystem queries used before any mutation.
pub trait HostFs {
    /// `true` if `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read a UTF-8 text file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// File names in `dir`. A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading of the provisioning configuration.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<ProvisionConfig>;

    /// Path the configuration is read from.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration directory can be determined.
    fn path(&self) -> Result<PathBuf>;
}
