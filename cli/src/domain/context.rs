//! Run-scoped provisioning state.

use std::path::PathBuf;

use chrono::Utc;

use crate::domain::command::CommandSpec;
use crate::domain::step::{StepRecord, StepStatus};

/// Mutable state owned by the orchestrator for the duration of one run.
///
/// Working directory and environment are explicit here instead of being read
/// from the process: every command is prepared against this context.
#[derive(Debug, Clone)]
pub struct ProvisioningContext {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub working_directory: PathBuf,
    /// Private directory for downloaded, not yet verified key material.
    pub scratch_dir: PathBuf,
    pub env: Vec<(String, String)>,
    pub log: Vec<StepRecord>,
    pub installed_version: Option<String>,
}

impl ProvisioningContext {
    /// Relative artifact paths are resolved against `working_directory`.
    pub fn new(
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
        working_directory: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        let working_directory = working_directory.into();
        Self {
            cert_path: working_directory.join(cert_path.into()),
            key_path: working_directory.join(key_path.into()),
            working_directory,
            scratch_dir: scratch_dir.into(),
            env: Vec::new(),
            log: Vec::new(),
            installed_version: None,
        }
    }

    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Bind a command to this run's working directory and environment.
    ///
    /// `sudo` resets the environment, so privileged commands get an explicit
    /// `--preserve-env` list.
    #[must_use]
    pub fn prepare(&self, command: &CommandSpec) -> CommandSpec {
        let mut prepared = command.clone();
        prepared.current_dir = Some(self.working_directory.clone());
        prepared.env.extend(self.env.iter().cloned());
        if prepared.is_privileged() && !self.env.is_empty() {
            let keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
            prepared
                .args
                .insert(0, format!("--preserve-env={}", keys.join(",")));
        }
        prepared
    }

    pub fn record(&mut self, name: &str, status: StepStatus, exit_code: Option<i32>) {
        self.log.push(StepRecord {
            name: name.to_owned(),
            status,
            exit_code,
            finished_at: Utc::now(),
        });
    }
}
