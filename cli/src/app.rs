//! Application context — unified state handed to the provisioning command.
//!
//! `AppContext` owns the production adapters so `Cli::run()` wires them
//! once instead of constructing loose runners and stores per call site.

use std::time::Duration;

use crate::domain::ProvisionConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::LocalFs;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Process runner bounded by the configured step timeout.
    pub runner: TokioCommandRunner,
    pub fs: LocalFs,
    /// Effective configuration after CLI overrides.
    pub config: ProvisionConfig,
}

impl AppContext {
    /// JSON mode implies quiet terminal output so stdout stays parseable.
    #[must_use]
    pub fn new(flags: &OutputFlags, config: ProvisionConfig) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let quiet = flags.quiet || flags.json;
        Self {
            output: OutputContext::new(flags.no_color, quiet),
            mode,
            runner: TokioCommandRunner::new(Duration::from_secs(config.step_timeout_secs)),
            fs: LocalFs,
            config,
        }
    }
}
