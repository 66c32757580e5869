//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use crate::app::{AppContext, OutputFlags, OutputMode};
use crate::application::ports::ConfigStore;
use crate::application::services::orchestrator::Orchestrator;
use crate::domain::{ProvisionConfig, ProvisionError, ProvisioningContext, RunOutcome};
use crate::infra::config::{CONFIG_ENV, YamlConfigStore};
use crate::output::human::{HumanRenderer, plan_lines};
use crate::output::json::{self, RunReport};
use crate::output::reporter::TerminalReporter;

/// Provision an Ubuntu host with NGINX Plus and App Protect WAF
#[derive(Parser)]
#[command(name = "plus-provision", version)]
pub struct Cli {
    /// Repository client certificate (e.g. nginx-repo.crt)
    #[arg(value_name = "CERT")]
    pub cert: PathBuf,

    /// Repository client key (e.g. nginx-repo.key)
    #[arg(value_name = "KEY")]
    pub key: PathBuf,

    /// Configuration file
    #[arg(long, value_name = "PATH", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Also deploy the containerized WAF companion services
    #[arg(long)]
    pub with_companion: bool,

    /// Stop and disable a conflicting service before installation (repeatable)
    #[arg(long, value_name = "UNIT")]
    pub disable_service: Vec<String>,

    /// Run privileged commands without sudo (already root)
    #[arg(long)]
    pub no_sudo: bool,

    /// Distribution codename, instead of reading /etc/os-release
    #[arg(long, value_name = "NAME")]
    pub codename: Option<String>,

    /// Validate inputs and print the planned steps without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output (also disabled when NO_COLOR is set)
    #[arg(long)]
    pub no_color: bool,

    /// Increase diagnostic logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ProvisionConfig) {
        if self.with_companion {
            config.companion.enabled = true;
        }
        if self.no_sudo {
            config.use_sudo = false;
        }
        if let Some(codename) = &self.codename {
            config.distribution_codename = Some(codename.clone());
        }
        for unit in &self.disable_service {
            if !config.disable_services.contains(unit) {
                config.disable_services.push(unit.clone());
            }
        }
    }

    /// Execute the provisioning run and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid, or
    /// if the scratch directory cannot be created. Provisioning failures are
    /// not errors here: they are reported and mapped to the exit code.
    pub async fn run(self) -> Result<i32> {
        let store = YamlConfigStore::new(self.config.clone());
        let mut config = store.load()?;
        self.apply_overrides(&mut config);
        config.validate().context("invalid configuration")?;

        let app = AppContext::new(
            &OutputFlags {
                no_color: self.no_color,
                quiet: self.quiet,
                json: self.json,
            },
            config,
        );

        let scratch = tempfile::Builder::new()
            .prefix("plus-provision-")
            .tempdir()
            .context("cannot create scratch directory")?;
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let mut ctx = ProvisioningContext::new(self.cert, self.key, cwd, scratch.path())
            .with_env("DEBIAN_FRONTEND", "noninteractive");

        let reporter = TerminalReporter::new(&app.output);
        let orchestrator = Orchestrator::new(&app.runner, &app.fs, &reporter, &app.config);

        if self.dry_run {
            return match orchestrator.plan(&ctx) {
                Ok(pipeline) => {
                    match app.mode {
                        OutputMode::Json => {
                            println!("{}", json::format_plan(&plan_lines(&pipeline, &ctx))?);
                        }
                        OutputMode::Human => {
                            HumanRenderer::new(&app.output).render_plan(&pipeline, &ctx);
                        }
                    }
                    Ok(0)
                }
                Err(e) => report_preflight_failure(&app, &e),
            };
        }

        let outcome = orchestrator.run(&mut ctx).await;
        report(&app, &outcome, &ctx)?;
        Ok(outcome.exit_code)
    }
}

fn report_preflight_failure(app: &AppContext, err: &ProvisionError) -> Result<i32> {
    app.output.error(&err.to_string());
    if app.mode == OutputMode::Json {
        println!("{}", json::format_error(&err.summary(), err.exit_code())?);
    }
    Ok(err.exit_code())
}

fn report(app: &AppContext, outcome: &RunOutcome, ctx: &ProvisioningContext) -> Result<()> {
    match app.mode {
        OutputMode::Json => {
            println!("{}", json::format_report(&RunReport::new(outcome, ctx))?);
        }
        OutputMode::Human => {
            if outcome.is_success() {
                HumanRenderer::new(&app.output).render_version(ctx.installed_version.as_deref());
            }
        }
    }
    Ok(())
}
