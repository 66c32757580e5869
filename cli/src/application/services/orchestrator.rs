//! Application service — the provisioning use-case.
//!
//! Composes preflight, planning, the step pipeline (key gates included) and
//! post-install verification in a fixed order. All I/O is routed through
//! injected port traits.

use crate::application::ports::{CommandRunner, HostFs, ProgressReporter};
use crate::application::services::pipeline::StepPipeline;
use crate::application::services::{plan, post_install, preflight};
use crate::domain::{ProvisionConfig, ProvisionError, ProvisioningContext, RunOutcome};

pub struct Orchestrator<'a, R, F, P> {
    runner: &'a R,
    fs: &'a F,
    reporter: &'a P,
    config: &'a ProvisionConfig,
}

impl<'a, R, F, P> Orchestrator<'a, R, F, P>
where
    R: CommandRunner,
    F: HostFs,
    P: ProgressReporter,
{
    pub fn new(runner: &'a R, fs: &'a F, reporter: &'a P, config: &'a ProvisionConfig) -> Self {
        Self {
            runner,
            fs,
            reporter,
            config,
        }
    }

    /// Run preflight and build the pipeline without executing anything.
    ///
    /// # Errors
    ///
    /// Returns preflight failures (`MissingArtifact`, `UnknownDistribution`)
    /// or planning failures.
    pub fn plan(&self, ctx: &ProvisioningContext) -> Result<StepPipeline, ProvisionError> {
        preflight::validate(self.fs, &ctx.cert_path, &ctx.key_path)?;
        let codename = preflight::resolve_codename(self.fs, self.config)?;
        tracing::debug!(%codename, "distribution codename resolved");
        plan::build_pipeline(self.config, ctx, &codename, self.fs)
    }

    /// Provision the host.
    ///
    /// Failures are reported through the progress reporter with full detail
    /// and folded into the returned outcome.
    pub async fn run(&self, ctx: &mut ProvisioningContext) -> RunOutcome {
        match self.provision(ctx).await {
            Ok(()) => {
                self.reporter.success("provisioning complete");
                RunOutcome::success()
            }
            Err(e) => {
                self.reporter.error(&e.to_string());
                let outcome = RunOutcome::aborted(&e);
                tracing::error!(exit_code = outcome.exit_code, reason = ?outcome.reason(), "provisioning aborted");
                outcome
            }
        }
    }

    async fn provision(&self, ctx: &mut ProvisioningContext) -> Result<(), ProvisionError> {
        self.reporter.step("checking input artifacts...");
        let pipeline = self.plan(ctx)?;
        tracing::info!(stages = pipeline.stages().len(), "pipeline planned");

        pipeline.execute(self.runner, ctx, self.reporter).await?;

        ctx.installed_version = post_install::query_installed_version(
            self.runner,
            ctx,
            self.reporter,
            &self.config.version_package,
        )
        .await;
        Ok(())
    }
}
