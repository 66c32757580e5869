//! Ordered step execution with stop-on-first-failure semantics.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::key_gate::KeyVerificationGate;
use crate::domain::{
    CommandError, CommandSpec, FailurePolicy, ProvisionError, ProvisioningContext, ProvisioningStep,
    RunOutcome, StepStatus,
};

/// One entry of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Step(ProvisioningStep),
    VerifyKey(KeyVerificationGate),
}

impl Stage {
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Step(step) => step.name.clone(),
            Self::VerifyKey(gate) => gate.name(),
        }
    }
}

/// A planned run: stages execute strictly in order, one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPipeline {
    stages: Vec<Stage>,
}

impl StepPipeline {
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn extend_steps(&mut self, steps: impl IntoIterator<Item = ProvisioningStep>) {
        self.stages.extend(steps.into_iter().map(Stage::Step));
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// `(stage name, rendered command)` pairs for display; a verification
    /// gate contributes its fetch, store and inspect commands.
    #[must_use]
    pub fn describe(&self, ctx: &ProvisioningContext) -> Vec<(String, String)> {
        self.stages
            .iter()
            .flat_map(|stage| match stage {
                Stage::Step(step) => vec![(step.name.clone(), render(&step.command))],
                Stage::VerifyKey(gate) => {
                    let name = gate.name();
                    vec![
                        (name.clone(), gate.fetch_command(ctx).to_string()),
                        (name.clone(), gate.dearmor_command(ctx).to_string()),
                        (
                            name,
                            format!(
                                "{} | expect {}",
                                gate.inspect_command(),
                                gate.key().fingerprint
                            ),
                        ),
                    ]
                }
            })
            .collect()
    }

    /// Run every stage and fold the result into a `RunOutcome`.
    pub async fn run<R: CommandRunner>(
        &self,
        runner: &R,
        ctx: &mut ProvisioningContext,
        reporter: &impl ProgressReporter,
    ) -> RunOutcome {
        match self.execute(runner, ctx, reporter).await {
            Ok(()) => RunOutcome::success(),
            Err(e) => RunOutcome::aborted(&e),
        }
    }

    /// Run every stage, stopping at the first fatal failure.
    ///
    /// No resumption: a retried run re-executes from the first stage, which
    /// relies on every step being safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that failed fatally.
    pub async fn execute<R: CommandRunner>(
        &self,
        runner: &R,
        ctx: &mut ProvisioningContext,
        reporter: &impl ProgressReporter,
    ) -> Result<(), ProvisionError> {
        for stage in &self.stages {
            match stage {
                Stage::Step(step) => run_step(runner, ctx, reporter, step).await?,
                Stage::VerifyKey(gate) => {
                    let name = gate.name();
                    let result = gate.run(runner, ctx, reporter).await;
                    let status = if result.is_ok() {
                        StepStatus::Verified
                    } else {
                        StepStatus::Rejected
                    };
                    ctx.record(&name, status, None);
                    result?;
                }
            }
        }
        Ok(())
    }
}

/// Rendered command; a one-line stdin payload is shown after it.
fn render(command: &CommandSpec) -> String {
    let rendered = command.to_string();
    match command.stdin.as_deref().map(String::from_utf8_lossy) {
        Some(text) if text.trim_end().lines().count() == 1 => {
            format!("{rendered}: {}", text.trim_end())
        }
        _ => rendered,
    }
}

/// Execute one step and apply its failure policy.
///
/// # Errors
///
/// Returns the step's failure unless its policy swallows it.
pub async fn run_step<R: CommandRunner>(
    runner: &R,
    ctx: &mut ProvisioningContext,
    reporter: &impl ProgressReporter,
    step: &ProvisioningStep,
) -> Result<(), ProvisionError> {
    reporter.step(&format!("{}...", step.name));
    let command = ctx.prepare(&step.command);
    tracing::info!(step = %step.name, command = %command, "running step");

    let err = match runner.execute(&command, step.capture).await {
        Ok(result) => {
            ctx.record(&step.name, StepStatus::Succeeded, Some(result.exit_code));
            return Ok(());
        }
        Err(err) => err,
    };

    let exit_code = match &err {
        CommandError::Failed { exit_code, .. } => Some(*exit_code),
        _ => None,
    };

    let target_absent = step.policy == FailurePolicy::IgnoreMissing
        && matches!(&err, CommandError::Failed { result, .. } if result.reports_missing());
    if target_absent {
        tracing::debug!(step = %step.name, "cleanup target absent");
        ctx.record(&step.name, StepStatus::Skipped, exit_code);
        return Ok(());
    }

    if step.policy == FailurePolicy::Continue {
        tracing::warn!(step = %step.name, error = %err, "step failed, continuing");
        reporter.warn(&format!("{} failed, continuing: {err}", step.name));
        ctx.record(&step.name, StepStatus::Continued, exit_code);
        return Ok(());
    }

    tracing::error!(step = %step.name, error = %err, "step failed");
    ctx.record(&step.name, StepStatus::Failed, exit_code);
    Err(ProvisionError::from_command(&step.name, err))
}
