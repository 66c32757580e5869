//! Human-readable terminal renderer.

use crate::application::services::pipeline::StepPipeline;
use crate::domain::ProvisioningContext;
use crate::output::OutputContext;

/// Renders plans and run results as human-readable terminal output.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render a planned pipeline without running it (`--dry-run`).
    pub fn render_plan(&self, pipeline: &StepPipeline, run: &ProvisioningContext) {
        self.ctx.header("Provisioning plan:");
        for (i, (name, command)) in plan_lines(pipeline, run).iter().enumerate() {
            self.ctx.kv(&format!("{:>2}. {name}", i + 1), command);
        }
    }

    /// Render the installed App Protect version.
    pub fn render_version(&self, version: Option<&str>) {
        self.ctx.header("NGINX App Protect Version Information");
        self.ctx.kv(
            "App Protect Version:",
            version.unwrap_or("App Protect version not found"),
        );
    }
}

/// `(name, command)` rows in execution order.
#[must_use]
pub fn plan_lines(pipeline: &StepPipeline, run: &ProvisioningContext) -> Vec<(String, String)> {
    pipeline.describe(run)
}
