//! Post-install verification: report the installed package version.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::version::installed_version;
use crate::domain::{Capture, CommandSpec, ProvisioningContext};

/// Query the package database for `package`'s installed version.
///
/// A missing or unparseable version is a warning, never a failure: the host
/// may still be correctly provisioned.
pub async fn query_installed_version<R: CommandRunner>(
    runner: &R,
    ctx: &ProvisioningContext,
    reporter: &impl ProgressReporter,
    package: &str,
) -> Option<String> {
    let command = ctx.prepare(&CommandSpec::new("dpkg", ["-l", package]));
    let listing = match runner.execute(&command, Capture::Buffered).await {
        Ok(result) => result.stdout,
        Err(e) => {
            tracing::warn!(package, error = %e, "version query failed");
            String::new()
        }
    };
    let version = installed_version(&listing, package);
    match &version {
        Some(v) => tracing::info!(package, version = %v, "installed version"),
        None => reporter.warn(&format!("{package} version not found")),
    }
    version
}
