//! Builds the ordered provisioning pipeline from configuration.
//!
//! Planning is read-only: stale-configuration wildcards are expanded by
//! listing their directories, so the full step list is known before the
//! first command runs.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::BTreeSet;

use crate::application::ports::HostFs;
use crate::application::services::companion::companion_steps;
use crate::application::services::key_gate::KeyVerificationGate;
use crate::application::services::pipeline::{Stage, StepPipeline};
use crate::domain::{
    CommandSpec, ProvisionConfig, ProvisionError, ProvisioningContext, ProvisioningStep,
};

/// Assemble the full pipeline.
///
/// Order: trust directory → artifact placement → stale cleanup → conflicting
/// services → prerequisites → key gates → repository registration → index
/// refresh → package install → service start → companion (optional).
///
/// # Errors
///
/// Returns `ProvisionError::Inspection` if a stale-configuration directory
/// cannot be listed, or the config's stale patterns are invalid.
pub fn build_pipeline(
    config: &ProvisionConfig,
    ctx: &ProvisioningContext,
    codename: &str,
    fs: &impl HostFs,
) -> Result<StepPipeline, ProvisionError> {
    let sudo = config.use_sudo;
    let mut pipeline = StepPipeline::default();

    // ── Trust material ───────────────────────────────────────────────────────
    let trust_dir = config.trust_dir.display().to_string();
    pipeline.extend_steps([
        ProvisioningStep::new(
            "create trust directory",
            CommandSpec::privileged(sudo, "mkdir", ["-p".to_owned(), trust_dir]),
        ),
        ProvisioningStep::new(
            "install client certificate",
            CommandSpec::privileged(
                sudo,
                "cp",
                [
                    ctx.cert_path.display().to_string(),
                    config.installed_certificate().display().to_string(),
                ],
            ),
        ),
        ProvisioningStep::new(
            "install client key",
            CommandSpec::privileged(
                sudo,
                "cp",
                [
                    ctx.key_path.display().to_string(),
                    config.installed_key().display().to_string(),
                ],
            ),
        ),
    ]);

    // ── Stale repository configuration ───────────────────────────────────────
    let patterns = config
        .stale_patterns()
        .map_err(|e| ProvisionError::Inspection {
            path: config.trust_dir.clone(),
            reason: e.to_string(),
        })?;
    let mut seen = BTreeSet::new();
    for pattern in patterns {
        let listing = if pattern.is_wildcard() {
            fs.list_dir(pattern.directory())
                .map_err(|e| ProvisionError::Inspection {
                    path: pattern.directory().to_path_buf(),
                    reason: format!("{e:#}"),
                })?
        } else {
            Vec::new()
        };
        let targets = pattern.targets(&listing).into_iter();
        pipeline.extend_steps(targets.filter(|t| seen.insert(t.clone())).map(|target| {
            ProvisioningStep::cleanup(
                format!("remove stale {}", target.display()),
                CommandSpec::privileged(
                    sudo,
                    "rm",
                    ["-f".to_owned(), target.display().to_string()],
                ),
            )
        }));
    }

    // ── Conflicting services ─────────────────────────────────────────────────
    pipeline.extend_steps(config.disable_services.iter().map(|unit| {
        ProvisioningStep::new(
            format!("disable conflicting service {unit}"),
            CommandSpec::privileged(
                sudo,
                "systemctl",
                ["disable".to_owned(), "--now".to_owned(), unit.clone()],
            ),
        )
    }));

    // ── Prerequisites ────────────────────────────────────────────────────────
    pipeline.push(Stage::Step(refresh_index(sudo)));
    pipeline.push(Stage::Step(install("install prerequisites", sudo, &config.prerequisites)));

    // ── Signing keys ─────────────────────────────────────────────────────────
    for key in &config.signing_keys {
        pipeline.push(Stage::VerifyKey(KeyVerificationGate::new(key.clone(), sudo)));
    }

    // ── Repository registration ──────────────────────────────────────────────
    pipeline.push(Stage::Step(ProvisioningStep::new(
        "install package manager configuration",
        CommandSpec::privileged(
            sudo,
            "curl",
            [
                "-fsS".to_owned(),
                "--output".to_owned(),
                config.package_config.path.display().to_string(),
                config.package_config.url.clone(),
            ],
        ),
    )));
    for repo in &config.repositories {
        // validate() guarantees the key exists.
        let Some(key) = config.signing_key(&repo.signed_by) else {
            continue;
        };
        pipeline.push(Stage::Step(ProvisioningStep::new(
            format!("register repository {}", repo.name),
            CommandSpec::privileged(sudo, "tee", [repo.list_file.display().to_string()])
                .with_stdin(repo.source_line(&key.keyring, codename)),
        )));
    }

    // ── Packages ─────────────────────────────────────────────────────────────
    pipeline.push(Stage::Step(refresh_index(sudo)));
    pipeline.push(Stage::Step(install("install packages", sudo, &config.packages)));
    pipeline.extend_steps(config.start_services.iter().map(|unit| {
        ProvisioningStep::new(
            format!("start {unit}"),
            CommandSpec::privileged(sudo, "systemctl", ["start".to_owned(), unit.clone()]),
        )
    }));

    // ── Companion deployment ─────────────────────────────────────────────────
    if config.companion.enabled {
        pipeline.extend_steps(companion_steps(config));
    }

    Ok(pipeline)
}

fn refresh_index(sudo: bool) -> ProvisioningStep {
    ProvisioningStep::streamed(
        "refresh package index",
        CommandSpec::privileged(sudo, "apt-get", ["update"]),
    )
}

fn install(name: &str, sudo: bool, packages: &[String]) -> ProvisioningStep {
    let mut args = vec!["install".to_owned(), "-y".to_owned()];
    args.extend(packages.iter().cloned());
    ProvisioningStep::streamed(name, CommandSpec::privileged(sudo, "apt-get", args))
}
