//! Containerized companion service deployment steps.
//!
//! Imports only from `crate::domain`.

use crate::domain::{CommandSpec, ProvisionConfig, ProvisioningStep};

const COMPOSE_TEMPLATE: &str = include_str!("../../../assets/compose.waf.yaml");

/// UID/GID the companion containers run as.
pub const COMPANION_OWNER: &str = "101:101";

pub const COMPOSE_FILE: &str = "compose.yaml";

/// Render the fixed multi-service deployment description.
#[must_use]
pub fn render_manifest(config: &ProvisionConfig) -> String {
    let companion = &config.companion;
    COMPOSE_TEMPLATE
        .replace("{{registry}}", &companion.registry)
        .replace("{{image_tag}}", &companion.image_tag)
        .replace("{{deploy_dir}}", &companion.deploy_dir.display().to_string())
}

/// Steps installing the container runtime and launching the deployment.
///
/// The client certificate/key already placed in the trust directory double
/// as the private registry's client credentials.
#[must_use]
pub fn companion_steps(config: &ProvisionConfig) -> Vec<ProvisioningStep> {
    let sudo = config.use_sudo;
    let companion = &config.companion;
    let certs_dir = format!("/etc/docker/certs.d/{}", companion.registry);
    let deploy_dir = companion.deploy_dir.display().to_string();
    let compose_path = companion.deploy_dir.join(COMPOSE_FILE).display().to_string();

    let mut install_args = vec!["install".to_owned(), "-y".to_owned()];
    install_args.extend(companion.runtime_packages.iter().cloned());

    vec![
        ProvisioningStep::streamed(
            "install container runtime",
            CommandSpec::privileged(sudo, "apt-get", install_args),
        ),
        ProvisioningStep::new(
            "create registry certificate directory",
            CommandSpec::privileged(sudo, "mkdir", ["-p".to_owned(), certs_dir.clone()]),
        ),
        ProvisioningStep::new(
            "install registry client certificate",
            CommandSpec::privileged(
                sudo,
                "cp",
                [
                    config.installed_certificate().display().to_string(),
                    format!("{certs_dir}/client.cert"),
                ],
            ),
        ),
        ProvisioningStep::new(
            "install registry client key",
            CommandSpec::privileged(
                sudo,
                "cp",
                [
                    config.installed_key().display().to_string(),
                    format!("{certs_dir}/client.key"),
                ],
            ),
        ),
        ProvisioningStep::new(
            "create deployment directories",
            CommandSpec::privileged(
                sudo,
                "mkdir",
                [
                    "-p".to_owned(),
                    format!("{deploy_dir}/config"),
                    format!("{deploy_dir}/bd_config"),
                ],
            ),
        ),
        ProvisioningStep::new(
            "set deployment directory ownership",
            CommandSpec::privileged(
                sudo,
                "chown",
                ["-R".to_owned(), COMPANION_OWNER.to_owned(), deploy_dir],
            ),
        ),
        ProvisioningStep::new(
            "write deployment description",
            CommandSpec::privileged(sudo, "tee", [compose_path.clone()])
                .with_stdin(render_manifest(config)),
        ),
        ProvisioningStep::streamed(
            "launch companion services",
            CommandSpec::privileged(
                sudo,
                "docker",
                [
                    "compose".to_owned(),
                    "-f".to_owned(),
                    compose_path,
                    "up".to_owned(),
                    "-d".to_owned(),
                ],
            ),
        ),
    ]
}
