//! Read-only checks that must pass before the host is touched.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use crate::application::ports::HostFs;
use crate::domain::distro::codename_from_os_release;
use crate::domain::{ArtifactKind, ProvisionConfig, ProvisionError};

/// Where the distribution codename is read from.
pub const OS_RELEASE: &str = "/etc/os-release";

/// Confirm both input artifacts exist as regular files.
///
/// # Errors
///
/// Returns `ProvisionError::MissingArtifact` naming the first missing one.
pub fn validate(fs: &impl HostFs, cert_path: &Path, key_path: &Path) -> Result<(), ProvisionError> {
    for (which, path) in [
        (ArtifactKind::Certificate, cert_path),
        (ArtifactKind::Key, key_path),
    ] {
        if !fs.is_file(path) {
            tracing::error!(artifact = %which, path = %path.display(), "input artifact missing");
            return Err(ProvisionError::MissingArtifact {
                which,
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Distribution codename used in repository source lines.
///
/// # Errors
///
/// Returns `ProvisionError::UnknownDistribution` when neither the config nor
/// `/etc/os-release` provides one.
pub fn resolve_codename(
    fs: &impl HostFs,
    config: &ProvisionConfig,
) -> Result<String, ProvisionError> {
    if let Some(codename) = config
        .distribution_codename
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        return Ok(codename.trim().to_owned());
    }
    fs.read_to_string(Path::new(OS_RELEASE))
        .ok()
        .and_then(|content| codename_from_os_release(&content))
        .ok_or(ProvisionError::UnknownDistribution)
}
