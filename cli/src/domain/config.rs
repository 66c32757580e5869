//! Domain types and validators for the provisioning configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::cleanup::StalePattern;
use crate::domain::error::ConfigError;
use crate::domain::fingerprint::is_valid_fingerprint;

// ── Constants ────────────────────────────────────────────────────────────────

pub const NGINX_KEY_FINGERPRINT: &str = "573BFD6B3D8FBC641079A6ABABF5BD827BD9BF62";
pub const NGINX_KEYRING: &str = "/usr/share/keyrings/nginx-archive-keyring.gpg";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration, optionally read from a YAML file.
///
/// Every field has a default, so an empty file (or no file) reproduces the
/// stock NGINX Plus + App Protect WAF installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Directory receiving the repository client certificate and key.
    pub trust_dir: PathBuf,
    pub certificate_name: String,
    pub key_name: String,
    /// Prefix host-mutating commands with `sudo`.
    pub use_sudo: bool,
    /// Upper bound for a single step, in seconds.
    pub step_timeout_secs: u64,
    pub prerequisites: Vec<String>,
    pub signing_keys: Vec<SigningKey>,
    pub package_config: PackageConfig,
    /// Previous repository registrations; `*` allowed in the file name.
    pub stale_config: Vec<PathBuf>,
    pub repositories: Vec<Repository>,
    pub packages: Vec<String>,
    /// Package whose installed version is reported at the end of a run.
    pub version_package: String,
    pub start_services: Vec<String>,
    /// Units stopped and disabled before installation (conflicting modules).
    pub disable_services: Vec<String>,
    /// Overrides detection from `/etc/os-release`.
    pub distribution_codename: Option<String>,
    pub companion: CompanionConfig,
}

/// A repository signing key and where its dearmored form is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    pub name: String,
    pub url: String,
    pub keyring: PathBuf,
    /// Hex fingerprint that must appear in the key's inspection output.
    pub fingerprint: String,
}

/// Package-manager configuration snippet fetched from the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    pub url: String,
    pub path: PathBuf,
}

/// A package repository registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    /// Distribution suite; defaults to the host's codename.
    #[serde(default)]
    pub suite: Option<String>,
    pub component: String,
    pub list_file: PathBuf,
    /// Name of the signing key whose keyring authenticates this repository.
    pub signed_by: String,
}

impl Repository {
    /// Render the one-line source entry.
    #[must_use]
    pub fn source_line(&self, keyring: &Path, codename: &str) -> String {
        let suite = self.suite.as_deref().unwrap_or(codename);
        format!(
            "deb [signed-by={}] {} {suite} {}\n",
            keyring.display(),
            self.url,
            self.component
        )
    }
}

/// Containerized companion service deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub enabled: bool,
    pub runtime_packages: Vec<String>,
    /// Private registry the companion images are pulled from.
    pub registry: String,
    pub image_tag: String,
    pub deploy_dir: PathBuf,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            runtime_packages: strings(&["docker.io", "docker-compose-v2"]),
            registry: "private-registry.nginx.com".to_owned(),
            image_tag: "5.4.0".to_owned(),
            deploy_dir: PathBuf::from("/opt/app_protect"),
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            trust_dir: PathBuf::from("/etc/ssl/nginx"),
            certificate_name: "nginx-repo.crt".to_owned(),
            key_name: "nginx-repo.key".to_owned(),
            use_sudo: true,
            step_timeout_secs: 1800,
            prerequisites: strings(&[
                "apt-transport-https",
                "lsb-release",
                "ca-certificates",
                "gnupg2",
                "ubuntu-keyring",
                "curl",
            ]),
            signing_keys: vec![SigningKey {
                name: "nginx".to_owned(),
                url: "https://cs.nginx.com/static/keys/nginx_signing.key".to_owned(),
                keyring: PathBuf::from(NGINX_KEYRING),
                fingerprint: NGINX_KEY_FINGERPRINT.to_owned(),
            }],
            package_config: PackageConfig {
                url: "https://cs.nginx.com/static/files/90pkgs-nginx".to_owned(),
                path: PathBuf::from("/etc/apt/apt.conf.d/90pkgs-nginx"),
            },
            stale_config: vec![
                PathBuf::from("/etc/apt/sources.list.d/nginx*.list"),
                PathBuf::from("/etc/apt/sources.list.d/*app-protect*.list"),
                PathBuf::from("/etc/apt/apt.conf.d/90pkgs-nginx"),
            ],
            repositories: vec![
                Repository {
                    name: "nginx-plus".to_owned(),
                    url: "https://pkgs.nginx.com/plus/ubuntu".to_owned(),
                    suite: None,
                    component: "nginx-plus".to_owned(),
                    list_file: PathBuf::from("/etc/apt/sources.list.d/nginx-plus.list"),
                    signed_by: "nginx".to_owned(),
                },
                Repository {
                    name: "app-protect-x-plus".to_owned(),
                    url: "https://pkgs.nginx.com/app-protect-x-plus/ubuntu".to_owned(),
                    suite: None,
                    component: "nginx-plus".to_owned(),
                    list_file: PathBuf::from("/etc/apt/sources.list.d/nginx-app-protect.list"),
                    signed_by: "nginx".to_owned(),
                },
            ],
            packages: strings(&["app-protect-module-plus"]),
            version_package: "app-protect-module-plus".to_owned(),
            start_services: strings(&["nginx"]),
            disable_services: Vec::new(),
            distribution_codename: None,
            companion: CompanionConfig::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl ProvisionConfig {
    /// Look up a signing key by name.
    #[must_use]
    pub fn signing_key(&self, name: &str) -> Option<&SigningKey> {
        self.signing_keys.iter().find(|k| k.name == name)
    }

    /// Installed location of the client certificate.
    #[must_use]
    pub fn installed_certificate(&self) -> PathBuf {
        self.trust_dir.join(&self.certificate_name)
    }

    /// Installed location of the client key.
    #[must_use]
    pub fn installed_key(&self) -> PathBuf {
        self.trust_dir.join(&self.key_name)
    }

    /// Parsed stale configuration patterns.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to parse.
    pub fn stale_patterns(&self) -> Result<Vec<StalePattern>, ConfigError> {
        self.stale_config
            .iter()
            .map(|p| StalePattern::parse(p))
            .collect()
    }

    // ── Validators ───────────────────────────────────────────────────────────

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.signing_keys.is_empty() {
            return Err(ConfigError::NoSigningKeys);
        }
        for key in &self.signing_keys {
            if key.name.trim().is_empty() {
                return Err(ConfigError::EmptyName {
                    what: "Signing key",
                });
            }
            if !is_safe_file_stem(&key.name) {
                return Err(ConfigError::InvalidKeyName {
                    name: key.name.clone(),
                });
            }
            if !is_valid_fingerprint(&key.fingerprint) {
                return Err(ConfigError::InvalidFingerprint {
                    key: key.name.clone(),
                    value: key.fingerprint.clone(),
                });
            }
        }
        for repo in &self.repositories {
            if repo.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { what: "Repository" });
            }
            if self.signing_key(&repo.signed_by).is_none() {
                return Err(ConfigError::UnknownSigningKey {
                    repository: repo.name.clone(),
                    key: repo.signed_by.clone(),
                    valid: self
                        .signing_keys
                        .iter()
                        .map(|k| k.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        self.stale_patterns()?;
        Ok(())
    }
}

/// Key names become file names in the scratch directory.
fn is_safe_file_stem(name: &str) -> bool {
    !matches!(name, "." | "..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
