//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::ProvisionConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PLUS_PROVISION_CONFIG";

/// Production implementation of `ConfigStore` backed by a YAML file.
///
/// Resolution order: explicit path, then `PLUS_PROVISION_CONFIG`, then
/// `<config dir>/plus-provision/config.yaml`.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ProvisionConfig> {
        let path = self.path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ProvisionConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: ProvisionConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("cannot determine config directory"))?;
        Ok(dir.join("plus-provision").join("config.yaml"))
    }
}
