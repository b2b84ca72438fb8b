// ABOUTME: Configuration types and parsing for bgdeploy.yml.
// ABOUTME: Handles YAML parsing, environment URL overrides, and validation.

mod deserialize;
mod environments;
mod files;
mod health;
mod init;
mod rollout;

pub use environments::{
    BLUE_URL_VAR, DEFAULT_BLUE_URL, DEFAULT_GREEN_URL, DEFAULT_PRODUCTION_URL, EnvironmentUrls,
    GREEN_URL_VAR, PRODUCTION_URL_VAR,
};
pub use files::FilesConfig;
pub use health::HealthConfig;
pub use init::init_config;
pub use rollout::RolloutConfig;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "bgdeploy.yml";
pub const CONFIG_FILENAME_ALT: &str = "bgdeploy.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".bgdeploy/config.yml";

/// Complete orchestrator configuration.
///
/// Every section is optional in the file; missing sections take their
/// documented defaults, so an absent config file is equivalent to `{}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environments: EnvironmentUrls,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub deploy: RolloutConfig,

    #[serde(default)]
    pub files: FilesConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a config file in `dir`, falling back to defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load(path);
            }
        }

        tracing::debug!("No configuration file in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    /// Apply `BLUE_ENVIRONMENT_URL`, `GREEN_ENVIRONMENT_URL` and `PRODUCTION_URL`.
    pub fn with_env_overrides(mut self) -> Self {
        self.environments.apply_env_overrides();
        self
    }

    /// Anchor relative state and report paths at `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.files = self.files.resolved(base);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.environments.validate().map_err(Error::InvalidConfig)?;
        self.health.validate().map_err(Error::InvalidConfig)?;
        self.deploy.validate().map_err(Error::InvalidConfig)?;
        Ok(())
    }
}
