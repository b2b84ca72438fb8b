// ABOUTME: Base URLs for the blue, green, and production endpoints.
// ABOUTME: Supports environment-variable overrides for CI pipelines.

use crate::health::CheckTarget;
use crate::types::Environment;
use serde::Deserialize;

pub const BLUE_URL_VAR: &str = "BLUE_ENVIRONMENT_URL";
pub const GREEN_URL_VAR: &str = "GREEN_ENVIRONMENT_URL";
pub const PRODUCTION_URL_VAR: &str = "PRODUCTION_URL";

pub const DEFAULT_BLUE_URL: &str = "http://localhost:3001";
pub const DEFAULT_GREEN_URL: &str = "http://localhost:3002";
pub const DEFAULT_PRODUCTION_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentUrls {
    #[serde(default = "default_blue")]
    pub blue: String,

    #[serde(default = "default_green")]
    pub green: String,

    /// The public alias that follows whichever environment is live.
    #[serde(default = "default_production")]
    pub production: String,
}

fn default_blue() -> String {
    DEFAULT_BLUE_URL.to_string()
}

fn default_green() -> String {
    DEFAULT_GREEN_URL.to_string()
}

fn default_production() -> String {
    DEFAULT_PRODUCTION_URL.to_string()
}

impl Default for EnvironmentUrls {
    fn default() -> Self {
        Self {
            blue: default_blue(),
            green: default_green(),
            production: default_production(),
        }
    }
}

impl EnvironmentUrls {
    pub fn url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Blue => &self.blue,
            Environment::Green => &self.green,
        }
    }

    /// URL probed for a health check target.
    pub fn target_url(&self, target: CheckTarget) -> &str {
        match target {
            CheckTarget::Blue => &self.blue,
            CheckTarget::Green => &self.green,
            CheckTarget::Production => &self.production,
        }
    }

    pub(crate) fn apply_env_overrides(&mut self) {
        for (var, slot) in [
            (BLUE_URL_VAR, &mut self.blue),
            (GREEN_URL_VAR, &mut self.green),
            (PRODUCTION_URL_VAR, &mut self.production),
        ] {
            if let Ok(value) = std::env::var(var)
                && !value.trim().is_empty()
            {
                tracing::debug!("{} overrides configured URL", var);
                *slot = value.trim().to_string();
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("blue", &self.blue),
            ("green", &self.green),
            ("production", &self.production),
        ] {
            if url.trim().is_empty() {
                return Err(format!("{name} environment URL cannot be empty"));
            }
        }
        Ok(())
    }
}
