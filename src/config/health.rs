// ABOUTME: Health verification settings.
// ABOUTME: Probe endpoints, retry budget, per-probe timeout, and healthy threshold.

use nonempty::NonEmpty;
use serde::Deserialize;
use std::time::Duration;

use super::deserialize::deserialize_endpoints;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Paths probed on every environment, relative to its base URL.
    #[serde(
        default = "default_endpoints",
        deserialize_with = "deserialize_endpoints"
    )]
    pub endpoints: NonEmpty<String>,

    /// Attempts before an environment is declared unhealthy.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Pause between attempts.
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Deadline for a single HTTP probe.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Fraction of endpoints that must be healthy, in (0, 1].
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_endpoints() -> NonEmpty<String> {
    NonEmpty {
        head: "/".to_string(),
        tail: vec!["/health".to_string(), "/manifest.json".to_string()],
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_threshold() -> f64 {
    0.8
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            attempts: default_attempts(),
            interval: default_interval(),
            timeout: default_timeout(),
            threshold: default_threshold(),
        }
    }
}

impl HealthConfig {
    /// Threshold as a whole percentage for messages.
    pub fn threshold_percent(&self) -> u32 {
        (self.threshold * 100.0).round() as u32
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(format!(
                "health threshold must be in (0, 1], got {}",
                self.threshold
            ));
        }
        if self.attempts == 0 {
            return Err("health attempts must be at least 1".to_string());
        }
        if self.timeout.is_zero() {
            return Err("health timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}
