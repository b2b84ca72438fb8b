// ABOUTME: Rollout behavior settings.
// ABOUTME: Warmup delay, history bound, and the shell commands that release and switch.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct RolloutConfig {
    /// Time given to the inactive environment to settle before verification.
    #[serde(default = "default_warmup", with = "humantime_serde")]
    pub warmup: Duration,

    /// Number of deployments kept in the state file.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Shell command that releases a version into an environment.
    #[serde(default)]
    pub deploy_command: Option<String>,

    /// Shell command that points production traffic at an environment.
    #[serde(default)]
    pub switch_command: Option<String>,
}

fn default_warmup() -> Duration {
    Duration::from_secs(10)
}

fn default_history_limit() -> usize {
    10
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            warmup: default_warmup(),
            history_limit: default_history_limit(),
            deploy_command: None,
            switch_command: None,
        }
    }
}

impl RolloutConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("deploy history_limit must be at least 1".to_string());
        }
        Ok(())
    }
}
