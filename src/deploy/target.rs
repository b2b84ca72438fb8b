// ABOUTME: Deploy target seam: releases versions and switches traffic.
// ABOUTME: CommandTarget runs configured shell commands with context in environment variables.

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::RolloutConfig;
use crate::types::{Environment, Version};

use super::DeployError;

/// Performs the side effects of a blue-green rollout.
#[async_trait]
pub trait DeployTarget: Send + Sync {
    /// Release `version` into `environment`, reachable at `url`.
    async fn deploy(
        &self,
        version: &Version,
        environment: Environment,
        url: &str,
    ) -> Result<(), DeployError>;

    /// Point production traffic from `from` to `to` (reachable at `url`).
    async fn switch_traffic(
        &self,
        from: Environment,
        to: Environment,
        url: &str,
    ) -> Result<(), DeployError>;
}

/// Context passed to target commands via environment variables.
#[derive(Debug, Clone)]
pub struct TargetContext {
    pub version: Option<Version>,
    pub source: Environment,
    pub target: Environment,
    pub target_url: String,
}

impl TargetContext {
    /// Convert context to environment variables.
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "BGDEPLOY_SOURCE_ENVIRONMENT".to_string(),
            self.source.to_string(),
        );
        env.insert(
            "BGDEPLOY_TARGET_ENVIRONMENT".to_string(),
            self.target.to_string(),
        );
        env.insert("BGDEPLOY_TARGET_URL".to_string(), self.target_url.clone());
        if let Some(ref version) = self.version {
            env.insert("BGDEPLOY_VERSION".to_string(), version.to_string());
        }
        env
    }
}

/// Runs `deploy_command` / `switch_command` through `sh -c`.
///
/// Unset commands are skipped, which makes the state flip the whole switch.
#[derive(Debug, Clone, Default)]
pub struct CommandTarget {
    deploy_command: Option<String>,
    switch_command: Option<String>,
}

impl CommandTarget {
    pub fn new(deploy_command: Option<String>, switch_command: Option<String>) -> Self {
        Self {
            deploy_command,
            switch_command,
        }
    }

    pub fn from_config(config: &RolloutConfig) -> Self {
        Self::new(config.deploy_command.clone(), config.switch_command.clone())
    }

    async fn run(
        &self,
        step: &'static str,
        command: Option<&str>,
        context: &TargetContext,
    ) -> Result<(), DeployError> {
        let Some(command) = command else {
            tracing::info!("No {} command configured, skipping", step);
            return Ok(());
        };

        tracing::info!("Running {} command: {}", step, command);

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .envs(context.to_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DeployError::TargetCommand {
                step,
                message: format!("failed to spawn: {e}"),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("{} command output: {}", step, stdout.trim());
        }

        if output.status.success() {
            tracing::info!("{} command completed successfully", step);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        tracing::warn!("{} command failed with exit code {}", step, code);

        Err(DeployError::TargetCommand {
            step,
            message: if stderr.trim().is_empty() {
                format!("exit code {code}")
            } else {
                format!("exit code {code}: {}", stderr.trim())
            },
        })
    }
}

#[async_trait]
impl DeployTarget for CommandTarget {
    async fn deploy(
        &self,
        version: &Version,
        environment: Environment,
        url: &str,
    ) -> Result<(), DeployError> {
        let context = TargetContext {
            version: Some(version.clone()),
            source: environment.other(),
            target: environment,
            target_url: url.to_string(),
        };
        self.run("deploy", self.deploy_command.as_deref(), &context)
            .await
    }

    async fn switch_traffic(
        &self,
        from: Environment,
        to: Environment,
        url: &str,
    ) -> Result<(), DeployError> {
        let context = TargetContext {
            version: None,
            source: from,
            target: to,
            target_url: url.to_string(),
        };
        self.run("switch", self.switch_command.as_deref(), &context)
            .await
    }
}
