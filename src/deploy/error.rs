// ABOUTME: Error types for deployment operations.
// ABOUTME: Covers unhealthy environments, rollback, target commands, locking, and state I/O.

use chrono::{DateTime, Utc};

use crate::health::{CheckTarget, EnvironmentHealth};
use crate::state::StoreError;
use crate::types::Environment;

use super::Deployment;

/// Errors that can occur while running or rolling back a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// An environment did not reach the healthy threshold within the retry budget.
    #[error(
        "{target} environment is unhealthy: {healthy}/{total} endpoints healthy after {attempts} attempt(s), {threshold_percent}% required"
    )]
    UnhealthyEnvironment {
        target: CheckTarget,
        healthy: usize,
        total: usize,
        attempts: u32,
        threshold_percent: u32,
    },

    /// The environment to fall back to is also unusable.
    #[error("rollback to {environment} failed: {reason}")]
    RollbackFailed {
        environment: Environment,
        reason: String,
    },

    /// A configured deploy or switch command failed.
    #[error("{step} command failed: {message}")]
    TargetCommand { step: &'static str, message: String },

    /// Another invocation holds the deploy lock.
    #[error("deploy lock held by {holder} (pid {pid}) since {started_at}")]
    LockHeld {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    /// The deploy lock could not be managed.
    #[error("deploy lock error: {0}")]
    Lock(String),

    /// State or report persistence failed.
    #[error(transparent)]
    State(#[from] StoreError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    UnhealthyEnvironment,
    RollbackFailed,
    TargetCommand,
    Lock,
    State,
}

impl DeployError {
    /// Build an `UnhealthyEnvironment` error from a failed check.
    pub fn unhealthy(health: &EnvironmentHealth, threshold_percent: u32) -> Self {
        DeployError::UnhealthyEnvironment {
            target: health.target,
            healthy: health.healthy_count,
            total: health.total,
            attempts: health.attempts,
            threshold_percent,
        }
    }

    pub fn rollback_failed(environment: Environment, reason: impl Into<String>) -> Self {
        DeployError::RollbackFailed {
            environment,
            reason: reason.into(),
        }
    }

    pub fn lock_error(message: impl Into<String>) -> Self {
        DeployError::Lock(message.into())
    }

    pub fn lock_held(holder: String, pid: u32, started_at: DateTime<Utc>) -> Self {
        DeployError::LockHeld {
            holder,
            pid,
            started_at,
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::UnhealthyEnvironment { .. } => DeployErrorKind::UnhealthyEnvironment,
            DeployError::RollbackFailed { .. } => DeployErrorKind::RollbackFailed,
            DeployError::TargetCommand { .. } => DeployErrorKind::TargetCommand,
            DeployError::LockHeld { .. } | DeployError::Lock(_) => DeployErrorKind::Lock,
            DeployError::State(_) => DeployErrorKind::State,
        }
    }
}

/// A deployment that ended in failure, with the record that was persisted.
#[derive(Debug, thiserror::Error)]
#[error("deployment {} of {} failed: {error}", .deployment.id, .deployment.version)]
pub struct DeploymentFailed {
    pub deployment: Box<Deployment>,
    #[source]
    pub error: DeployError,
}

impl DeploymentFailed {
    pub fn kind(&self) -> DeployErrorKind {
        self.error.kind()
    }
}
