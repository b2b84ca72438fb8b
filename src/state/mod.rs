// ABOUTME: Persisted deployment state: which environment is live, plus bounded history.
// ABOUTME: Defines the StateStore seam with file-backed and in-memory implementations.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStateStore;
pub(crate) use file::write_json;
pub use memory::MemoryStateStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::deploy::{Deployment, DeploymentStatus};
use crate::types::{Environment, Version};

/// Number of deployments kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Single source of truth for which environment serves traffic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentState {
    pub current_environment: Environment,

    #[serde(default)]
    pub last_deployment: Option<Deployment>,

    #[serde(default)]
    pub deployment_history: Vec<Deployment>,
}

impl DeploymentState {
    /// The environment that receives the next release.
    pub fn inactive_environment(&self) -> Environment {
        self.current_environment.other()
    }

    /// Record a deployment as the latest one, evicting the oldest history
    /// entries beyond `limit`.
    pub fn record(&mut self, deployment: Deployment, limit: usize) {
        self.last_deployment = Some(deployment.clone());
        self.deployment_history.push(deployment);

        let limit = limit.max(1);
        if self.deployment_history.len() > limit {
            let excess = self.deployment_history.len() - limit;
            self.deployment_history.drain(..excess);
        }
    }

    /// Replace a previously recorded deployment (matched by id) with its
    /// newer copy. Returns false if it was never recorded.
    pub fn update(&mut self, deployment: &Deployment) -> bool {
        let mut found = false;
        if let Some(last) = self.last_deployment.as_mut()
            && last.id == deployment.id
        {
            *last = deployment.clone();
            found = true;
        }
        if let Some(entry) = self
            .deployment_history
            .iter_mut()
            .rev()
            .find(|d| d.id == deployment.id)
        {
            *entry = deployment.clone();
            found = true;
        }
        found
    }

    /// Version most recently released to `environment` by a completed deployment.
    pub fn version_in(&self, environment: Environment) -> Option<&Version> {
        self.deployment_history
            .iter()
            .rev()
            .find(|d| {
                d.target_environment == environment && d.status == DeploymentStatus::Completed
            })
            .map(|d| &d.version)
    }
}

/// Loads and persists [`DeploymentState`].
///
/// There is no locking at this level; callers that mutate state hold a
/// [`DeployLock`](crate::deploy::DeployLock).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state, falling back to the default when nothing usable is stored.
    async fn load(&self) -> DeploymentState;

    /// Persist the state.
    async fn save(&self, state: &DeploymentState) -> Result<(), StoreError>;
}
