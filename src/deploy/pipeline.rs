// ABOUTME: Generic pipeline struct parameterized by phase marker.
// ABOUTME: Carries the deployment record and a working copy of the persisted state.

use crate::config::Config;
use crate::health::HealthProber;
use crate::output::Output;
use crate::state::{DeploymentState, StateStore};
use crate::types::{Environment, Version};

use super::Deployment;
use super::state::Initialized;
use super::target::DeployTarget;

/// Collaborators every phase needs.
pub struct PhaseContext<'a> {
    pub config: &'a Config,
    pub prober: &'a dyn HealthProber,
    pub store: &'a dyn StateStore,
    pub target: &'a dyn DeployTarget,
    pub output: &'a Output,
}

/// A blue-green deployment in progress, parameterized by the last phase it
/// completed.
///
/// Each phase method consumes the pipeline and returns it in the next state,
/// so phases can only run in their fixed order. Failing phases hand the
/// pipeline back alongside the error so the caller can roll back.
#[derive(Debug)]
pub struct Pipeline<S> {
    pub(crate) record: Deployment,
    pub(crate) snapshot: DeploymentState,
    pub(crate) phase: S,
}

impl Pipeline<Initialized> {
    /// Start a pipeline that moves traffic off the currently live environment.
    pub fn new(version: Version, snapshot: DeploymentState, dry_run: bool) -> Self {
        let record = Deployment::start(version, snapshot.current_environment, dry_run);
        Pipeline {
            record,
            snapshot,
            phase: Initialized,
        }
    }
}

impl<S> Pipeline<S> {
    pub fn record(&self) -> &Deployment {
        &self.record
    }

    /// State as this pipeline currently sees it.
    pub fn snapshot(&self) -> &DeploymentState {
        &self.snapshot
    }

    pub fn version(&self) -> &Version {
        &self.record.version
    }

    /// Environment that was live when the pipeline started.
    pub fn source(&self) -> Environment {
        self.record.source_environment
    }

    /// Environment receiving the new version.
    pub fn target(&self) -> Environment {
        self.record.target_environment
    }

    pub fn is_dry_run(&self) -> bool {
        self.record.dry_run
    }

    pub fn phase(&self) -> &S {
        &self.phase
    }

    /// Give up the typestate and return the record and state.
    pub fn into_parts(self) -> (Deployment, DeploymentState) {
        (self.record, self.snapshot)
    }
}
