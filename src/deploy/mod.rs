// ABOUTME: Blue-green deployment orchestration using the type state pattern.
// ABOUTME: Exports the pipeline, phase markers, deployment records, and the orchestrator.

mod deployment;
mod error;
mod lock;
mod orchestrator;
mod pipeline;
mod report;
mod rollback;
mod state;
mod target;
mod transitions;

pub use deployment::{
    Deployment, DeploymentStatus, Phase, PhaseName, PhaseStatus, RollbackRecord, RollbackStatus,
};
pub use error::{DeployError, DeployErrorKind, DeploymentFailed};
pub use lock::{DeployLock, LockInfo};
pub use orchestrator::Orchestrator;
pub use pipeline::{PhaseContext, Pipeline};
pub use report::ReportWriter;
pub use state::{Completed, Initialized, PreChecked, Switched, TargetDeployed, Verified};
pub use target::{CommandTarget, DeployTarget, TargetContext};
pub use transitions::TransitionResult;
