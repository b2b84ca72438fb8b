// ABOUTME: Tests for the pipeline type state and the persisted deployment state.
// ABOUTME: Verifies phase markers, state file format, and the bounded history invariant.

use bgdeploy::deploy::{
    Completed, Deployment, DeploymentStatus, Initialized, Pipeline, PreChecked, Switched,
    TargetDeployed, Verified,
};
use bgdeploy::state::{DEFAULT_HISTORY_LIMIT, DeploymentState, FileStateStore, StateStore};
use bgdeploy::types::{Environment, Version};
use proptest::prelude::*;
use std::mem::size_of;

// =============================================================================
// State Marker Type Tests
// =============================================================================

/// Test: Phase markers carry no data.
#[test]
fn phase_markers_are_zero_sized() {
    assert_eq!(size_of::<Initialized>(), 0);
    assert_eq!(size_of::<PreChecked>(), 0);
    assert_eq!(size_of::<TargetDeployed>(), 0);
    assert_eq!(size_of::<Verified>(), 0);
    assert_eq!(size_of::<Switched>(), 0);
    assert_eq!(size_of::<Completed>(), 0);
}

/// Test: A new pipeline moves traffic away from the live environment.
#[test]
fn new_pipeline_targets_inactive_environment() {
    let state = DeploymentState {
        current_environment: Environment::Green,
        ..DeploymentState::default()
    };
    let pipeline = Pipeline::new(Version::new("v2").unwrap(), state, false);

    assert_eq!(pipeline.source(), Environment::Green);
    assert_eq!(pipeline.target(), Environment::Blue);
    assert_eq!(pipeline.record().status, DeploymentStatus::InProgress);
    assert!(pipeline.record().phases.is_empty());
    assert!(!pipeline.is_dry_run());
}

// =============================================================================
// State File Tests
// =============================================================================

/// Test: State file uses the documented camelCase layout.
#[tokio::test]
async fn state_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deployment-state.json");
    let store = FileStateStore::new(&path);

    let mut state = DeploymentState::default();
    let mut deployment =
        Deployment::start(Version::new("v2").unwrap(), Environment::Blue, false);
    deployment.status = DeploymentStatus::Completed;
    state.current_environment = Environment::Green;
    state.record(deployment, DEFAULT_HISTORY_LIMIT);
    store.save(&state).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["currentEnvironment"], "green");
    assert_eq!(json["lastDeployment"]["status"], "completed");
    assert_eq!(json["lastDeployment"]["sourceEnvironment"], "blue");
    assert_eq!(json["lastDeployment"]["targetEnvironment"], "green");
    assert_eq!(json["lastDeployment"]["dryRun"], false);
    assert_eq!(json["deploymentHistory"].as_array().unwrap().len(), 1);

    assert_eq!(store.load().await, state);
}

/// Test: A corrupt state file falls back to the default state.
#[tokio::test]
async fn corrupt_state_file_loads_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deployment-state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let state = FileStateStore::new(&path).load().await;
    assert_eq!(state, DeploymentState::default());
}

/// Test: Files written by older runs without optional fields still load.
#[tokio::test]
async fn minimal_state_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deployment-state.json");
    std::fs::write(&path, r#"{"currentEnvironment":"green"}"#).unwrap();

    let state = FileStateStore::new(&path).load().await;
    assert_eq!(state.current_environment, Environment::Green);
    assert!(state.deployment_history.is_empty());
}

// =============================================================================
// Bounded History Property
// =============================================================================

proptest! {
    #[test]
    fn history_never_exceeds_limit(count in 0usize..40, limit in 1usize..15) {
        let mut state = DeploymentState::default();
        for i in 0..count {
            let version = Version::new(&format!("v{i}")).unwrap();
            let mut d = Deployment::start(version, state.current_environment, false);
            d.id = format!("deploy-{i}");
            state.current_environment = d.target_environment;
            state.record(d, limit);
            prop_assert!(state.deployment_history.len() <= limit);
        }

        prop_assert_eq!(state.deployment_history.len(), count.min(limit));
        if count > 0 {
            let newest = format!("v{}", count - 1);
            prop_assert_eq!(
                state.deployment_history.last().map(|d| d.version.as_str()),
                Some(newest.as_str())
            );
            prop_assert_eq!(
                state.last_deployment.as_ref().map(|d| d.id.clone()),
                Some(format!("deploy-{}", count - 1))
            );
        }
    }
}
