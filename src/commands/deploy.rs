// ABOUTME: Deploy and dry-run command implementations.
// ABOUTME: Runs the blue-green pipeline under the deploy lock and prints the outcome.

use super::context::{emit_warnings, orchestrator};
use bgdeploy::config::Config;
use bgdeploy::deploy::{DeployLock, Deployment, DeploymentFailed, RollbackStatus};
use bgdeploy::diagnostics::Diagnostics;
use bgdeploy::error::Result;
use bgdeploy::output::Output;
use bgdeploy::state::{FileStateStore, MemoryStateStore, StateStore};
use bgdeploy::types::Version;

/// Deploy `version` to the inactive environment and switch traffic to it.
pub async fn deploy(config: Config, version: &str, force: bool, mut output: Output) -> Result<()> {
    let version = Version::new(version)?;
    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress("  → Acquiring deploy lock...");
    let _lock = DeployLock::acquire(&config.files.state, force).await?;

    let store = FileStateStore::new(config.files.state.clone());
    let orchestrator = orchestrator(config, store);

    output.progress(&format!("Deploying {version}"));
    let result = orchestrator
        .perform_blue_green_deployment(version, false, &output, &mut diag)
        .await;

    emit_warnings(&output, &diag);
    finish(&output, result)
}

/// Run the pipeline against a copy of the stored state; nothing is deployed,
/// switched, or persisted apart from the report.
pub async fn dry_run(config: Config, version: &str, mut output: Output) -> Result<()> {
    let version = Version::new(version)?;
    output.start_timer();
    let mut diag = Diagnostics::default();

    let seed = FileStateStore::new(config.files.state.clone()).load().await;
    let orchestrator = orchestrator(config, MemoryStateStore::new(seed));

    output.progress(&format!("Dry run of {version}"));
    let result = orchestrator
        .perform_blue_green_deployment(version, true, &output, &mut diag)
        .await;

    emit_warnings(&output, &diag);
    finish(&output, result)
}

fn finish(output: &Output, result: std::result::Result<Deployment, DeploymentFailed>) -> Result<()> {
    match result {
        Ok(deployment) => {
            output.data("deployment", &deployment);
            let prefix = if deployment.dry_run { "[dry run] " } else { "" };
            output.success(&format!(
                "{prefix}Deployed {} to {}, {} is live",
                deployment.version,
                deployment.target_environment,
                deployment.target_environment
            ));
            Ok(())
        }
        Err(failed) => {
            output.data("deployment", &failed.deployment);
            print_failure_summary(output, &failed.deployment);
            Err(failed.into())
        }
    }
}

fn print_failure_summary(output: &Output, deployment: &Deployment) {
    output.progress(&format!(
        "  ✗ Deployment {} of {} failed",
        deployment.id, deployment.version
    ));
    for phase in &deployment.phases {
        output.progress(&format!("    ✓ {} ({}ms)", phase.name, phase.duration));
    }
    if let Some(error) = &deployment.error {
        output.progress(&format!("    error: {error}"));
    }
    match &deployment.rollback {
        Some(rollback) if rollback.status == RollbackStatus::Completed => {
            output.progress(&format!(
                "    rolled back, {} is live",
                rollback.restored_environment
            ));
        }
        Some(rollback) => {
            output.progress(&format!(
                "    rollback to {} failed: {}",
                rollback.restored_environment,
                rollback.error.as_deref().unwrap_or("unknown error")
            ));
        }
        None => {}
    }
}
