// ABOUTME: Rollback: return traffic to the environment that was live before.
// ABOUTME: Re-verifies the fallback environment's health before flipping back.

use crate::health::check_environment;
use crate::state::DeploymentState;
use crate::types::Environment;

use super::DeployError;
use super::deployment::RollbackRecord;
use super::pipeline::PhaseContext;

/// Check that `environment` can take traffic back.
///
/// # Errors
///
/// Returns `RollbackFailed` if the environment misses the health threshold.
pub(crate) async fn verify_fallback(
    ctx: &PhaseContext<'_>,
    environment: Environment,
) -> Result<(), DeployError> {
    ctx.output
        .progress(&format!("  → Verifying fallback environment ({environment})..."));

    let health = check_environment(
        ctx.prober,
        environment.into(),
        ctx.config.environments.url(environment),
        &ctx.config.health,
    )
    .await;

    if health.healthy {
        Ok(())
    } else {
        let cause = DeployError::unhealthy(&health, ctx.config.health.threshold_percent());
        Err(DeployError::rollback_failed(environment, cause.to_string()))
    }
}

/// Point traffic from `from` back to `to` through the deploy target.
///
/// # Errors
///
/// Returns `RollbackFailed` wrapping the target's error.
pub(crate) async fn switch_back(
    ctx: &PhaseContext<'_>,
    from: Environment,
    to: Environment,
) -> Result<(), DeployError> {
    ctx.output
        .progress(&format!("  → Switching traffic back {from} → {to}..."));

    ctx.target
        .switch_traffic(from, to, ctx.config.environments.url(to))
        .await
        .map_err(|e| DeployError::rollback_failed(to, e.to_string()))
}

/// Automatic rollback after a failed deployment to `failed_target`.
///
/// The fallback is the other environment, i.e. the one that was live when the
/// deployment started. On success `state.current_environment` points at it.
///
/// # Errors
///
/// Returns `RollbackFailed` if the fallback is unhealthy or the switch fails.
/// `state` is left untouched in that case.
pub(crate) async fn restore(
    ctx: &PhaseContext<'_>,
    state: &mut DeploymentState,
    failed_target: Environment,
) -> Result<RollbackRecord, DeployError> {
    let fallback = failed_target.other();
    tracing::warn!("Rolling back from {} to {}", failed_target, fallback);

    verify_fallback(ctx, fallback).await?;
    switch_back(ctx, failed_target, fallback).await?;

    state.current_environment = fallback;
    tracing::info!("Rollback complete, {} is live", fallback);
    Ok(RollbackRecord::completed(fallback))
}
