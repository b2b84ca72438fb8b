// ABOUTME: Phase transition methods for the blue-green pipeline.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::time::Instant;

use crate::diagnostics::{Diagnostics, Warning};
use crate::health::{CheckTarget, check_environment};
use crate::state::DeploymentState;

use super::deployment::{Deployment, DeploymentStatus, Phase, PhaseName};
use super::error::DeployError;
use super::pipeline::{PhaseContext, Pipeline};
use super::state::{Completed, Initialized, PreChecked, Switched, TargetDeployed, Verified};

/// Result type for transitions that may need rollback on failure.
pub type TransitionResult<T, S> = Result<Pipeline<T>, (Pipeline<S>, DeployError)>;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Pipeline<S> {
    /// Append a completed phase to the record.
    fn log_phase(&mut self, name: PhaseName, started: Instant) {
        self.record
            .phases
            .push(Phase::completed(name, started.elapsed()));
        tracing::info!(deployment = %self.record.id, phase = %name, "phase completed");
    }

    /// Internal helper to transition to a new state.
    fn transition<T: Default>(self) -> Pipeline<T> {
        Pipeline {
            record: self.record,
            snapshot: self.snapshot,
            phase: T::default(),
        }
    }

    fn advance<T: Default>(mut self, name: PhaseName, started: Instant) -> Pipeline<T> {
        self.log_phase(name, started);
        self.transition()
    }
}

// =============================================================================
// Initialized -> PreChecked
// =============================================================================

impl Pipeline<Initialized> {
    /// Verify the live environment before touching anything.
    ///
    /// # Errors
    ///
    /// Returns `(self, UnhealthyEnvironment)` if the live environment misses
    /// the threshold.
    pub async fn pre_health_check(
        self,
        ctx: &PhaseContext<'_>,
    ) -> TransitionResult<PreChecked, Initialized> {
        let started = Instant::now();
        let source = self.source();

        ctx.output.progress(&format!(
            "  → Checking live environment ({source})..."
        ));
        let health = check_environment(
            ctx.prober,
            source.into(),
            ctx.config.environments.url(source),
            &ctx.config.health,
        )
        .await;

        if !health.healthy {
            let err = DeployError::unhealthy(&health, ctx.config.health.threshold_percent());
            return Err((self, err));
        }

        Ok(self.advance(PhaseName::PreHealthCheck, started))
    }
}

// =============================================================================
// PreChecked -> TargetDeployed
// =============================================================================

impl Pipeline<PreChecked> {
    /// Release the version into the inactive environment. No-op on dry runs.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` if the deploy target fails.
    pub async fn deploy_target(
        self,
        ctx: &PhaseContext<'_>,
    ) -> TransitionResult<TargetDeployed, PreChecked> {
        let started = Instant::now();
        let target = self.target();

        if self.is_dry_run() {
            ctx.output.progress(&format!(
                "  → [dry run] Would deploy {} to {target}",
                self.version()
            ));
        } else {
            ctx.output
                .progress(&format!("  → Deploying {} to {target}...", self.version()));
            let result = ctx
                .target
                .deploy(self.version(), target, ctx.config.environments.url(target))
                .await;
            if let Err(e) = result {
                return Err((self, e));
            }
        }

        Ok(self.advance(PhaseName::TargetDeploy, started))
    }
}

// =============================================================================
// TargetDeployed -> Verified
// =============================================================================

impl Pipeline<TargetDeployed> {
    /// Wait for the warmup period, then verify the inactive environment.
    ///
    /// # Errors
    ///
    /// Returns `(self, UnhealthyEnvironment)` if the new environment misses
    /// the threshold.
    pub async fn warmup_verification(
        self,
        ctx: &PhaseContext<'_>,
    ) -> TransitionResult<Verified, TargetDeployed> {
        let started = Instant::now();
        let target = self.target();
        let warmup = ctx.config.deploy.warmup;

        if !warmup.is_zero() {
            ctx.output
                .progress(&format!("  → Warming up {target} for {warmup:?}..."));
            tokio::time::sleep(warmup).await;
        }

        ctx.output
            .progress(&format!("  → Verifying {target} environment..."));
        let health = check_environment(
            ctx.prober,
            target.into(),
            ctx.config.environments.url(target),
            &ctx.config.health,
        )
        .await;

        if !health.healthy {
            let err = DeployError::unhealthy(&health, ctx.config.health.threshold_percent());
            return Err((self, err));
        }

        Ok(self.advance(PhaseName::WarmupVerification, started))
    }
}

// =============================================================================
// Verified -> Switched
// =============================================================================

impl Pipeline<Verified> {
    /// Point traffic at the new environment and persist the flip.
    ///
    /// On dry runs neither the switch command nor the state store is touched.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` if the switch command or the state save fails.
    pub async fn switch_traffic(
        mut self,
        ctx: &PhaseContext<'_>,
    ) -> TransitionResult<Switched, Verified> {
        let started = Instant::now();
        let (from, to) = (self.source(), self.target());

        if self.is_dry_run() {
            ctx.output
                .progress(&format!("  → [dry run] Would switch traffic {from} → {to}"));
            return Ok(self.advance(PhaseName::TrafficSwitch, started));
        }

        ctx.output
            .progress(&format!("  → Switching traffic {from} → {to}..."));
        let result = ctx
            .target
            .switch_traffic(from, to, ctx.config.environments.url(to))
            .await;
        if let Err(e) = result {
            return Err((self, e));
        }

        self.log_phase(PhaseName::TrafficSwitch, started);

        let mut next_state = self.snapshot.clone();
        next_state.current_environment = to;
        next_state.record(self.record.clone(), ctx.config.deploy.history_limit);

        if let Err(e) = ctx.store.save(&next_state).await {
            // The switch is not durable, so it did not complete
            self.record.phases.pop();
            return Err((self, e.into()));
        }

        self.snapshot = next_state;
        Ok(self.transition())
    }
}

// =============================================================================
// Switched -> Completed
// =============================================================================

impl Pipeline<Switched> {
    /// Verify the production alias. Failure is a warning, never fatal.
    pub async fn post_verification(
        mut self,
        ctx: &PhaseContext<'_>,
        diag: &mut Diagnostics,
    ) -> Pipeline<Completed> {
        let started = Instant::now();

        ctx.output.progress("  → Verifying production...");
        let health = check_environment(
            ctx.prober,
            CheckTarget::Production,
            &ctx.config.environments.production,
            &ctx.config.health,
        )
        .await;

        if !health.healthy {
            let message = format!(
                "post-deployment verification failed: {}",
                DeployError::unhealthy(&health, ctx.config.health.threshold_percent())
            );
            diag.warn(Warning::post_verification(message.clone()));
            self.record.warnings.push(message);
        }

        self.advance(PhaseName::PostVerification, started)
    }
}

// =============================================================================
// Completed - Terminal State
// =============================================================================

impl Pipeline<Completed> {
    /// Mark the record completed and fold it into the state copy.
    pub fn finish(mut self) -> (Deployment, DeploymentState) {
        self.record.status = DeploymentStatus::Completed;
        self.snapshot.update(&self.record);
        (self.record, self.snapshot)
    }
}
