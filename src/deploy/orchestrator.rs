// ABOUTME: Orchestrator driving the blue-green pipeline end to end.
// ABOUTME: Owns the injected prober, state store, and deploy target; handles rollback and reports.

use std::time::Instant;

use futures::future::join_all;

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Warning};
use crate::health::{CheckTarget, EnvironmentHealth, HealthProber, check_environment};
use crate::output::Output;
use crate::state::{DeploymentState, StateStore};
use crate::types::Version;

use super::deployment::{Deployment, DeploymentStatus, Phase, PhaseName, RollbackRecord};
use super::error::{DeployError, DeploymentFailed};
use super::pipeline::{PhaseContext, Pipeline};
use super::report::ReportWriter;
use super::rollback;
use super::state::{Completed, Initialized};
use super::target::DeployTarget;

/// A pipeline that stopped before completing, with whatever it had recorded.
struct PhaseFailure {
    record: Deployment,
    snapshot: DeploymentState,
    error: DeployError,
}

impl<S> From<(Pipeline<S>, DeployError)> for PhaseFailure {
    fn from((pipeline, error): (Pipeline<S>, DeployError)) -> Self {
        let (record, snapshot) = pipeline.into_parts();
        Self {
            record,
            snapshot,
            error,
        }
    }
}

impl PhaseFailure {
    /// The phase that was running when the pipeline stopped.
    fn failed_phase(&self) -> Option<PhaseName> {
        PhaseName::ALL.get(self.record.phases.len()).copied()
    }
}

/// Runs blue-green deployments against one pair of environments.
pub struct Orchestrator<P, S, T> {
    config: Config,
    prober: P,
    store: S,
    target: T,
    report: ReportWriter,
}

impl<P, S, T> Orchestrator<P, S, T>
where
    P: HealthProber,
    S: StateStore,
    T: DeployTarget,
{
    pub fn new(config: Config, prober: P, store: S, target: T) -> Self {
        let report = ReportWriter::new(config.files.report.clone());
        Self {
            config,
            prober,
            store,
            target,
            report,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn report(&self) -> &ReportWriter {
        &self.report
    }

    fn context<'a>(&'a self, output: &'a Output) -> PhaseContext<'a> {
        PhaseContext {
            config: &self.config,
            prober: &self.prober,
            store: &self.store,
            target: &self.target,
            output,
        }
    }

    /// Release `version` into the inactive environment and move traffic to it.
    ///
    /// Phases run in a fixed order. A failure in any phase before
    /// post-verification marks the deployment failed. Unless this is a dry
    /// run or the pre-check itself failed, traffic is then rolled back to the
    /// environment that was live before.
    /// A failed pre-health-check never reaches rollback: nothing has been
    /// deployed or switched yet, so its `UnhealthyEnvironment` is returned as is.
    /// The report file is written on every path.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentFailed`] carrying the failed record. Its error is
    /// `RollbackFailed` when the automatic rollback could not restore service.
    pub async fn perform_blue_green_deployment(
        &self,
        version: Version,
        dry_run: bool,
        output: &Output,
        diag: &mut Diagnostics,
    ) -> Result<Deployment, DeploymentFailed> {
        let ctx = self.context(output);
        let snapshot = self.store.load().await;
        let pipeline = Pipeline::new(version, snapshot, dry_run);

        tracing::info!(
            deployment = %pipeline.record().id,
            dry_run,
            "deploying {} from {} to {}",
            pipeline.version(),
            pipeline.source(),
            pipeline.target()
        );

        match self.run_phases(pipeline, &ctx, diag).await {
            Ok(completed) => {
                let (deployment, state) = completed.finish();
                if !deployment.dry_run
                    && let Err(e) = self.store.save(&state).await
                {
                    diag.warn(Warning::state_write(format!(
                        "failed to mark deployment {} completed in state: {e}",
                        deployment.id
                    )));
                }
                self.write_report(&deployment, diag).await;
                Ok(deployment)
            }
            Err(failure) => {
                let (deployment, error) = self.handle_failure(failure, &ctx, diag).await;
                self.write_report(&deployment, diag).await;
                Err(DeploymentFailed {
                    deployment: Box::new(deployment),
                    error,
                })
            }
        }
    }

    async fn run_phases(
        &self,
        pipeline: Pipeline<Initialized>,
        ctx: &PhaseContext<'_>,
        diag: &mut Diagnostics,
    ) -> Result<Pipeline<Completed>, PhaseFailure> {
        let pipeline = pipeline.pre_health_check(ctx).await?;
        let pipeline = pipeline.deploy_target(ctx).await?;
        let pipeline = pipeline.warmup_verification(ctx).await?;
        let pipeline = pipeline.switch_traffic(ctx).await?;
        Ok(pipeline.post_verification(ctx, diag).await)
    }

    /// Mark the record failed, roll back, and persist the outcome.
    async fn handle_failure(
        &self,
        failure: PhaseFailure,
        ctx: &PhaseContext<'_>,
        diag: &mut Diagnostics,
    ) -> (Deployment, DeployError) {
        let phase = failure.failed_phase();
        let PhaseFailure {
            mut record,
            mut snapshot,
            mut error,
        } = failure;

        tracing::error!(
            deployment = %record.id,
            phase = ?phase,
            "deployment failed: {}",
            error
        );
        record.status = DeploymentStatus::Failed;
        record.error = Some(error.to_string());

        if record.dry_run {
            return (record, error);
        }

        if record.phases.is_empty() {
            // Failed the pre-check: nothing was deployed or switched
            tracing::info!(deployment = %record.id, "no changes made, skipping rollback");
        } else {
            ctx.output.progress("  → Rolling back...");
            match rollback::restore(ctx, &mut snapshot, record.target_environment).await {
                Ok(outcome) => {
                    ctx.output.progress(&format!(
                        "  ✓ Rolled back, {} is live",
                        outcome.restored_environment
                    ));
                    record.rollback = Some(outcome);
                }
                Err(rollback_error) => {
                    tracing::error!(deployment = %record.id, "rollback failed: {}", rollback_error);
                    record.rollback = Some(RollbackRecord::failed(
                        record.source_environment,
                        rollback_error.to_string(),
                    ));
                    error = rollback_error;
                }
            }
        }

        if !snapshot.update(&record) {
            snapshot.record(record.clone(), self.config.deploy.history_limit);
        }
        if let Err(e) = self.store.save(&snapshot).await {
            diag.warn(Warning::state_write(format!(
                "failed to record failed deployment {}: {e}",
                record.id
            )));
        }

        (record, error)
    }

    /// Move traffic back to the inactive environment, recording it as a
    /// deployment of whatever version that environment last received.
    ///
    /// # Errors
    ///
    /// Returns `RollbackFailed` if the inactive environment is unhealthy or
    /// the switch fails, and a state error if the flip cannot be persisted.
    pub async fn rollback(
        &self,
        output: &Output,
        diag: &mut Diagnostics,
    ) -> Result<Deployment, DeployError> {
        let ctx = self.context(output);
        let mut state = self.store.load().await;
        let from = state.current_environment;
        let to = from.other();
        let version = state
            .version_in(to)
            .cloned()
            .unwrap_or_else(Version::unknown);

        tracing::info!("manual rollback from {} to {} ({})", from, to, version);
        let mut record = Deployment::start(version, from, false);

        let started = Instant::now();
        rollback::verify_fallback(&ctx, to).await?;
        record
            .phases
            .push(Phase::completed(PhaseName::PreHealthCheck, started.elapsed()));

        let started = Instant::now();
        rollback::switch_back(&ctx, from, to).await?;
        record
            .phases
            .push(Phase::completed(PhaseName::TrafficSwitch, started.elapsed()));

        record.status = DeploymentStatus::Completed;
        record.rollback = Some(RollbackRecord::completed(to));

        state.current_environment = to;
        state.record(record.clone(), self.config.deploy.history_limit);
        self.store.save(&state).await?;

        self.write_report(&record, diag).await;
        Ok(record)
    }

    /// Check blue, green, and production concurrently.
    pub async fn health_report(&self) -> Vec<EnvironmentHealth> {
        let targets = [CheckTarget::Blue, CheckTarget::Green, CheckTarget::Production];
        join_all(targets.into_iter().map(|target| {
            check_environment(
                &self.prober,
                target,
                self.config.environments.target_url(target),
                &self.config.health,
            )
        }))
        .await
    }

    /// The persisted state as currently stored.
    pub async fn status(&self) -> DeploymentState {
        self.store.load().await
    }

    async fn write_report(&self, deployment: &Deployment, diag: &mut Diagnostics) {
        match self.report.write(deployment).await {
            Ok(()) => tracing::debug!("report written to {}", self.report.path().display()),
            Err(e) => diag.warn(Warning::report_write(format!(
                "failed to write deployment report: {e}"
            ))),
        }
    }
}
