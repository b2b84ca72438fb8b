// ABOUTME: Health command implementation.
// ABOUTME: Probes blue, green, and production; fails when the live environment is unhealthy.

use super::context::orchestrator;
use bgdeploy::config::Config;
use bgdeploy::deploy::DeployError;
use bgdeploy::error::Result;
use bgdeploy::health::{CheckTarget, HealthStatus};
use bgdeploy::output::Output;
use bgdeploy::state::FileStateStore;

pub async fn health(config: Config, output: Output) -> Result<()> {
    let threshold_percent = config.health.threshold_percent();
    let store = FileStateStore::new(config.files.state.clone());
    let orchestrator = orchestrator(config, store);

    let live = CheckTarget::from(orchestrator.status().await.current_environment);
    let reports = orchestrator.health_report().await;

    output.data("health", &reports);
    for report in &reports {
        let marker = if report.target == live { " (live)" } else { "" };
        output.result(&format!(
            "{}{marker}: {} ({}/{} endpoints healthy) {}",
            report.target,
            if report.healthy { "healthy" } else { "unhealthy" },
            report.healthy_count,
            report.total,
            report.url
        ));
        for result in &report.results {
            let status = match result.status {
                HealthStatus::Healthy => "ok",
                HealthStatus::Unhealthy => "unhealthy",
                HealthStatus::Error => "error",
            };
            let detail = result.error.as_deref().unwrap_or("");
            output.progress(&format!(
                "    {:<9} {:>5}ms {} {detail}",
                status, result.response_time, result.url
            ));
        }
    }

    match reports.iter().find(|r| r.target == live) {
        Some(report) if !report.healthy => {
            Err(DeployError::unhealthy(report, threshold_percent).into())
        }
        _ => Ok(()),
    }
}
