// ABOUTME: Status command implementation.
// ABOUTME: Prints the live environment, last deployment, and recent history.

use super::context::orchestrator;
use bgdeploy::config::Config;
use bgdeploy::error::Result;
use bgdeploy::output::Output;
use bgdeploy::state::FileStateStore;

pub async fn status(config: Config, output: Output) -> Result<()> {
    let store = FileStateStore::new(config.files.state.clone());
    let state = orchestrator(config, store).status().await;

    if output.is_json() {
        output.data("status", &state);
        return Ok(());
    }

    output.result(&format!("Live environment: {}", state.current_environment));
    output.progress(&format!(
        "Inactive environment: {}",
        state.inactive_environment()
    ));

    match &state.last_deployment {
        Some(last) => output.progress(&format!(
            "Last deployment: {} {} ({}) at {}",
            last.id,
            last.version,
            last.status,
            last.timestamp.to_rfc3339()
        )),
        None => output.progress("No deployments recorded"),
    }

    if !state.deployment_history.is_empty() {
        output.progress("History (newest first):");
        for d in state.deployment_history.iter().rev() {
            output.progress(&format!(
                "  {}  {:<16} {:<11} {} → {}",
                d.timestamp.format("%Y-%m-%d %H:%M:%S"),
                d.version.as_str(),
                d.status.to_string(),
                d.source_environment,
                d.target_environment
            ));
        }
    }

    Ok(())
}
