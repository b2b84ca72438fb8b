// ABOUTME: Rollback command implementation.
// ABOUTME: Switches traffic back to the inactive environment after checking its health.

use super::context::{emit_warnings, orchestrator};
use bgdeploy::config::Config;
use bgdeploy::deploy::DeployLock;
use bgdeploy::diagnostics::Diagnostics;
use bgdeploy::error::Result;
use bgdeploy::output::Output;
use bgdeploy::state::FileStateStore;

/// Switch traffic back to the environment that is not live.
pub async fn rollback(config: Config, force: bool, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress("  → Acquiring deploy lock...");
    let _lock = DeployLock::acquire(&config.files.state, force).await?;

    let store = FileStateStore::new(config.files.state.clone());
    let orchestrator = orchestrator(config, store);

    output.progress("Rolling back");
    let record = orchestrator.rollback(&output, &mut diag).await?;

    emit_warnings(&output, &diag);
    output.data("rollback", &record);
    output.success(&format!(
        "Rolled back to {} ({}), {} is live",
        record.target_environment, record.version, record.target_environment
    ));
    Ok(())
}
