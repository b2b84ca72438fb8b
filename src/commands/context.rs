// ABOUTME: Shared helpers for loading configuration and wiring the orchestrator.
// ABOUTME: Eliminates duplication across deploy, rollback, status, and health commands.

use bgdeploy::config::Config;
use bgdeploy::deploy::{CommandTarget, Orchestrator};
use bgdeploy::diagnostics::Diagnostics;
use bgdeploy::error::Result;
use bgdeploy::health::HttpProber;
use bgdeploy::output::Output;
use bgdeploy::state::StateStore;
use std::env;
use std::path::Path;

/// Load the configuration the command runs with.
///
/// An explicit path must exist; otherwise the working directory is searched
/// and defaults are used when nothing is found. Environment URL overrides
/// are applied last, and relative file paths resolve against the working
/// directory.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let cwd = env::current_dir()?;
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover(&cwd)?,
    };

    let config = config.with_env_overrides().resolve_paths(&cwd);
    config.validate()?;
    Ok(config)
}

/// Build an orchestrator that probes over HTTP and runs the configured commands.
pub fn orchestrator<S: StateStore>(
    config: Config,
    store: S,
) -> Orchestrator<HttpProber, S, CommandTarget> {
    let prober = HttpProber::new(config.health.timeout);
    let target = CommandTarget::from_config(&config.deploy);
    Orchestrator::new(config, prober, store, target)
}

/// Emit collected warnings.
pub fn emit_warnings(output: &Output, diag: &Diagnostics) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}
