// ABOUTME: Command module aggregator for the bgdeploy CLI.
// ABOUTME: Re-exports deploy, dry-run, rollback, status, and health command handlers.

mod context;
mod deploy;
mod health;
mod rollback;
mod status;

pub use context::load_config;
pub use deploy::{deploy, dry_run};
pub use health::health;
pub use rollback::rollback;
pub use status::status;
