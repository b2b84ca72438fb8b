// ABOUTME: Library root for bgdeploy - blue-green orchestration, health probing, state.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod output;
pub mod state;
pub mod types;
