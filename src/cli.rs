// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and global output flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bgdeploy")]
#[command(about = "Blue-green deployments with health verification and automatic rollback")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file (defaults to bgdeploy.yml discovery)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a bgdeploy.yml with the defaults
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Deploy a version to the inactive environment and switch traffic to it
    Deploy {
        /// Version to deploy
        version: String,

        /// Break an existing deploy lock
        #[arg(long)]
        force: bool,
    },

    /// Run the deployment pipeline without deploying or switching traffic
    #[command(name = "dry-run")]
    DryRun {
        /// Version to simulate
        version: String,
    },

    /// Show the live environment and recent deployments
    Status,

    /// Switch traffic back to the inactive environment
    Rollback {
        /// Break an existing deploy lock
        #[arg(long)]
        force: bool,
    },

    /// Check the health of blue, green, and production
    Health,
}
