//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `init`: Write a default `.locsyncrc.json`
//! - `collect`: Scan source trees and print the collected records
//! - `diff`: Compare collected records against the existing store
//! - `push`: Upload collected records to the remote service
//! - `pull`: Fetch remote records and write them into the store
//! - `health`: Probe the remote service

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Command> {
        match self.command {
            Some(command) => Some(command),
            None => {
                Self::command().print_help().ok();
                None
            }
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Config file path (default: search upward for .locsyncrc.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bearer token for the remote API
    #[arg(long, env = "LOCSYNC_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Remote API base URL (overrides config file)
    #[arg(long, env = "LOCSYNC_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct CollectCommand {
    /// Scan only these paths instead of the configured roots
    #[arg(long = "path")]
    pub paths: Vec<PathBuf>,

    /// Scan only these modules
    #[arg(long = "module")]
    pub modules: Vec<String>,

    /// Print collected records as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct DiffCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct PushCommand {
    /// Records per upload chunk (overrides config file)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// First-time integration: bulk-push existing store values per language
    #[arg(long)]
    pub init: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct PullCommand {
    /// Languages to pull (default: configured languages)
    #[arg(long = "language")]
    pub languages: Vec<String>,

    /// Replace store files instead of merging
    #[arg(long)]
    pub overwrite: bool,

    /// Skip the overwrite confirmation prompt
    #[arg(long)]
    pub force: bool,

    /// Report what would be written without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct HealthCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize locsync configuration file
    Init,
    /// Scan source trees for translation references
    Collect(CollectCommand),
    /// Diff collected records against the existing store
    Diff(DiffCommand),
    /// Upload collected records to the remote service
    Push(PushCommand),
    /// Fetch remote records and write them to the store
    Pull(PullCommand),
    /// Check the remote service connection
    Health(HealthCommand),
}
