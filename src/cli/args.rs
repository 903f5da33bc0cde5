//! CLI argument definitions using clap
//!
//! Commands:
//! - node-restore check-config [--config <path>] [restore flags]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::RestoreArgs;

/// node-restore - restore a replica node from backup and reattach it
#[derive(Parser, Debug)]
#[command(name = "node-restore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a restore configuration and print the effective values
    CheckConfig {
        /// Path to configuration file (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        restore: RestoreArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
