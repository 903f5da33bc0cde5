//! CLI module for node-restore
//!
//! Provides command-line interface for:
//! - check-config: Validate a restore configuration and print it

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
