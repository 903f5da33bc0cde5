//! Command-line flags for the restore flow
//!
//! [`RestoreArgs`] can be flattened into a host process's own clap parser.
//! Every flag is optional and only overrides what the config file says.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use super::duration::parse_duration;
use super::restore::RestoreConfig;

#[derive(Args, Debug, Clone, Default)]
pub struct RestoreArgs {
    /// (init restore parameter) check backup storage for a recent backup at startup and start there
    #[arg(long)]
    pub restore_from_backup: bool,

    /// (init restore parameter) how many concurrent files to restore at once
    #[arg(long)]
    pub restore_concurrency: Option<usize>,

    /// (init restore parameter) if greater than 0, keep checking at this interval for a backup to appear
    #[arg(long, value_parser = parse_duration)]
    pub wait_for_backup_interval: Option<Duration>,

    /// (init restore parameter) host name of binlog server
    #[arg(long)]
    pub binlog_host: Option<String>,

    /// (init restore parameter) port of binlog server
    #[arg(long)]
    pub binlog_port: Option<u16>,

    /// (init restore parameter) username of binlog server
    #[arg(long)]
    pub binlog_user: Option<String>,

    /// (init restore parameter) password of binlog server
    #[arg(long)]
    pub binlog_password: Option<String>,

    /// (init restore parameter) timeout for fetching gtid from timestamp
    #[arg(long, value_parser = parse_duration)]
    pub binlog_timeout: Option<Duration>,

    /// role to come up as after restoring a node that was BACKUP or RESTORE
    #[arg(long)]
    pub init_tablet_type: Option<String>,

    /// timeout for calls to other nodes
    #[arg(long, value_parser = parse_duration)]
    pub remote_operation_timeout: Option<Duration>,

    /// enable semi-sync when reattaching to the primary
    #[arg(long)]
    pub enable_semi_sync: bool,

    /// path to the storage engine config file
    #[arg(long)]
    pub engine_config: Option<PathBuf>,
}

impl RestoreArgs {
    /// Overlay flags that were given on top of `config`.
    pub fn apply(self, mut config: RestoreConfig) -> RestoreConfig {
        if self.restore_from_backup {
            config.restore_from_backup = true;
        }
        if let Some(v) = self.restore_concurrency {
            config.restore_concurrency = v;
        }
        if let Some(v) = self.wait_for_backup_interval {
            config.wait_for_backup_interval = v;
        }
        if self.binlog_host.is_some() {
            config.binlog_host = self.binlog_host;
        }
        if self.binlog_port.is_some() {
            config.binlog_port = self.binlog_port;
        }
        if self.binlog_user.is_some() {
            config.binlog_user = self.binlog_user;
        }
        if self.binlog_password.is_some() {
            config.binlog_password = self.binlog_password;
        }
        if let Some(v) = self.binlog_timeout {
            config.binlog_timeout = v;
        }
        if self.init_tablet_type.is_some() {
            config.init_tablet_type = self.init_tablet_type;
        }
        if let Some(v) = self.remote_operation_timeout {
            config.remote_operation_timeout = v;
        }
        if self.enable_semi_sync {
            config.enable_semi_sync = true;
        }
        if self.engine_config.is_some() {
            config.engine_config = self.engine_config;
        }
        config
    }
}
