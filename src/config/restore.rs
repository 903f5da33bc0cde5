//! Restore configuration
//!
//! Built once at startup from a JSON file and/or command-line flags and
//! handed to the orchestrator. Nothing reads configuration from globals.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::duration;
use super::errors::{ConfigError, ConfigResult};
use crate::binlog::StreamSource;
use crate::topology::NodeRole;

/// Everything the restore flow can be configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreConfig {
    /// Check backup storage for a recent backup at startup and start there
    #[serde(default)]
    pub restore_from_backup: bool,

    /// How many files to restore at once (default 4)
    #[serde(default = "default_restore_concurrency")]
    pub restore_concurrency: usize,

    /// If non-zero, keep checking at this interval for a backup to appear
    /// instead of starting up empty (default 0, disabled)
    #[serde(default, with = "duration")]
    pub wait_for_backup_interval: Duration,

    /// Host of the change-event source used for point-in-time recovery
    #[serde(default)]
    pub binlog_host: Option<String>,

    #[serde(default)]
    pub binlog_port: Option<u16>,

    #[serde(default)]
    pub binlog_user: Option<String>,

    #[serde(default)]
    pub binlog_password: Option<String>,

    /// Bounds the timestamp-to-position lookup and the catch-up (default 60s)
    #[serde(default = "default_binlog_timeout", with = "duration")]
    pub binlog_timeout: Duration,

    /// Role to come up as when the node was BACKUP or RESTORE before
    #[serde(default)]
    pub init_tablet_type: Option<String>,

    /// Bounds calls to other nodes (default 30s)
    #[serde(default = "default_remote_operation_timeout", with = "duration")]
    pub remote_operation_timeout: Duration,

    /// Configure semi-sync before connecting to the primary
    #[serde(default)]
    pub enable_semi_sync: bool,

    /// Storage engine config file; restore refuses to run without it
    #[serde(default)]
    pub engine_config: Option<PathBuf>,

    /// Local position poll cadence during catch-up (default 300ms)
    #[serde(default = "default_catchup_poll_interval", with = "duration")]
    pub catchup_poll_interval: Duration,

    /// Replication status poll cadence after reattaching (default 1s)
    #[serde(default = "default_replication_poll_interval", with = "duration")]
    pub replication_poll_interval: Duration,
}

fn default_restore_concurrency() -> usize {
    4
}
fn default_binlog_timeout() -> Duration {
    Duration::from_secs(60)
}
fn default_remote_operation_timeout() -> Duration {
    Duration::from_secs(30)
}
fn default_catchup_poll_interval() -> Duration {
    Duration::from_millis(300)
}
fn default_replication_poll_interval() -> Duration {
    Duration::from_secs(1)
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            restore_from_backup: false,
            restore_concurrency: default_restore_concurrency(),
            wait_for_backup_interval: Duration::ZERO,
            binlog_host: None,
            binlog_port: None,
            binlog_user: None,
            binlog_password: None,
            binlog_timeout: default_binlog_timeout(),
            init_tablet_type: None,
            remote_operation_timeout: default_remote_operation_timeout(),
            enable_semi_sync: false,
            engine_config: None,
            catchup_poll_interval: default_catchup_poll_interval(),
            replication_poll_interval: default_replication_poll_interval(),
        }
    }
}

impl RestoreConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: RestoreConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.restore_concurrency == 0 {
            return Err(ConfigError::invalid(
                "restore_concurrency",
                "must be greater than 0",
            ));
        }

        if let Some(raw) = self.init_tablet_type.as_deref().filter(|s| !s.is_empty()) {
            let role: NodeRole = raw
                .parse()
                .map_err(|e: String| ConfigError::invalid("init_tablet_type", e))?;
            if role.is_transient() {
                return Err(ConfigError::invalid(
                    "init_tablet_type",
                    format!("{} is not a valid initial role", role),
                ));
            }
        }

        let host_set = self.binlog_host.as_deref().is_some_and(|h| !h.is_empty());
        if !host_set && self.binlog_port.is_some_and(|p| p > 0) {
            return Err(ConfigError::invalid(
                "binlog_host",
                "binlog_port is set but binlog_host is empty",
            ));
        }

        if self.catchup_poll_interval.is_zero() {
            return Err(ConfigError::invalid(
                "catchup_poll_interval",
                "must be greater than 0",
            ));
        }
        if self.replication_poll_interval.is_zero() {
            return Err(ConfigError::invalid(
                "replication_poll_interval",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// PITR source, if host, port and user are all configured.
    pub fn pitr_source(&self) -> Option<StreamSource> {
        let host = self.binlog_host.as_deref().filter(|h| !h.is_empty())?;
        let port = self.binlog_port.filter(|p| *p > 0)?;
        let user = self.binlog_user.as_deref().filter(|u| !u.is_empty())?;
        Some(StreamSource {
            host: host.to_string(),
            port,
            user: user.to_string(),
            password: self.binlog_password.clone().unwrap_or_default(),
        })
    }

    /// Role to resolve to instead of BACKUP/RESTORE, if configured.
    ///
    /// A transient role is never a fallback, even on an unvalidated config.
    pub fn fallback_role(&self) -> Option<NodeRole> {
        self.init_tablet_type
            .as_deref()
            .and_then(|raw| raw.parse::<NodeRole>().ok())
            .filter(|role| !role.is_transient())
    }

    /// Copy with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.binlog_password.is_some() {
            copy.binlog_password = Some("****".to_string());
        }
        copy
    }
}
