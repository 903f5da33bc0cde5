//! Backup manifest
//!
//! Records what a backup contains. The restore flow only relies on the
//! replication position the backup represents; the rest is carried for
//! logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{BackupError, BackupResult};
use crate::position::Position;

/// Current manifest format version
pub const MANIFEST_FORMAT_VERSION: u8 = 1;

/// Manifest of a restored backup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupManifest {
    /// Backup name in backup storage
    pub backup_name: String,

    /// When the backup was taken
    pub backup_time: DateTime<Utc>,

    /// Replication position the backup data corresponds to
    pub position: Position,

    pub keyspace: String,
    pub shard: String,

    /// Backup engine that produced it
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_format_version")]
    pub format_version: u8,
}

fn default_engine() -> String {
    "builtin".to_string()
}

fn default_format_version() -> u8 {
    MANIFEST_FORMAT_VERSION
}

impl BackupManifest {
    pub fn new(
        backup_name: impl Into<String>,
        backup_time: DateTime<Utc>,
        position: Position,
        keyspace: impl Into<String>,
        shard: impl Into<String>,
    ) -> Self {
        Self {
            backup_name: backup_name.into(),
            backup_time,
            position,
            keyspace: keyspace.into(),
            shard: shard.into(),
            engine: default_engine(),
            format_version: MANIFEST_FORMAT_VERSION,
        }
    }

    /// Serializes the manifest to JSON
    pub fn to_json(&self) -> BackupResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            BackupError::Manifest(format!("failed to serialize backup manifest: {}", e))
        })
    }

    /// Deserializes the manifest from JSON
    pub fn from_json(json: &str) -> BackupResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BackupError::Manifest(format!("failed to parse backup manifest: {}", e)))
    }
}
