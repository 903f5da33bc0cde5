//! Topology records: node identity, keyspaces and shards

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::NodeRole;

/// Cluster-unique node identity: the cell it lives in plus a numeric uid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeAlias {
    pub cell: String,
    pub uid: u32,
}

impl NodeAlias {
    pub fn new(cell: impl Into<String>, uid: u32) -> Self {
        Self {
            cell: cell.into(),
            uid,
        }
    }
}

impl fmt::Display for NodeAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:010}", self.cell, self.uid)
    }
}

/// What the topology service knows about a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub alias: NodeAlias,
    /// Storage engine host other nodes replicate from
    pub hostname: String,
    /// Storage engine port other nodes replicate from
    pub port: u16,
    pub keyspace: String,
    pub shard: String,
    pub role: NodeRole,
    #[serde(default)]
    pub db_name_override: Option<String>,
}

impl NodeRecord {
    /// Database this node serves: the override if set, else `vt_<keyspace>`.
    pub fn db_name(&self) -> String {
        match &self.db_name_override {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("vt_{}", self.keyspace),
        }
    }

    /// `<keyspace>.<shard>`
    pub fn cluster_alias(&self) -> String {
        format!("{}.{}", self.keyspace, self.shard)
    }
}

/// Keyspace flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyspaceKind {
    /// Regular keyspace with live replication
    Normal,
    /// Point-in-time clone of a base keyspace
    Snapshot,
}

/// Keyspace metadata relevant to restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceDescriptor {
    pub name: String,
    pub kind: KeyspaceKind,
    #[serde(default)]
    pub base_keyspace: Option<String>,
    /// Presence requests point-in-time recovery to this instant
    #[serde(default)]
    pub snapshot_time: Option<DateTime<Utc>>,
}

impl KeyspaceDescriptor {
    pub fn normal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: KeyspaceKind::Normal,
            base_keyspace: None,
            snapshot_time: None,
        }
    }

    pub fn snapshot(
        name: impl Into<String>,
        base_keyspace: impl Into<String>,
        snapshot_time: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: KeyspaceKind::Snapshot,
            base_keyspace: Some(base_keyspace.into()),
            snapshot_time: Some(snapshot_time),
        }
    }

    /// Keyspace whose backups should be restored.
    ///
    /// Snapshot keyspaces restore from their base keyspace; `None` means a
    /// snapshot keyspace without a usable base.
    pub fn backup_source(&self) -> Option<&str> {
        match self.kind {
            KeyspaceKind::Normal => Some(self.name.as_str()),
            KeyspaceKind::Snapshot => self
                .base_keyspace
                .as_deref()
                .filter(|base| !base.is_empty()),
        }
    }
}

/// Shard record. Only the primary assignment matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRecord {
    pub keyspace: String,
    pub shard: String,
    #[serde(default)]
    pub primary_alias: Option<NodeAlias>,
}
