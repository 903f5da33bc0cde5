//! Advertised node roles
//!
//! Roles form a closed set. Each role carries a static promotion
//! eligibility attribute instead of it being computed at call sites.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role a node advertises to the rest of the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Writable primary of its shard
    Primary,
    /// Serving replica, may be promoted
    Replica,
    /// Read-only replica for batch traffic
    ReadOnly,
    /// Standby, not serving
    Spare,
    /// Serving experimental traffic only
    Experimental,
    /// Taking a backup
    Backup,
    /// Restoring from backup
    Restore,
    /// Taken out of service by an operator
    Drained,
}

impl NodeRole {
    pub const ALL: [NodeRole; 8] = [
        NodeRole::Primary,
        NodeRole::Replica,
        NodeRole::ReadOnly,
        NodeRole::Spare,
        NodeRole::Experimental,
        NodeRole::Backup,
        NodeRole::Restore,
        NodeRole::Drained,
    ];

    /// Whether a node in this role may be promoted to primary.
    pub fn is_promotion_eligible(&self) -> bool {
        matches!(self, NodeRole::Primary | NodeRole::Replica)
    }

    /// Roles a node only holds while an administrative action runs.
    pub fn is_transient(&self) -> bool {
        matches!(self, NodeRole::Backup | NodeRole::Restore)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Primary => "PRIMARY",
            NodeRole::Replica => "REPLICA",
            NodeRole::ReadOnly => "RDONLY",
            NodeRole::Spare => "SPARE",
            NodeRole::Experimental => "EXPERIMENTAL",
            NodeRole::Backup => "BACKUP",
            NodeRole::Restore => "RESTORE",
            NodeRole::Drained => "DRAINED",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIMARY" | "MASTER" => Ok(NodeRole::Primary),
            "REPLICA" => Ok(NodeRole::Replica),
            "RDONLY" | "READ_ONLY" | "BATCH" => Ok(NodeRole::ReadOnly),
            "SPARE" => Ok(NodeRole::Spare),
            "EXPERIMENTAL" => Ok(NodeRole::Experimental),
            "BACKUP" => Ok(NodeRole::Backup),
            "RESTORE" => Ok(NodeRole::Restore),
            "DRAINED" => Ok(NodeRole::Drained),
            other => Err(format!("unknown node role: {}", other)),
        }
    }
}
