//! Node handle
//!
//! Owns the node's topology record and its advertised role. The role can
//! only be changed by a caller holding the action lock, which the
//! signature of [`NodeHandle::set_role`] enforces.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::errors::NodeResult;
use super::lock::{ActionGuard, ActionLock};
use crate::topology::{NodeRecord, NodeRole};

/// Persists and advertises the node record (health reporting, topology).
#[async_trait]
pub trait StatePublisher: Send + Sync {
    async fn publish(&self, record: &NodeRecord, reason: &str) -> NodeResult<()>;
}

/// Shared handle to the local node.
pub struct NodeHandle {
    record: RwLock<NodeRecord>,
    lock: ActionLock,
    publisher: Arc<dyn StatePublisher>,
}

impl NodeHandle {
    pub fn new(record: NodeRecord, publisher: Arc<dyn StatePublisher>) -> Self {
        Self {
            record: RwLock::new(record),
            lock: ActionLock::new(),
            publisher,
        }
    }

    /// Current copy of the node record.
    pub fn record(&self) -> NodeRecord {
        self.record
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn role(&self) -> NodeRole {
        self.record
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .role
    }

    pub fn action_lock(&self) -> &ActionLock {
        &self.lock
    }

    /// Change the advertised role and publish it.
    ///
    /// The local record is updated even if publishing fails, so the node
    /// never advertises one role while believing it holds another.
    pub async fn set_role(
        &self,
        _held: &ActionGuard,
        role: NodeRole,
        reason: &str,
    ) -> NodeResult<()> {
        let snapshot = {
            let mut record = self
                .record
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            record.role = role;
            record.clone()
        };
        self.publisher.publish(&snapshot, reason).await
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("record", &self.record())
            .field("locked", &self.lock.is_held())
            .finish()
    }
}
