//! Topology collaborator traits

use async_trait::async_trait;

use super::errors::TopologyResult;
use super::records::{KeyspaceDescriptor, NodeAlias, NodeRecord, ShardRecord};

/// Cluster metadata store.
#[async_trait]
pub trait TopologyService: Send + Sync {
    async fn get_keyspace(&self, keyspace: &str) -> TopologyResult<KeyspaceDescriptor>;

    async fn get_shard(&self, keyspace: &str, shard: &str) -> TopologyResult<ShardRecord>;

    async fn get_node(&self, alias: &NodeAlias) -> TopologyResult<NodeRecord>;
}

/// RPC client for talking to other nodes' managers.
#[async_trait]
pub trait RemoteNodeClient: Send + Sync {
    /// Encoded replication position of a (presumed) primary.
    async fn primary_position(&self, node: &NodeRecord) -> TopologyResult<String>;
}
