//! Topology
//!
//! Cluster membership as seen by a single node:
//! - who this node is and what role it advertises
//! - which keyspace/shard it belongs to
//! - which node is currently recorded as the shard primary
//!
//! The topology service itself is an external collaborator. This module
//! only *reads* primary assignments; it never elects one.

mod errors;
mod records;
mod role;
mod service;

pub use errors::{TopologyError, TopologyResult};
pub use records::{KeyspaceDescriptor, KeyspaceKind, NodeAlias, NodeRecord, ShardRecord};
pub use role::NodeRole;
pub use service::{RemoteNodeClient, TopologyService};
