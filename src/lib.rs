//! node-restore - bring an empty replica node back into its cluster
//!
//! Restores the latest backup, optionally rolls forward to a point in time
//! using a change-event stream, and reattaches the node to its shard
//! primary. Collaborators (backup storage, topology, storage engine,
//! change stream) are traits; see [`restore::RestoreDeps`].

pub mod backup;
pub mod binlog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod node;
pub mod observability;
pub mod position;
pub mod restore;
pub mod topology;
