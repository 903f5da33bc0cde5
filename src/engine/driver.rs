//! Storage engine driver trait

use async_trait::async_trait;

use super::command::EngineCommand;
use super::errors::EngineResult;
use crate::position::Position;

/// Snapshot of the local replication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationStatus {
    /// Position applied so far
    pub position: Position,
    pub fetch_thread_running: bool,
    pub apply_thread_running: bool,
    pub source_host: Option<String>,
    pub source_port: u16,
}

/// How to switch replication source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Stop replication before changing source
    pub stop_before: bool,
    /// Start both replication threads afterwards
    pub start_after: bool,
}

/// Control surface of the local storage engine.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Run administrative commands in order, stopping at the first failure.
    async fn execute_commands(&self, commands: &[EngineCommand]) -> EngineResult<()>;

    async fn replication_status(&self) -> EngineResult<ReplicationStatus>;

    /// Position of transactions applied locally.
    async fn current_position(&self) -> EngineResult<Position>;

    /// Overwrite the applied position (purged GTIDs) explicitly.
    async fn set_replication_position(&self, position: &Position) -> EngineResult<()>;

    async fn set_replication_source(
        &self,
        host: &str,
        port: u16,
        options: SourceOptions,
    ) -> EngineResult<()>;

    /// Toggle semi-synchronous replication on the primary and replica sides.
    async fn set_semi_sync(&self, primary: bool, replica: bool) -> EngineResult<()>;
}
