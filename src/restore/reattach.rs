//! Reattachment to the shard primary
//!
//! Runs after the restored data is in place. Every call into the engine
//! here mutates replication state, so the orchestrator runs this under a
//! token nobody cancels.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::errors::{RestoreError, RestoreResult};
use crate::engine::{reset_replication_commands, SourceOptions, StorageEngine};
use crate::node::NodeHandle;
use crate::observability::{log_event_with_fields, Event};
use crate::position::Position;
use crate::topology::{NodeRecord, NodeRole, RemoteNodeClient, TopologyError, TopologyService};

/// Reattachment settings taken from the restore configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReattachSettings {
    pub enable_semi_sync: bool,
    pub remote_operation_timeout: Duration,
    pub poll_interval: Duration,
}

pub struct ReattachManager {
    node: Arc<NodeHandle>,
    engine: Arc<dyn StorageEngine>,
    topology: Arc<dyn TopologyService>,
    remote: Arc<dyn RemoteNodeClient>,
    settings: ReattachSettings,
}

impl ReattachManager {
    pub fn new(
        node: Arc<NodeHandle>,
        engine: Arc<dyn StorageEngine>,
        topology: Arc<dyn TopologyService>,
        remote: Arc<dyn RemoteNodeClient>,
        settings: ReattachSettings,
    ) -> Self {
        Self {
            node,
            engine,
            topology,
            remote,
            settings,
        }
    }

    /// Resume replication from `position` against the current primary.
    ///
    /// No primary recorded, this node recorded as primary, and a primary
    /// that does not answer are all logged and reported as success.
    pub async fn reattach(
        &self,
        cancel: &CancellationToken,
        position: &Position,
        original_role: NodeRole,
    ) -> RestoreResult<()> {
        let me = self.node.record();
        let encoded = position.encode();
        log_event_with_fields(
            Event::ReattachBegin,
            &[
                ("position", encoded.as_str()),
                ("role", original_role.as_str()),
            ],
        );

        self.engine
            .execute_commands(&reset_replication_commands())
            .await
            .map_err(|e| RestoreError::engine("can't reset replication", e))?;
        self.engine
            .set_replication_position(position)
            .await
            .map_err(|e| RestoreError::engine("can't set replication position", e))?;

        let shard = self
            .topology
            .get_shard(&me.keyspace, &me.shard)
            .await
            .map_err(|e| RestoreError::topology("can't read shard", e))?;

        let Some(primary_alias) = shard.primary_alias else {
            let cluster = me.cluster_alias();
            log_event_with_fields(
                Event::ReattachNoPrimary,
                &[
                    ("shard", cluster.as_str()),
                    ("position", encoded.as_str()),
                ],
            );
            return Ok(());
        };
        if primary_alias == me.alias {
            let alias = me.alias.to_string();
            log_event_with_fields(Event::ReattachSelfPrimary, &[("alias", alias.as_str())]);
            return Ok(());
        }

        let primary = self
            .topology
            .get_node(&primary_alias)
            .await
            .map_err(|e| RestoreError::topology("can't read primary node", e))?;

        if self.settings.enable_semi_sync {
            self.engine
                .set_semi_sync(
                    original_role == NodeRole::Primary,
                    original_role.is_promotion_eligible(),
                )
                .await
                .map_err(|e| RestoreError::engine("can't configure semi-sync", e))?;
        }

        self.engine
            .set_replication_source(
                &primary.hostname,
                primary.port,
                SourceOptions {
                    stop_before: false,
                    start_after: true,
                },
            )
            .await
            .map_err(|e| RestoreError::engine("can't start replication from primary", e))?;

        let primary_position = match self.primary_position(&primary).await {
            Ok(raw) => Position::decode(&raw)
                .map_err(|e| RestoreError::position("primary reported a bad position", e))?,
            Err(e) => {
                let (alias, error) = (primary_alias.to_string(), e.to_string());
                log_event_with_fields(
                    Event::ReattachPrimaryUnreachable,
                    &[("primary", alias.as_str()), ("error", error.as_str())],
                );
                return Ok(());
            }
        };

        if primary_position != *position {
            self.wait_for_replication(cancel, &primary_position).await?;
        }

        let alias = primary_alias.to_string();
        log_event_with_fields(Event::ReattachComplete, &[("primary", alias.as_str())]);
        Ok(())
    }

    async fn primary_position(&self, primary: &NodeRecord) -> Result<String, TopologyError> {
        let timeout = self.settings.remote_operation_timeout;
        tokio::time::timeout(timeout, self.remote.primary_position(primary))
            .await
            .map_err(|_| TopologyError::Timeout(timeout))?
    }

    /// Poll until the local applied position covers the primary's position
    /// observed at connect time.
    async fn wait_for_replication(
        &self,
        cancel: &CancellationToken,
        primary_position: &Position,
    ) -> RestoreResult<()> {
        let wanted = primary_position.encode();
        log_event_with_fields(Event::ReattachWaitReplication, &[("wanted", wanted.as_str())]);
        loop {
            let status = self
                .engine
                .replication_status()
                .await
                .map_err(|e| RestoreError::engine("can't read replication status", e))?;
            if status.position.at_least(primary_position) {
                return Ok(());
            }
            if !status.fetch_thread_running && !status.apply_thread_running {
                return Err(RestoreError::reattach(format!(
                    "replication stopped at {} before reaching {}",
                    status.position, wanted
                )));
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(RestoreError::cancelled("reattach")),
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }
    }
}
