//! Restore orchestrator
//!
//! Top-level state machine: lock, advertise RESTORE, restore the backup
//! (retrying while none exists), optionally roll forward to the snapshot
//! time, reattach to the primary, and resolve the final role.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::errors::{RestoreError, RestoreResult};
use super::pitr::{run_pitr, PitrOutcome};
use super::reattach::{ReattachManager, ReattachSettings};
use crate::backup::{BackupError, BackupManifest, BackupRestorer, BackupResult, RestoreRequest};
use crate::binlog::ChangeStreamClient;
use crate::config::{duration, RestoreConfig};
use crate::engine::StorageEngine;
use crate::node::{ActionGuard, NodeHandle};
use crate::observability::{log_event_with_fields, Event, Logger, Timer};
use crate::position::Position;
use crate::topology::{
    KeyspaceDescriptor, KeyspaceKind, NodeRecord, NodeRole, RemoteNodeClient, TopologyService,
};

pub const REASON_RESTORE: &str = "restore from backup";
pub const REASON_FAILED: &str = "failed for restore from backup";
pub const REASON_AFTER: &str = "after restore from backup";

/// External collaborators the restore flow drives.
#[derive(Clone)]
pub struct RestoreDeps {
    pub backup: Arc<dyn BackupRestorer>,
    pub topology: Arc<dyn TopologyService>,
    pub remote: Arc<dyn RemoteNodeClient>,
    pub engine: Arc<dyn StorageEngine>,
    pub change_stream: Arc<dyn ChangeStreamClient>,
}

pub struct RestoreOrchestrator {
    config: RestoreConfig,
    node: Arc<NodeHandle>,
    deps: RestoreDeps,
}

impl RestoreOrchestrator {
    pub fn new(config: RestoreConfig, node: Arc<NodeHandle>, deps: RestoreDeps) -> Self {
        Self { config, node, deps }
    }

    pub fn config(&self) -> &RestoreConfig {
        &self.config
    }

    /// Startup entry point: restore only when restore-from-backup is
    /// enabled, waiting for a backup at the configured interval.
    pub async fn restore_on_startup(
        &self,
        cancel: &CancellationToken,
        delete_before_restore: bool,
    ) -> RestoreResult<()> {
        if !self.config.restore_from_backup {
            log_event_with_fields(
                Event::RestoreNotRequested,
                &[("reason", "restore from backup not enabled")],
            );
            return Ok(());
        }
        self.restore(
            cancel,
            self.config.wait_for_backup_interval,
            delete_before_restore,
        )
        .await
    }

    /// Restore the node from the latest backup.
    ///
    /// A zero `wait_interval` tries once. Otherwise a missing backup is
    /// retried every `wait_interval` until one appears or `cancel` fires.
    /// Any returned error is fatal to node startup.
    pub async fn restore(
        &self,
        cancel: &CancellationToken,
        wait_interval: Duration,
        delete_before_restore: bool,
    ) -> RestoreResult<()> {
        let guard = self
            .node
            .action_lock()
            .try_acquire()
            .map_err(|_| RestoreError::lock_unavailable())?;
        self.check_engine_config()?;

        let timer = Timer::new();
        let record = self.node.record();
        let original_role = record.role;
        let alias = record.alias.to_string();
        log_event_with_fields(
            Event::RestoreBegin,
            &[
                ("alias", alias.as_str()),
                ("keyspace", record.keyspace.as_str()),
                ("shard", record.shard.as_str()),
                ("original_role", original_role.as_str()),
            ],
        );

        if let Err(e) = self
            .set_role(&guard, NodeRole::Restore, REASON_RESTORE)
            .await
        {
            return Err(self.fail(&guard, original_role, e).await);
        }

        let resolved = match self
            .run(&guard, cancel, &record, original_role, wait_interval, delete_before_restore)
            .await
        {
            Ok(role) => role,
            Err(e) => return Err(self.fail(&guard, original_role, e).await),
        };

        if let Err(e) = self.set_role(&guard, resolved, REASON_AFTER).await {
            let (code, error) = (e.code().as_str(), e.to_string());
            log_event_with_fields(
                Event::RestoreFailed,
                &[("code", code), ("error", error.as_str())],
            );
            return Err(e);
        }
        let elapsed = timer.elapsed_ms();
        log_event_with_fields(
            Event::RestoreComplete,
            &[("role", resolved.as_str()), ("elapsed_ms", elapsed.as_str())],
        );
        Ok(())
    }

    /// Everything between advertising RESTORE and the final role change.
    /// Returns the role to resolve to.
    async fn run(
        &self,
        _guard: &ActionGuard,
        cancel: &CancellationToken,
        record: &NodeRecord,
        original_role: NodeRole,
        wait_interval: Duration,
        delete_before_restore: bool,
    ) -> RestoreResult<NodeRole> {
        let keyspace = self
            .deps
            .topology
            .get_keyspace(&record.keyspace)
            .await
            .map_err(|e| RestoreError::topology("can't read keyspace", e))?;
        let backup_keyspace = self.backup_keyspace(&keyspace)?;

        let request = RestoreRequest {
            concurrency: self.config.restore_concurrency,
            local_metadata: local_metadata(record, original_role),
            delete_before_restore,
            db_name: record.db_name(),
            keyspace: backup_keyspace,
            shard: record.shard.clone(),
            start_time: keyspace.snapshot_time,
        };
        let manifest = match self.restore_backup(cancel, &request, wait_interval).await? {
            Ok(manifest) => Some(manifest),
            Err(e @ (BackupError::NoBackup | BackupError::NoCompleteBackup)) => {
                let reason = e.to_string();
                log_event_with_fields(Event::BackupNotFound, &[("reason", reason.as_str())]);
                None
            }
            Err(BackupError::ExistingDatabase) => {
                // data already present; replication state is left alone
                log_event_with_fields(Event::BackupExistingDatabase, &[]);
                return Ok(self.resolve_role(original_role));
            }
            Err(e) => return Err(RestoreError::backup_failed(e)),
        };

        let start = match &manifest {
            Some(manifest) => manifest.position.clone(),
            None => Position::zero(),
        };
        let pitr = run_pitr(
            &self.config,
            &self.deps.engine,
            &self.deps.change_stream,
            cancel,
            &keyspace,
            &start,
        )
        .await?;
        if let PitrOutcome::Failed(e) = &pitr {
            let (error, code) = (e.to_string(), e.code().as_str());
            log_event_with_fields(
                Event::PitrFailed,
                &[("code", code), ("error", error.as_str())],
            );
        }

        if let Some(manifest) = manifest {
            if pitr.is_failed() {
                log_event_with_fields(
                    Event::ReattachSkipped,
                    &[("reason", "point-in-time recovery failed")],
                );
            } else if keyspace.kind == KeyspaceKind::Normal {
                let position = match pitr {
                    PitrOutcome::CaughtUp { position } => position,
                    _ => manifest.position,
                };
                // replication state is about to change; finish regardless of cancel
                let uncancellable = CancellationToken::new();
                self.reattach_manager()
                    .reattach(&uncancellable, &position, original_role)
                    .await?;
            }
        }

        Ok(self.resolve_role(original_role))
    }

    /// Storage engine config must be configured and present on disk.
    fn check_engine_config(&self) -> RestoreResult<()> {
        match &self.config.engine_config {
            None => Err(RestoreError::missing_engine_config(
                "cannot perform restore without an engine config file",
            )),
            Some(path) if !path.exists() => Err(RestoreError::missing_engine_config(format!(
                "engine config file {} does not exist",
                path.display()
            ))),
            Some(_) => Ok(()),
        }
    }

    fn backup_keyspace(&self, keyspace: &KeyspaceDescriptor) -> RestoreResult<String> {
        let source = keyspace
            .backup_source()
            .ok_or_else(|| RestoreError::invalid_keyspace(&keyspace.name))?;
        if keyspace.kind == KeyspaceKind::Snapshot {
            log_event_with_fields(
                Event::SnapshotBaseKeyspace,
                &[("keyspace", keyspace.name.as_str()), ("base_keyspace", source)],
            );
        }
        Ok(source.to_string())
    }

    /// Run the backup restore, waiting for a backup to appear when asked.
    ///
    /// The inner result is the backup outcome to classify; the outer error
    /// is cancellation.
    async fn restore_backup(
        &self,
        cancel: &CancellationToken,
        request: &RestoreRequest,
        wait_interval: Duration,
    ) -> RestoreResult<BackupResult<BackupManifest>> {
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(RestoreError::cancelled("backup restore")),
                result = self.deps.backup.restore(request) => result,
            };

            match &result {
                Ok(manifest) => {
                    let position = manifest.position.encode();
                    log_event_with_fields(
                        Event::BackupRestored,
                        &[
                            ("backup", manifest.backup_name.as_str()),
                            ("position", position.as_str()),
                        ],
                    );
                }
                Err(e) if e.is_retryable() && !wait_interval.is_zero() => {
                    let (reason, interval) =
                        (e.to_string(), duration::format_duration(wait_interval));
                    log_event_with_fields(
                        Event::BackupWait,
                        &[("reason", reason.as_str()), ("interval", interval.as_str())],
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return Err(RestoreError::cancelled("wait for backup"))
                        }
                        _ = tokio::time::sleep(wait_interval) => continue,
                    }
                }
                Err(_) => {}
            }
            return Ok(result);
        }
    }

    fn reattach_manager(&self) -> ReattachManager {
        ReattachManager::new(
            self.node.clone(),
            self.deps.engine.clone(),
            self.deps.topology.clone(),
            self.deps.remote.clone(),
            ReattachSettings {
                enable_semi_sync: self.config.enable_semi_sync,
                remote_operation_timeout: self.config.remote_operation_timeout,
                poll_interval: self.config.replication_poll_interval,
            },
        )
    }

    /// Original role, or the configured fallback for BACKUP and RESTORE.
    fn resolve_role(&self, original_role: NodeRole) -> NodeRole {
        if original_role.is_transient() {
            if let Some(fallback) = self.config.fallback_role() {
                return fallback;
            }
        }
        original_role
    }

    async fn set_role(
        &self,
        guard: &ActionGuard,
        role: NodeRole,
        reason: &str,
    ) -> RestoreResult<()> {
        let previous = self.node.role();
        self.node
            .set_role(guard, role, reason)
            .await
            .map_err(RestoreError::state_publish)?;
        log_event_with_fields(
            Event::RoleChanged,
            &[
                ("from", previous.as_str()),
                ("to", role.as_str()),
                ("reason", reason),
            ],
        );
        Ok(())
    }

    /// Put the original role back and report the error.
    async fn fail(
        &self,
        guard: &ActionGuard,
        original_role: NodeRole,
        err: RestoreError,
    ) -> RestoreError {
        if let Err(revert) = self.set_role(guard, original_role, REASON_FAILED).await {
            let error = revert.to_string();
            Logger::error("RESTORE_ROLE_REVERT_FAILED", &[("error", error.as_str())]);
        }
        let (code, error) = (err.code().as_str(), err.to_string());
        log_event_with_fields(
            Event::RestoreFailed,
            &[("code", code), ("error", error.as_str())],
        );
        err
    }
}

/// Metadata stamped onto the restored instance.
pub fn local_metadata(record: &NodeRecord, role: NodeRole) -> BTreeMap<String, String> {
    let promotion_rule = if role.is_promotion_eligible() {
        "neutral"
    } else {
        "must_not"
    };
    BTreeMap::from([
        ("Alias".to_string(), record.alias.to_string()),
        ("ClusterAlias".to_string(), record.cluster_alias()),
        ("DataCenter".to_string(), record.alias.cell.clone()),
        ("PromotionRule".to_string(), promotion_rule.to_string()),
    ])
}
