//! In-memory collaborators for driving the restore flow end to end.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use node_restore::backup::{
    BackupError, BackupManifest, BackupRestorer, BackupResult, RestoreRequest,
};
use node_restore::binlog::{
    ChangeEvent, ChangeStream, ChangeStreamClient, EventFilter, StreamResult, StreamSource,
};
use node_restore::config::RestoreConfig;
use node_restore::engine::{
    EngineCommand, EngineResult, ReplicationStatus, SourceOptions, StorageEngine,
};
use node_restore::node::{NodeHandle, NodeResult, StatePublisher};
use node_restore::position::Position;
use node_restore::restore::{RestoreDeps, RestoreOrchestrator};
use node_restore::topology::{
    KeyspaceDescriptor, NodeAlias, NodeRecord, NodeRole, RemoteNodeClient, ShardRecord,
    TopologyError, TopologyResult, TopologyService,
};

pub const SID: &str = "3e11fa47-71ca-11e1-9e33-c80aa9429562";
pub const KEYSPACE: &str = "commerce";
pub const SHARD: &str = "0";

/// `MySQL56/<SID>:1-<n>`
pub fn pos(n: u64) -> Position {
    Position::decode(&format!("MySQL56/{}:1-{}", SID, n)).unwrap()
}

pub fn self_alias() -> NodeAlias {
    NodeAlias::new("zone1", 100)
}

pub fn primary_alias() -> NodeAlias {
    NodeAlias::new("zone1", 200)
}

pub fn node_record(
    alias: NodeAlias,
    hostname: &str,
    keyspace: &str,
    role: NodeRole,
) -> NodeRecord {
    NodeRecord {
        alias,
        hostname: hostname.to_string(),
        port: 3306,
        keyspace: keyspace.to_string(),
        shard: SHARD.to_string(),
        role,
        db_name_override: None,
    }
}

pub fn manifest(position: Position) -> BackupManifest {
    BackupManifest::new(
        "2026-10-01.120000.zone1-0000000300",
        chrono::Utc::now(),
        position,
        KEYSPACE,
        SHARD,
    )
}

// =============================================================================
// Backup
// =============================================================================

/// Returns scripted outcomes in order, repeating the last one.
pub struct FakeBackup {
    outcomes: Mutex<VecDeque<BackupResult<BackupManifest>>>,
    requests: Mutex<Vec<RestoreRequest>>,
}

impl FakeBackup {
    pub fn new(outcomes: Vec<BackupResult<BackupManifest>>) -> Self {
        assert!(!outcomes.is_empty());
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RestoreRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackupRestorer for FakeBackup {
    async fn restore(&self, request: &RestoreRequest) -> BackupResult<BackupManifest> {
        self.requests.lock().unwrap().push(request.clone());
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap()
        }
    }
}

// =============================================================================
// Topology
// =============================================================================

#[derive(Default)]
pub struct FakeTopology {
    pub keyspaces: Mutex<HashMap<String, KeyspaceDescriptor>>,
    pub primary: Mutex<Option<NodeAlias>>,
    pub nodes: Mutex<HashMap<NodeAlias, NodeRecord>>,
}

impl FakeTopology {
    pub fn add_keyspace(&self, keyspace: KeyspaceDescriptor) {
        self.keyspaces
            .lock()
            .unwrap()
            .insert(keyspace.name.clone(), keyspace);
    }

    pub fn set_primary(&self, alias: Option<NodeAlias>) {
        *self.primary.lock().unwrap() = alias;
    }

    pub fn add_node(&self, record: NodeRecord) {
        self.nodes
            .lock()
            .unwrap()
            .insert(record.alias.clone(), record);
    }
}

#[async_trait]
impl TopologyService for FakeTopology {
    async fn get_keyspace(&self, keyspace: &str) -> TopologyResult<KeyspaceDescriptor> {
        self.keyspaces
            .lock()
            .unwrap()
            .get(keyspace)
            .cloned()
            .ok_or_else(|| TopologyError::NotFound(keyspace.to_string()))
    }

    async fn get_shard(&self, keyspace: &str, shard: &str) -> TopologyResult<ShardRecord> {
        Ok(ShardRecord {
            keyspace: keyspace.to_string(),
            shard: shard.to_string(),
            primary_alias: self.primary.lock().unwrap().clone(),
        })
    }

    async fn get_node(&self, alias: &NodeAlias) -> TopologyResult<NodeRecord> {
        self.nodes
            .lock()
            .unwrap()
            .get(alias)
            .cloned()
            .ok_or_else(|| TopologyError::NotFound(alias.to_string()))
    }
}

/// Answers primary position queries with a fixed result.
pub struct FakeRemote {
    pub answer: Mutex<TopologyResult<String>>,
    pub hang: bool,
}

impl FakeRemote {
    pub fn answering(position: &Position) -> Self {
        Self {
            answer: Mutex::new(Ok(position.encode())),
            hang: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            answer: Mutex::new(Err(TopologyError::Remote("connection refused".to_string()))),
            hang: false,
        }
    }

    pub fn hanging() -> Self {
        Self {
            answer: Mutex::new(Ok(String::new())),
            hang: true,
        }
    }
}

#[async_trait]
impl RemoteNodeClient for FakeRemote {
    async fn primary_position(&self, _node: &NodeRecord) -> TopologyResult<String> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.answer.lock().unwrap().clone()
    }
}

// =============================================================================
// Storage engine
// =============================================================================

/// Engine call as recorded by [`FakeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Commands(Vec<EngineCommand>),
    SetPosition(Position),
    SetSource { host: String, port: u16, start: bool },
    SemiSync { primary: bool, replica: bool },
}

#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    applied: Mutex<Position>,
    running: Mutex<bool>,
    /// Applied position once bounded replay starts
    pub pitr_reaches: Mutex<Option<Position>>,
    /// Applied position once replication from the primary starts
    pub primary_reaches: Mutex<Option<Position>>,
    /// Both replication threads stop right after connecting to the primary
    pub primary_breaks: Mutex<bool>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Commands(commands) => Some(commands),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn applied(&self) -> Position {
        self.applied.lock().unwrap().clone()
    }

    pub fn source_set(&self) -> bool {
        self.calls()
            .iter()
            .any(|call| matches!(call, EngineCall::SetSource { .. }))
    }

    pub fn positions_set(&self) -> Vec<Position> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::SetPosition(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl StorageEngine for FakeEngine {
    async fn execute_commands(&self, commands: &[EngineCommand]) -> EngineResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Commands(commands.to_vec()));
        for command in commands {
            match command {
                EngineCommand::StartReplicationUntilBefore { .. } => {
                    *self.running.lock().unwrap() = true;
                    if let Some(p) = self.pitr_reaches.lock().unwrap().clone() {
                        *self.applied.lock().unwrap() = p;
                    }
                }
                EngineCommand::StopReplication | EngineCommand::StopReplicationForChannel => {
                    *self.running.lock().unwrap() = false;
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn replication_status(&self) -> EngineResult<ReplicationStatus> {
        let running = *self.running.lock().unwrap();
        Ok(ReplicationStatus {
            position: self.applied(),
            fetch_thread_running: running,
            apply_thread_running: running,
            source_host: None,
            source_port: 0,
        })
    }

    async fn current_position(&self) -> EngineResult<Position> {
        Ok(self.applied())
    }

    async fn set_replication_position(&self, position: &Position) -> EngineResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::SetPosition(position.clone()));
        *self.applied.lock().unwrap() = position.clone();
        Ok(())
    }

    async fn set_replication_source(
        &self,
        host: &str,
        port: u16,
        options: SourceOptions,
    ) -> EngineResult<()> {
        self.calls.lock().unwrap().push(EngineCall::SetSource {
            host: host.to_string(),
            port,
            start: options.start_after,
        });
        if options.start_after {
            *self.running.lock().unwrap() = !*self.primary_breaks.lock().unwrap();
            if let Some(p) = self.primary_reaches.lock().unwrap().clone() {
                *self.applied.lock().unwrap() = p;
            }
        }
        Ok(())
    }

    async fn set_semi_sync(&self, primary: bool, replica: bool) -> EngineResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::SemiSync { primary, replica });
        Ok(())
    }
}

// =============================================================================
// Change stream
// =============================================================================

#[derive(Default)]
pub struct FakeStreamClient {
    pub batches: Mutex<Vec<Vec<ChangeEvent>>>,
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    /// Keep the stream open without events once the batches run out
    pub hang: bool,
}

impl FakeStreamClient {
    pub fn with_batches(batches: Vec<Vec<ChangeEvent>>) -> Self {
        Self {
            batches: Mutex::new(batches),
            ..Default::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct FakeStream {
    batches: VecDeque<Vec<ChangeEvent>>,
    closed: Arc<AtomicUsize>,
    hang: bool,
}

#[async_trait]
impl ChangeStreamClient for FakeStreamClient {
    async fn open(
        &self,
        _source: &StreamSource,
        _start: &Position,
        _filter: &EventFilter,
    ) -> StreamResult<Box<dyn ChangeStream>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            batches: self.batches.lock().unwrap().clone().into(),
            closed: self.closed.clone(),
            hang: self.hang,
        }))
    }
}

#[async_trait]
impl ChangeStream for FakeStream {
    async fn next_batch(&mut self) -> StreamResult<Option<Vec<ChangeEvent>>> {
        let batch = self.batches.pop_front();
        if batch.is_none() && self.hang {
            std::future::pending::<()>().await;
        }
        Ok(batch)
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// State publication
// =============================================================================

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(NodeRole, String)>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(NodeRole, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatePublisher for RecordingPublisher {
    async fn publish(&self, record: &NodeRecord, reason: &str) -> NodeResult<()> {
        self.published
            .lock()
            .unwrap()
            .push((record.role, reason.to_string()));
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A node in `commerce/0` with a healthy primary and a backup at `pos(10)`.
pub struct Harness {
    pub node: Arc<NodeHandle>,
    pub publisher: Arc<RecordingPublisher>,
    pub backup: Arc<FakeBackup>,
    pub topology: Arc<FakeTopology>,
    pub remote: Arc<FakeRemote>,
    pub engine: Arc<FakeEngine>,
    pub stream: Arc<FakeStreamClient>,
    pub config: RestoreConfig,
    engine_config: NamedTempFile,
}

impl Harness {
    pub fn new(role: NodeRole) -> Self {
        Self::for_keyspace(role, KEYSPACE)
    }

    pub fn for_keyspace(role: NodeRole, keyspace: &str) -> Self {
        let engine_config = NamedTempFile::new().unwrap();
        let config = RestoreConfig {
            restore_from_backup: true,
            engine_config: Some(engine_config.path().to_path_buf()),
            binlog_timeout: Duration::from_secs(2),
            remote_operation_timeout: Duration::from_millis(200),
            catchup_poll_interval: Duration::from_millis(5),
            replication_poll_interval: Duration::from_millis(5),
            ..RestoreConfig::default()
        };

        let publisher = Arc::new(RecordingPublisher::default());
        let node = Arc::new(NodeHandle::new(
            node_record(self_alias(), "db-100", keyspace, role),
            publisher.clone(),
        ));

        let topology = Arc::new(FakeTopology::default());
        topology.add_keyspace(KeyspaceDescriptor::normal(KEYSPACE));
        topology.set_primary(Some(primary_alias()));
        topology.add_node(node_record(
            primary_alias(),
            "db-primary",
            KEYSPACE,
            NodeRole::Primary,
        ));

        Self {
            node,
            publisher,
            backup: Arc::new(FakeBackup::new(vec![Ok(manifest(pos(10)))])),
            topology,
            remote: Arc::new(FakeRemote::answering(&pos(10))),
            engine: Arc::new(FakeEngine::default()),
            stream: Arc::new(FakeStreamClient::default()),
            config,
            engine_config,
        }
    }

    pub fn with_backup(mut self, outcomes: Vec<BackupResult<BackupManifest>>) -> Self {
        self.backup = Arc::new(FakeBackup::new(outcomes));
        self
    }

    pub fn with_remote(mut self, remote: FakeRemote) -> Self {
        self.remote = Arc::new(remote);
        self
    }

    pub fn with_stream(mut self, stream: FakeStreamClient) -> Self {
        self.stream = Arc::new(stream);
        self
    }

    /// Configure a complete PITR source.
    pub fn with_pitr_source(mut self) -> Self {
        self.config.binlog_host = Some("binlog-1".to_string());
        self.config.binlog_port = Some(3306);
        self.config.binlog_user = Some("repl".to_string());
        self.config.binlog_password = Some("secret".to_string());
        self
    }

    pub fn orchestrator(&self) -> RestoreOrchestrator {
        RestoreOrchestrator::new(
            self.config.clone(),
            self.node.clone(),
            RestoreDeps {
                backup: self.backup.clone(),
                topology: self.topology.clone(),
                remote: self.remote.clone(),
                engine: self.engine.clone(),
                change_stream: self.stream.clone(),
            },
        )
    }

    pub fn roles_published(&self) -> Vec<NodeRole> {
        self.publisher
            .published()
            .into_iter()
            .map(|(role, _)| role)
            .collect()
    }
}

pub fn no_backup() -> BackupResult<BackupManifest> {
    Err(BackupError::NoBackup)
}
