//! Bounded catch-up to a resolved position
//!
//! Points replication at the PITR source and replays everything strictly
//! before the target transaction. The engine's own "wait for position"
//! call blocks forever while the apply thread is held by the UNTIL bound,
//! so completion is detected by polling the applied position instead.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::errors::{RestoreError, RestoreErrorCode, RestoreResult};
use super::handoff::{SingleResultTask, TaskOutcome};
use crate::binlog::StreamSource;
use crate::engine::{reset_replication_commands, EngineCommand, StorageEngine};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::position::Position;

pub struct CatchUpDriver {
    engine: Arc<dyn StorageEngine>,
    source: StreamSource,
    timeout: Duration,
    poll_interval: Duration,
}

impl CatchUpDriver {
    pub fn new(
        engine: Arc<dyn StorageEngine>,
        source: StreamSource,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            engine,
            source,
            timeout,
            poll_interval,
        }
    }

    /// Replay up to, but not including, `target`, then detach from the
    /// PITR source.
    ///
    /// Returns the applied position once it covers `preceding`. On timeout
    /// replication is stopped but not reset. On cancellation nothing more
    /// is sent to the engine.
    pub async fn catch_up_to(
        &self,
        cancel: &CancellationToken,
        target: &Position,
        preceding: &Position,
    ) -> RestoreResult<Position> {
        let boundary = target.last_gtid().ok_or_else(|| {
            RestoreError::pitr_catch_up("target position is empty, nothing to replay up to")
        })?;

        let commands = vec![
            EngineCommand::StopReplicationForChannel,
            EngineCommand::StopFetchThreadForChannel,
            EngineCommand::ChangeSource {
                host: self.source.host.clone(),
                port: self.source.port,
                user: self.source.user.clone(),
                password: self.source.password.clone(),
                auto_position: true,
            },
            EngineCommand::StartReplicationUntilBefore {
                gtid: boundary.to_string(),
            },
        ];
        let source = format!("{}:{}", self.source.host, self.source.port);
        let until_before = boundary.to_string();
        let preceding_encoded = preceding.encode();
        log_event_with_fields(
            Event::PitrCatchUpBegin,
            &[
                ("source", source.as_str()),
                ("until_before", until_before.as_str()),
                ("preceding", preceding_encoded.as_str()),
            ],
        );
        self.engine
            .execute_commands(&commands)
            .await
            .map_err(|e| {
                RestoreError::engine("can't start bounded replication", e)
                    .in_phase(RestoreErrorCode::PitrCatchUp)
            })?;

        let engine = self.engine.clone();
        let wanted = preceding.clone();
        let interval = self.poll_interval;
        let task = SingleResultTask::spawn(move |stop| async move {
            poll_until_reached(engine, wanted, interval, stop).await
        });

        match task.wait(cancel, self.timeout).await {
            TaskOutcome::Completed(Ok(reached)) => {
                self.engine
                    .execute_commands(&reset_replication_commands())
                    .await
                    .map_err(|e| {
                        RestoreError::engine("can't reset replication after catch-up", e)
                            .in_phase(RestoreErrorCode::PitrCatchUp)
                    })?;
                Ok(reached)
            }
            TaskOutcome::Completed(Err(e)) => Err(e.in_phase(RestoreErrorCode::PitrCatchUp)),
            TaskOutcome::Cancelled => Err(RestoreError::cancelled("catch-up")),
            TaskOutcome::TimedOut => {
                if let Err(e) = self
                    .engine
                    .execute_commands(&[EngineCommand::StopReplication])
                    .await
                {
                    let error = e.to_string();
                    Logger::warn("PITR_CATCHUP_STOP_FAILED", &[("error", error.as_str())]);
                }
                Err(RestoreError::pitr_catch_up(format!(
                    "timed out after {:?} waiting for position {}",
                    self.timeout, preceding
                )))
            }
            TaskOutcome::Abandoned => Err(RestoreError::pitr_catch_up(
                "catch-up poll ended without a result",
            )),
        }
    }
}

async fn poll_until_reached(
    engine: Arc<dyn StorageEngine>,
    wanted: Position,
    interval: Duration,
    stop: CancellationToken,
) -> RestoreResult<Position> {
    loop {
        let current = engine
            .current_position()
            .await
            .map_err(|e| RestoreError::engine("can't read local position", e))?;
        if current.at_least(&wanted) {
            return Ok(current);
        }
        let (current, wanted_encoded) = (current.encode(), wanted.encode());
        Logger::trace(
            "PITR_CATCHUP_POLL",
            &[("current", current.as_str()), ("wanted", wanted_encoded.as_str())],
        );
        tokio::select! {
            _ = stop.cancelled() => return Err(RestoreError::cancelled("catch-up")),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
