//! Timestamp to position resolution
//!
//! Scans a change stream from a starting position for the first
//! transaction committed at or after a target time. The scan runs as a
//! [`SingleResultTask`] bounded by the lookup timeout, and the stream is
//! closed on every exit path.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::errors::{RestoreError, RestoreResult};
use super::handoff::{SingleResultTask, TaskOutcome};
use crate::binlog::{ChangeStream, ChangeStreamClient, EventFilter, StreamSource};
use crate::position::Position;

/// Where point-in-time recovery should stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// First position committed at or after the target time
    pub target: Position,
    /// Last position committed before the target time, zero if none was seen
    pub preceding: Position,
}

pub struct GtidResolver {
    client: Arc<dyn ChangeStreamClient>,
    source: StreamSource,
    filter: EventFilter,
    timeout: Duration,
}

impl GtidResolver {
    pub fn new(
        client: Arc<dyn ChangeStreamClient>,
        source: StreamSource,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            source,
            filter: EventFilter::match_all(),
            timeout,
        }
    }

    /// Resolve `target_time` (unix seconds) to a position, scanning from
    /// `start`.
    pub async fn resolve(
        &self,
        cancel: &CancellationToken,
        start: &Position,
        target_time: i64,
    ) -> RestoreResult<ResolvedTarget> {
        let client = self.client.clone();
        let source = self.source.clone();
        let filter = self.filter.clone();
        let start = start.clone();

        let task = SingleResultTask::spawn(move |stop| async move {
            scan(client, source, filter, start, target_time, stop).await
        });

        match task.wait(cancel, self.timeout).await {
            TaskOutcome::Completed(Ok(Some(resolved))) => Ok(resolved),
            TaskOutcome::Completed(Ok(None)) => Err(RestoreError::pitr_lookup(format!(
                "change stream ended before reaching timestamp {}",
                target_time
            ))),
            TaskOutcome::Completed(Err(e)) => Err(e),
            TaskOutcome::Cancelled => Err(RestoreError::cancelled("position lookup")),
            TaskOutcome::TimedOut => Err(RestoreError::pitr_lookup(format!(
                "timed out after {:?} looking up position for timestamp {}",
                self.timeout, target_time
            ))),
            TaskOutcome::Abandoned => Err(RestoreError::pitr_lookup(
                "position lookup ended without a result",
            )),
        }
    }
}

async fn scan(
    client: Arc<dyn ChangeStreamClient>,
    source: StreamSource,
    filter: EventFilter,
    start: Position,
    target_time: i64,
    stop: CancellationToken,
) -> RestoreResult<Option<ResolvedTarget>> {
    let opened = tokio::select! {
        biased;
        _ = stop.cancelled() => return Ok(None),
        opened = client.open(&source, &start, &filter) => opened,
    };
    let mut stream = opened.map_err(|e| {
        RestoreError::pitr_lookup(format!("can't open change stream: {}", e))
    })?;

    let result = scan_stream(stream.as_mut(), target_time, &stop).await;
    stream.close().await;
    result
}

async fn scan_stream(
    stream: &mut dyn ChangeStream,
    target_time: i64,
    stop: &CancellationToken,
) -> RestoreResult<Option<ResolvedTarget>> {
    let mut preceding = Position::zero();
    loop {
        let batch = tokio::select! {
            biased;
            _ = stop.cancelled() => return Ok(None),
            batch = stream.next_batch() => batch,
        };
        let events = match batch {
            Ok(Some(events)) => events,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(RestoreError::pitr_lookup(format!(
                    "change stream failed: {}",
                    e
                )))
            }
        };

        for event in events.into_iter().filter(|e| e.has_position()) {
            let position = Position::decode(&event.position)
                .map_err(|e| RestoreError::position("bad position in change stream", e))?;
            if event.timestamp >= target_time {
                return Ok(Some(ResolvedTarget {
                    target: position,
                    preceding,
                }));
            }
            preceding = position;
        }
    }
}
