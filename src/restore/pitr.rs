//! Point-in-time recovery sub-flow
//!
//! Resolve the snapshot time to a position, then replay up to it. The
//! result is an explicit [`PitrOutcome`]. Lookup and catch-up failures are
//! soft stops; only caller cancellation escapes as an error.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::catchup::CatchUpDriver;
use super::errors::{RestoreError, RestoreErrorCode, RestoreResult};
use super::resolver::GtidResolver;
use crate::binlog::ChangeStreamClient;
use crate::config::RestoreConfig;
use crate::engine::StorageEngine;
use crate::observability::{log_event_with_fields, Event};
use crate::position::Position;
use crate::topology::KeyspaceDescriptor;

/// What point-in-time recovery did.
#[derive(Debug)]
pub enum PitrOutcome {
    /// The keyspace carries no snapshot time
    NotRequested,
    /// Snapshot time set but no change-event source configured
    Skipped,
    /// Replayed up to the snapshot time; `position` is what the engine
    /// reported once caught up
    CaughtUp { position: Position },
    /// Lookup or catch-up failed; the restore stops short of reattaching
    Failed(RestoreError),
}

impl PitrOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PitrOutcome::Failed(_))
    }
}

pub(crate) async fn run_pitr(
    config: &RestoreConfig,
    engine: &Arc<dyn StorageEngine>,
    change_stream: &Arc<dyn ChangeStreamClient>,
    cancel: &CancellationToken,
    keyspace: &KeyspaceDescriptor,
    start: &Position,
) -> RestoreResult<PitrOutcome> {
    let Some(snapshot_time) = keyspace.snapshot_time else {
        return Ok(PitrOutcome::NotRequested);
    };
    let snapshot = snapshot_time.to_rfc3339();

    let Some(source) = config.pitr_source() else {
        log_event_with_fields(
            Event::PitrSkipped,
            &[
                ("reason", "binlog source not configured"),
                ("snapshot_time", snapshot.as_str()),
            ],
        );
        return Ok(PitrOutcome::Skipped);
    };

    let start_encoded = start.encode();
    log_event_with_fields(
        Event::PitrBegin,
        &[
            ("snapshot_time", snapshot.as_str()),
            ("start", start_encoded.as_str()),
        ],
    );

    let resolver = GtidResolver::new(
        change_stream.clone(),
        source.clone(),
        config.binlog_timeout,
    );
    let resolved = match resolver
        .resolve(cancel, start, snapshot_time.timestamp())
        .await
    {
        Ok(resolved) => resolved,
        Err(e) => return soft_stop(e.in_phase(RestoreErrorCode::PitrLookup)),
    };
    let (target, preceding) = (resolved.target.encode(), resolved.preceding.encode());
    log_event_with_fields(
        Event::PitrTargetResolved,
        &[("target", target.as_str()), ("preceding", preceding.as_str())],
    );

    let driver = CatchUpDriver::new(
        engine.clone(),
        source,
        config.binlog_timeout,
        config.catchup_poll_interval,
    );
    match driver
        .catch_up_to(cancel, &resolved.target, &resolved.preceding)
        .await
    {
        Ok(position) => {
            let reached = position.encode();
            log_event_with_fields(Event::PitrComplete, &[("position", reached.as_str())]);
            Ok(PitrOutcome::CaughtUp { position })
        }
        Err(e) => soft_stop(e.in_phase(RestoreErrorCode::PitrCatchUp)),
    }
}

/// Caller cancellation stays fatal; everything else is a soft stop.
fn soft_stop(err: RestoreError) -> RestoreResult<PitrOutcome> {
    if err.code() == RestoreErrorCode::Cancelled {
        return Err(err);
    }
    Ok(PitrOutcome::Failed(err))
}
