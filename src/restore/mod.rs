//! Restore subsystem
//!
//! Brings an empty node back into its cluster: restore the latest backup,
//! optionally roll forward to a point in time using a change stream, then
//! reattach to the shard primary.
//!
//! # Flow
//!
//! 1. Take the node action lock, check the engine config file exists
//! 2. Advertise RESTORE
//! 3. Resolve the keyspace to restore from (base keyspace for snapshots)
//! 4. Restore the backup, retrying while none exists if a wait interval is set
//! 5. If the keyspace has a snapshot time: resolve it to a position and
//!    replay up to it
//! 6. Reattach to the primary (normal keyspaces, backup restored, PITR
//!    did not fail)
//! 7. Advertise the original role, or the fallback role for BACKUP/RESTORE
//!
//! Errors after step 2 put the original role back before returning.
//! PITR failures are logged and stop the flow short of reattaching but
//! are not returned.

mod catchup;
mod errors;
mod handoff;
mod orchestrator;
mod pitr;
mod reattach;
mod resolver;

pub use catchup::CatchUpDriver;
pub use errors::{RestoreError, RestoreErrorCode, RestoreResult, Severity};
pub use handoff::{SingleResultTask, TaskOutcome};
pub use orchestrator::{
    local_metadata, RestoreDeps, RestoreOrchestrator, REASON_AFTER, REASON_FAILED, REASON_RESTORE,
};
pub use pitr::PitrOutcome;
pub use reattach::{ReattachManager, ReattachSettings};
pub use resolver::{GtidResolver, ResolvedTarget};
