//! Restore lifecycle events
//!
//! Every decision the restore flow makes is logged as one of these.

use std::fmt;

use super::logger::Severity;

/// Observable events during restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Orchestration
    /// Restore from backup not enabled at startup
    RestoreNotRequested,
    RestoreBegin,
    RestoreComplete,
    /// Restore failed (FATAL)
    RestoreFailed,
    RoleChanged,
    SnapshotBaseKeyspace,

    // Backup
    BackupRestored,
    /// No backup yet, sleeping before the next attempt
    BackupWait,
    BackupNotFound,
    BackupExistingDatabase,

    // Point-in-time recovery
    PitrBegin,
    PitrSkipped,
    PitrTargetResolved,
    PitrCatchUpBegin,
    PitrComplete,
    PitrFailed,

    // Reattachment
    ReattachBegin,
    /// Backup restored but reattachment not attempted
    ReattachSkipped,
    ReattachNoPrimary,
    ReattachSelfPrimary,
    ReattachPrimaryUnreachable,
    ReattachWaitReplication,
    ReattachComplete,
}

impl Event {
    pub const ALL: [Event; 24] = [
        Event::ConfigLoaded,
        Event::RestoreNotRequested,
        Event::RestoreBegin,
        Event::RestoreComplete,
        Event::RestoreFailed,
        Event::RoleChanged,
        Event::SnapshotBaseKeyspace,
        Event::BackupRestored,
        Event::BackupWait,
        Event::BackupNotFound,
        Event::BackupExistingDatabase,
        Event::PitrBegin,
        Event::PitrSkipped,
        Event::PitrTargetResolved,
        Event::PitrCatchUpBegin,
        Event::PitrComplete,
        Event::PitrFailed,
        Event::ReattachBegin,
        Event::ReattachSkipped,
        Event::ReattachNoPrimary,
        Event::ReattachSelfPrimary,
        Event::ReattachPrimaryUnreachable,
        Event::ReattachWaitReplication,
        Event::ReattachComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RestoreNotRequested => "RESTORE_NOT_REQUESTED",
            Event::RestoreBegin => "RESTORE_BEGIN",
            Event::RestoreComplete => "RESTORE_COMPLETE",
            Event::RestoreFailed => "RESTORE_FAILED",
            Event::RoleChanged => "NODE_ROLE_CHANGED",
            Event::SnapshotBaseKeyspace => "SNAPSHOT_BASE_KEYSPACE",
            Event::BackupRestored => "BACKUP_RESTORED",
            Event::BackupWait => "BACKUP_WAIT",
            Event::BackupNotFound => "BACKUP_NOT_FOUND",
            Event::BackupExistingDatabase => "BACKUP_EXISTING_DATABASE",
            Event::PitrBegin => "PITR_BEGIN",
            Event::PitrSkipped => "PITR_SKIPPED",
            Event::PitrTargetResolved => "PITR_TARGET_RESOLVED",
            Event::PitrCatchUpBegin => "PITR_CATCHUP_BEGIN",
            Event::PitrComplete => "PITR_COMPLETE",
            Event::PitrFailed => "PITR_FAILED",
            Event::ReattachBegin => "REATTACH_BEGIN",
            Event::ReattachSkipped => "REATTACH_SKIPPED",
            Event::ReattachNoPrimary => "REATTACH_NO_PRIMARY",
            Event::ReattachSelfPrimary => "REATTACH_SELF_PRIMARY",
            Event::ReattachPrimaryUnreachable => "REATTACH_PRIMARY_UNREACHABLE",
            Event::ReattachWaitReplication => "REATTACH_WAIT_REPLICATION",
            Event::ReattachComplete => "REATTACH_COMPLETE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::RestoreFailed)
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::RestoreFailed => Severity::Fatal,
            Event::PitrFailed => Severity::Error,
            Event::PitrSkipped
            | Event::ReattachSkipped
            | Event::ReattachNoPrimary
            | Event::ReattachSelfPrimary
            | Event::ReattachPrimaryUnreachable => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
