//! Restore error types
//!
//! Restore errors follow the crate's structured error model:
//! - Structured error codes in RESTORE_NAME format
//! - Clear severity levels
//! - No silent failures
//!
//! PITR errors are the only non-fatal codes. They are consumed by the
//! orchestrator as a soft stop and never returned to the caller.

use std::error::Error as StdError;
use std::fmt;

use crate::backup::BackupError;
use crate::engine::EngineError;
use crate::node::NodeError;
use crate::position::PositionError;
use crate::topology::TopologyError;

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged, the restore carries on
    Error,
    /// Node startup must not continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Restore error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreErrorCode {
    /// Another administrative action holds the node lock
    LockUnavailable,
    /// Storage engine config file not configured or missing
    MissingEngineConfig,
    /// Snapshot keyspace without a base keyspace
    InvalidKeyspace,
    /// Topology lookup failed
    Topology,
    /// Backup restore failed with a non-benign error
    BackupFailed,
    /// Caller cancelled the restore
    Cancelled,
    /// Timestamp-to-position lookup failed
    PitrLookup,
    /// Bounded catch-up failed or timed out
    PitrCatchUp,
    /// Reattaching to the primary failed
    Reattach,
    /// Storage engine command failed
    Engine,
    /// Position could not be decoded
    Position,
    /// Advertised role could not be published
    StatePublish,
}

impl RestoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreErrorCode::LockUnavailable => "RESTORE_LOCK_UNAVAILABLE",
            RestoreErrorCode::MissingEngineConfig => "RESTORE_MISSING_ENGINE_CONFIG",
            RestoreErrorCode::InvalidKeyspace => "RESTORE_INVALID_KEYSPACE",
            RestoreErrorCode::Topology => "RESTORE_TOPOLOGY",
            RestoreErrorCode::BackupFailed => "RESTORE_BACKUP_FAILED",
            RestoreErrorCode::Cancelled => "RESTORE_CANCELLED",
            RestoreErrorCode::PitrLookup => "RESTORE_PITR_LOOKUP",
            RestoreErrorCode::PitrCatchUp => "RESTORE_PITR_CATCHUP",
            RestoreErrorCode::Reattach => "RESTORE_REATTACH",
            RestoreErrorCode::Engine => "RESTORE_ENGINE",
            RestoreErrorCode::Position => "RESTORE_POSITION",
            RestoreErrorCode::StatePublish => "RESTORE_STATE_PUBLISH",
        }
    }

    /// Whether the code ends the restore.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RestoreErrorCode::PitrLookup | RestoreErrorCode::PitrCatchUp
        )
    }

    pub fn severity(&self) -> Severity {
        if self.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        }
    }
}

impl fmt::Display for RestoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Restore error with full context
#[derive(Debug)]
pub struct RestoreError {
    code: RestoreErrorCode,
    message: String,
    source: Option<BoxedSource>,
}

impl RestoreError {
    pub fn new(code: RestoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: RestoreErrorCode,
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn lock_unavailable() -> Self {
        Self::new(
            RestoreErrorCode::LockUnavailable,
            "another action is already running on this node",
        )
    }

    pub fn missing_engine_config(message: impl Into<String>) -> Self {
        Self::new(RestoreErrorCode::MissingEngineConfig, message)
    }

    pub fn invalid_keyspace(keyspace: &str) -> Self {
        Self::new(
            RestoreErrorCode::InvalidKeyspace,
            format!("snapshot keyspace {} has no base keyspace", keyspace),
        )
    }

    pub fn cancelled(during: &str) -> Self {
        Self::new(
            RestoreErrorCode::Cancelled,
            format!("restore cancelled during {}", during),
        )
    }

    pub fn topology(message: impl Into<String>, source: TopologyError) -> Self {
        Self::with_source(RestoreErrorCode::Topology, message, source)
    }

    pub fn backup_failed(source: BackupError) -> Self {
        Self::with_source(
            RestoreErrorCode::BackupFailed,
            "can't restore backup",
            source,
        )
    }

    pub fn pitr_lookup(message: impl Into<String>) -> Self {
        Self::new(RestoreErrorCode::PitrLookup, message)
    }

    pub fn pitr_catch_up(message: impl Into<String>) -> Self {
        Self::new(RestoreErrorCode::PitrCatchUp, message)
    }

    pub fn reattach(message: impl Into<String>) -> Self {
        Self::new(RestoreErrorCode::Reattach, message)
    }

    pub fn engine(message: impl Into<String>, source: EngineError) -> Self {
        Self::with_source(RestoreErrorCode::Engine, message, source)
    }

    pub fn position(message: impl Into<String>, source: PositionError) -> Self {
        Self::with_source(RestoreErrorCode::Position, message, source)
    }

    pub fn state_publish(source: NodeError) -> Self {
        Self::with_source(
            RestoreErrorCode::StatePublish,
            "can't publish node state",
            source,
        )
    }

    /// Re-tag an error raised inside a phase with the phase's own code.
    pub fn in_phase(self, code: RestoreErrorCode) -> Self {
        if self.code == RestoreErrorCode::Cancelled {
            return self;
        }
        Self { code, ..self }
    }

    pub fn code(&self) -> RestoreErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl StdError for RestoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for restore operations
pub type RestoreResult<T> = Result<T, RestoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(
            RestoreErrorCode::LockUnavailable.as_str(),
            "RESTORE_LOCK_UNAVAILABLE"
        );
        assert_eq!(
            RestoreErrorCode::InvalidKeyspace.as_str(),
            "RESTORE_INVALID_KEYSPACE"
        );
        assert_eq!(RestoreErrorCode::PitrCatchUp.as_str(), "RESTORE_PITR_CATCHUP");
    }

    #[test]
    fn test_only_pitr_errors_are_non_fatal() {
        assert!(!RestoreError::pitr_lookup("timeout").is_fatal());
        assert!(!RestoreError::pitr_catch_up("timeout").is_fatal());
        assert!(RestoreError::lock_unavailable().is_fatal());
        assert!(RestoreError::backup_failed(BackupError::Failed("disk".into())).is_fatal());
        assert_eq!(RestoreError::reattach("x").severity(), Severity::Fatal);
        assert_eq!(RestoreError::pitr_lookup("x").severity(), Severity::Error);
    }

    #[test]
    fn test_display_includes_source() {
        let err = RestoreError::backup_failed(BackupError::Failed("disk full".into()));
        let display = err.to_string();
        assert!(display.contains("[FATAL]"));
        assert!(display.contains("RESTORE_BACKUP_FAILED"));
        assert!(display.contains("disk full"));
    }

    #[test]
    fn test_error_source_chain() {
        let err = RestoreError::engine(
            "can't stop replication",
            EngineError::Unavailable("down".into()),
        );
        assert!(StdError::source(&err).is_some());
        assert!(StdError::source(&RestoreError::lock_unavailable()).is_none());
    }

    #[test]
    fn test_in_phase_keeps_cancellation() {
        let err = RestoreError::cancelled("catch-up").in_phase(RestoreErrorCode::PitrCatchUp);
        assert_eq!(err.code(), RestoreErrorCode::Cancelled);
        let err = RestoreError::engine("x", EngineError::Unavailable("down".into()))
            .in_phase(RestoreErrorCode::PitrCatchUp);
        assert_eq!(err.code(), RestoreErrorCode::PitrCatchUp);
    }
}
