//! Backup restore errors
//!
//! Three outcomes are distinguished because the restore flow reacts to
//! each differently:
//! - no backup exists
//! - backups exist but none is complete
//! - a database already exists locally
//!
//! Everything else is fatal to the restore.

use thiserror::Error;

/// Result type for backup operations
pub type BackupResult<T> = Result<T, BackupError>;

/// Errors returned by the backup restore collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackupError {
    /// Backup storage holds no backup for the shard
    #[error("no backup found")]
    NoBackup,

    /// Backups exist but none finished
    #[error("backup(s) found but none are complete")]
    NoCompleteBackup,

    /// Local data directory already holds a database
    #[error("can't run restore: database already exists")]
    ExistingDatabase,

    /// Manifest could not be read or written
    #[error("backup manifest error: {0}")]
    Manifest(String),

    /// Backup storage or apply step failed
    #[error("backup restore failed: {0}")]
    Failed(String),
}

impl BackupError {
    /// Whether waiting and retrying may turn this into a success.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackupError::NoBackup | BackupError::NoCompleteBackup)
    }

    /// Whether the restore may proceed as a no-op after this error.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            BackupError::NoBackup | BackupError::NoCompleteBackup | BackupError::ExistingDatabase
        )
    }
}
