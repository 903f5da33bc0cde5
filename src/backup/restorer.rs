//! Backup restore collaborator trait

use async_trait::async_trait;

use super::errors::BackupResult;
use super::manifest::BackupManifest;
use super::request::RestoreRequest;

/// Finds the most recent usable backup and applies it locally.
#[async_trait]
pub trait BackupRestorer: Send + Sync {
    /// Restore a backup, returning the manifest of what was restored.
    ///
    /// Returns [`BackupError::NoBackup`](super::BackupError::NoBackup),
    /// [`BackupError::NoCompleteBackup`](super::BackupError::NoCompleteBackup)
    /// or [`BackupError::ExistingDatabase`](super::BackupError::ExistingDatabase)
    /// for the conditions the caller can recover from.
    async fn restore(&self, request: &RestoreRequest) -> BackupResult<BackupManifest>;
}
