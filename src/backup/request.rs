//! Restore request handed to the backup collaborator

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Parameters for one backup restore attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    /// How many files to restore at once
    pub concurrency: usize,
    /// Key/value pairs stamped onto the restored instance
    pub local_metadata: BTreeMap<String, String>,
    /// Wipe any existing local data first
    pub delete_before_restore: bool,
    /// Name of the database to restore into
    pub db_name: String,
    /// Keyspace whose backups are searched (the base keyspace for snapshots)
    pub keyspace: String,
    pub shard: String,
    /// Only consider backups taken at or before this instant
    pub start_time: Option<DateTime<Utc>>,
}
