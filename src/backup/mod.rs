//! Backup restore seam
//!
//! Physically fetching and applying backup artifacts is done by an
//! external backup engine. This module defines what the restore flow
//! hands it ([`RestoreRequest`]), what comes back ([`BackupManifest`]),
//! and the error conditions the flow distinguishes ([`BackupError`]).

mod errors;
mod manifest;
mod request;
mod restorer;

pub use errors::{BackupError, BackupResult};
pub use manifest::{BackupManifest, MANIFEST_FORMAT_VERSION};
pub use request::RestoreRequest;
pub use restorer::BackupRestorer;
