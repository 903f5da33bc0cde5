//! Storage engine
//!
//! The restore flow drives the local engine through a narrow surface:
//! typed replication commands, status reads, and explicit position and
//! source changes. The driver that executes them is external.

mod command;
mod driver;
mod errors;

pub use command::{reset_replication_commands, EngineCommand};
pub use driver::{ReplicationStatus, SourceOptions, StorageEngine};
pub use errors::{EngineError, EngineResult};
