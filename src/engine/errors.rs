//! Storage engine driver errors

use thiserror::Error;

/// Result type for storage engine calls
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the storage engine driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Administrative statement was rejected
    #[error("command failed: {command}: {message}")]
    CommandFailed { command: String, message: String },

    /// Replication status could not be read
    #[error("replication status unavailable: {0}")]
    StatusUnavailable(String),

    /// Engine returned a position we could not decode
    #[error("engine reported invalid position: {0}")]
    InvalidPosition(String),

    /// Engine is not running or not reachable
    #[error("storage engine unavailable: {0}")]
    Unavailable(String),
}
