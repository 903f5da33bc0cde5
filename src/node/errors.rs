//! Node handle errors

use thiserror::Error;

/// Result type for node handle operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Errors raised by the node handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// Another administrative action holds the lock
    #[error("action lock is held by another operation")]
    LockUnavailable,

    /// Advertised state could not be published
    #[error("failed to publish node state: {0}")]
    Publish(String),
}
