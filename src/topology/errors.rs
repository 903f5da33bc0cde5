//! Topology service errors

use thiserror::Error;

/// Result type for topology lookups
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors returned by the topology service and remote node calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Record does not exist
    #[error("topology record not found: {0}")]
    NotFound(String),

    /// Topology server could not be reached
    #[error("topology service unavailable: {0}")]
    Unavailable(String),

    /// RPC to another node failed
    #[error("remote call failed: {0}")]
    Remote(String),

    /// Call did not finish within its deadline
    #[error("remote call timed out after {0:?}")]
    Timeout(std::time::Duration),
}
