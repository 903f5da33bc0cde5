//! Position parsing errors

use thiserror::Error;

/// Result type for position operations
pub type PositionResult<T> = Result<T, PositionError>;

/// Errors raised while decoding a replication position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Encoded position has no `<flavor>/` prefix
    #[error("position {0:?} has no flavor prefix")]
    MissingFlavor(String),

    /// Flavor prefix is not one we understand
    #[error("unknown position flavor: {0}")]
    UnknownFlavor(String),

    /// Source server id is not a UUID
    #[error("invalid server id in GTID set: {0:?}")]
    InvalidSid(String),

    /// Interval is malformed or empty
    #[error("invalid GTID interval: {0:?}")]
    InvalidInterval(String),
}
