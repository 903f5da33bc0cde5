//! Change stream errors

use thiserror::Error;

/// Result type for change stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors raised by the change-event stream client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Could not connect to the event source
    #[error("cannot connect to {host}:{port}: {message}")]
    Connect {
        host: String,
        port: u16,
        message: String,
    },

    /// Stream broke after it was opened
    #[error("change stream failed: {0}")]
    Stream(String),
}
