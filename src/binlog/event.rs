//! Change events and stream filters

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pattern matching every table.
pub const MATCH_ALL_TABLES: &str = "/.*";

/// One event from the change stream.
///
/// Only transaction boundaries carry a position; row and DDL events leave
/// it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Encoded position after this event, or empty
    #[serde(default)]
    pub position: String,
    /// Commit time on the source, unix seconds
    pub timestamp: i64,
}

impl ChangeEvent {
    pub fn new(position: impl Into<String>, timestamp: i64) -> Self {
        Self {
            position: position.into(),
            timestamp,
        }
    }

    /// Event without a position (row change, DDL, heartbeat).
    pub fn unpositioned(timestamp: i64) -> Self {
        Self::new("", timestamp)
    }

    pub fn has_position(&self) -> bool {
        !self.position.is_empty()
    }
}

/// Table match rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Table name, or a `/regex` pattern
    pub pattern: String,
}

/// Which tables the stream should deliver events for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub rules: Vec<FilterRule>,
}

impl EventFilter {
    pub fn match_all() -> Self {
        Self {
            rules: vec![FilterRule {
                pattern: MATCH_ALL_TABLES.to_string(),
            }],
        }
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

/// Connection parameters of the change-event source used for PITR.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSource")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}
