//! Replication positions
//!
//! A position is the set of transactions a node has applied. It is opaque
//! to the restore flow except for three operations:
//! - equality (has anything changed?)
//! - `at_least` (has the node caught up to a target?)
//! - a lossless textual encoding (`<flavor>/<gtid set>`)
//!
//! The zero position encodes as the empty string.

mod errors;
mod gtid;

pub use errors::{PositionError, PositionResult};
pub use gtid::{Gtid, GtidSet, Interval};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Flavor tag written in front of encoded GTID sets.
pub const MYSQL56_FLAVOR: &str = "MySQL56";

/// A replication position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    gtid_set: GtidSet,
}

impl Position {
    /// The empty position.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_gtid_set(gtid_set: GtidSet) -> Self {
        Self { gtid_set }
    }

    pub fn gtid_set(&self) -> &GtidSet {
        &self.gtid_set
    }

    pub fn is_zero(&self) -> bool {
        self.gtid_set.is_empty()
    }

    /// True when this position includes every transaction in `other`.
    pub fn at_least(&self, other: &Position) -> bool {
        self.gtid_set.contains(&other.gtid_set)
    }

    /// Encode as `<flavor>/<gtid set>`, or `""` for the zero position.
    pub fn encode(&self) -> String {
        if self.is_zero() {
            String::new()
        } else {
            format!("{}/{}", MYSQL56_FLAVOR, self.gtid_set)
        }
    }

    /// Decode a position produced by [`Position::encode`].
    pub fn decode(s: &str) -> PositionResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::zero());
        }
        let (flavor, body) = s
            .split_once('/')
            .ok_or_else(|| PositionError::MissingFlavor(s.to_string()))?;
        if flavor != MYSQL56_FLAVOR {
            return Err(PositionError::UnknownFlavor(flavor.to_string()));
        }
        Ok(Self {
            gtid_set: body.parse()?,
        })
    }

    /// Last GTID in the set, as used for bounded replay.
    pub fn last_gtid(&self) -> Option<Gtid> {
        self.gtid_set.last()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> PositionResult<Self> {
        Self::decode(s)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Position::decode(&s).map_err(serde::de::Error::custom)
    }
}
