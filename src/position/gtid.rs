//! MySQL 5.6 style GTID sets
//!
//! A set maps each source server id to a list of closed sequence
//! intervals, e.g. `3e11fa47-71ca-11e1-9e33-c80aa9429562:1-5:11-18`.
//! Sets are kept normalized (sorted, merged) so that structural equality
//! is set equality.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::errors::{PositionError, PositionResult};

/// Closed interval of transaction sequence numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    /// Create an interval. `start` must not exceed `end`.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A single global transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gtid {
    pub server: Uuid,
    pub sequence: u64,
}

impl fmt::Display for Gtid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.server, self.sequence)
    }
}

/// Normalized set of GTIDs grouped by source server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GtidSet {
    sids: BTreeMap<Uuid, Vec<Interval>>,
}

impl GtidSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sids.is_empty()
    }

    /// Add an interval for a server, merging with what is already there.
    pub fn add(&mut self, server: Uuid, interval: Interval) {
        let intervals = self.sids.entry(server).or_default();
        intervals.push(interval);
        normalize(intervals);
    }

    /// Builder form of [`GtidSet::add`].
    pub fn with(mut self, server: Uuid, start: u64, end: u64) -> Self {
        self.add(server, Interval::new(start, end));
        self
    }

    /// True when every GTID in `other` is also in `self`.
    pub fn contains(&self, other: &GtidSet) -> bool {
        other.sids.iter().all(|(sid, wanted)| match self.sids.get(sid) {
            Some(have) => wanted
                .iter()
                .all(|w| have.iter().any(|h| h.covers(w))),
            None => false,
        })
    }

    /// Last transaction of the highest-ordered server in the set.
    pub fn last(&self) -> Option<Gtid> {
        let (server, intervals) = self.sids.iter().next_back()?;
        let last = intervals.last()?;
        Some(Gtid {
            server: *server,
            sequence: last.end,
        })
    }
}

fn normalize(intervals: &mut Vec<Interval>) {
    intervals.sort();
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals.drain(..) {
        match merged.last_mut() {
            // adjacent or overlapping
            Some(prev) if iv.start <= prev.end.saturating_add(1) => {
                prev.end = prev.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    *intervals = merged;
}

impl fmt::Display for GtidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (sid, intervals) in &self.sids {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{}", sid)?;
            for iv in intervals {
                write!(f, ":{}", iv)?;
            }
        }
        Ok(())
    }
}

impl FromStr for GtidSet {
    type Err = PositionError;

    fn from_str(s: &str) -> PositionResult<Self> {
        let mut set = GtidSet::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let mut pieces = part.split(':');
            let sid_str = pieces.next().unwrap_or_default();
            let server = Uuid::parse_str(sid_str)
                .map_err(|_| PositionError::InvalidSid(sid_str.to_string()))?;

            let mut saw_interval = false;
            for piece in pieces {
                set.add(server, parse_interval(piece)?);
                saw_interval = true;
            }
            if !saw_interval {
                return Err(PositionError::InvalidInterval(part.to_string()));
            }
        }
        Ok(set)
    }
}

fn parse_interval(s: &str) -> PositionResult<Interval> {
    let invalid = || PositionError::InvalidInterval(s.to_string());
    let (start, end) = match s.split_once('-') {
        Some((a, b)) => (
            a.parse::<u64>().map_err(|_| invalid())?,
            b.parse::<u64>().map_err(|_| invalid())?,
        ),
        None => {
            let n = s.parse::<u64>().map_err(|_| invalid())?;
            (n, n)
        }
    };
    if start == 0 || start > end {
        return Err(invalid());
    }
    Ok(Interval::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID_A: &str = "3e11fa47-71ca-11e1-9e33-c80aa9429562";
    const SID_B: &str = "8bc65c84-3fe4-11ed-a912-257f0fcdd6c9";

    fn sid(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let text = format!("{}:1-5:11-18,{}:7", SID_A, SID_B);
        let set: GtidSet = text.parse().unwrap();
        assert_eq!(set.to_string(), text);
    }

    #[test]
    fn test_adjacent_intervals_merge() {
        let set = GtidSet::new()
            .with(sid(SID_A), 1, 5)
            .with(sid(SID_A), 6, 9);
        assert_eq!(set.to_string(), format!("{}:1-9", SID_A));
    }

    #[test]
    fn test_contains() {
        let big = GtidSet::new().with(sid(SID_A), 1, 100);
        let small = GtidSet::new().with(sid(SID_A), 10, 20);
        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert!(big.contains(&GtidSet::new()));
    }

    #[test]
    fn test_contains_requires_every_server() {
        let a = GtidSet::new().with(sid(SID_A), 1, 100);
        let ab = GtidSet::new().with(sid(SID_A), 1, 5).with(sid(SID_B), 1, 1);
        assert!(!a.contains(&ab));
    }

    #[test]
    fn test_last_uses_highest_server() {
        let set = GtidSet::new()
            .with(sid(SID_A), 1, 100)
            .with(sid(SID_B), 1, 7);
        assert_eq!(set.last().unwrap().to_string(), format!("{}:7", SID_B));
        assert!(GtidSet::new().last().is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("not-a-uuid:1-2".parse::<GtidSet>().is_err());
        assert!(format!("{}:5-2", SID_A).parse::<GtidSet>().is_err());
        assert!(format!("{}:0", SID_A).parse::<GtidSet>().is_err());
        assert!(SID_A.parse::<GtidSet>().is_err());
    }
}
