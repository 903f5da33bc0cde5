//! Change-event streaming
//!
//! Point-in-time recovery reads the source's binary log as a stream of
//! events to map a wall-clock cutoff onto a replication position. The
//! transport is external; this module defines the event model and the
//! client seam.

mod client;
mod errors;
mod event;

pub use client::{ChangeStream, ChangeStreamClient};
pub use errors::{StreamError, StreamResult};
pub use event::{ChangeEvent, EventFilter, FilterRule, StreamSource, MATCH_ALL_TABLES};
