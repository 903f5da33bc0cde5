//! Change stream client traits

use async_trait::async_trait;

use super::errors::StreamResult;
use super::event::{ChangeEvent, EventFilter, StreamSource};
use crate::position::Position;

/// Opens filtered change-event streams.
#[async_trait]
pub trait ChangeStreamClient: Send + Sync {
    /// Start streaming events after `start` from `source`.
    async fn open(
        &self,
        source: &StreamSource,
        start: &Position,
        filter: &EventFilter,
    ) -> StreamResult<Box<dyn ChangeStream>>;
}

/// An open, ordered stream of event batches.
#[async_trait]
pub trait ChangeStream: Send {
    /// Next batch in arrival order. `Ok(None)` means the stream ended.
    async fn next_batch(&mut self) -> StreamResult<Option<Vec<ChangeEvent>>>;

    /// Release the connection. Must be safe to call more than once.
    async fn close(&mut self);
}
