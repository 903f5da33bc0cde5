//! Local node state
//!
//! The node's record and advertised role, the exclusive action lock that
//! serializes administrative actions, and the publisher that makes role
//! changes visible to health reporting.

mod errors;
mod handle;
mod lock;

pub use errors::{NodeError, NodeResult};
pub use handle::{NodeHandle, StatePublisher};
pub use lock::{ActionGuard, ActionLock};
