//! Per-node exclusive action lock
//!
//! Acquisition never waits: a second administrative action on the same
//! node is rejected up front rather than queued behind the first.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::errors::{NodeError, NodeResult};

/// Exclusive lock shared by all administrative actions on a node.
#[derive(Debug, Clone, Default)]
pub struct ActionLock {
    inner: Arc<Mutex<()>>,
}

/// Proof that the action lock is held. Released on drop.
#[derive(Debug)]
pub struct ActionGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ActionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock or fail immediately if it is held.
    pub fn try_acquire(&self) -> NodeResult<ActionGuard> {
        let guard = self
            .inner
            .clone()
            .try_lock_owned()
            .map_err(|_| NodeError::LockUnavailable)?;
        Ok(ActionGuard { _guard: guard })
    }

    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_rejected() {
        let lock = ActionLock::new();
        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_held());
        assert_eq!(lock.try_acquire().unwrap_err(), NodeError::LockUnavailable);
        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_ok());
    }

    #[test]
    fn test_clones_share_the_lock() {
        let lock = ActionLock::new();
        let other = lock.clone();
        let _guard = lock.try_acquire().unwrap();
        assert!(other.try_acquire().is_err());
    }
}
