//! Per-entity mutual exclusion.
//!
//! Payment callbacks arrive concurrently with user requests, so every
//! read-modify-write of an offer, option, or portfolio entry runs under
//! a lock keyed by entity ID. Exactly one of a callback and a user
//! action wins a status transition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of keyed async locks.
///
/// Locks are created on first use and kept for the life of the process;
/// the entity population is bounded by retained aggregates.
#[derive(Debug, Default)]
pub struct EntityLocks {
    registry: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if it is held.
    ///
    /// The guard releases on drop. Callers acquiring multiple keys must
    /// do so in a fixed order (offer, option, portfolio; two portfolio
    /// keys through [`Self::acquire_pair`]) to avoid deadlock.
    pub async fn acquire(&self, key: impl Into<String>) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.registry.lock().await;
            Arc::clone(
                registry
                    .entry(key.into())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Acquire two distinct keys in lexicographic order, regardless of
    /// argument order.
    ///
    /// Every holder of the same pair then agrees on acquisition order
    /// no matter which role each key plays, so two concurrent holders
    /// cannot deadlock. The keys must differ; the same key twice would
    /// self-deadlock.
    ///
    /// Guards are returned in argument order and release on drop.
    pub async fn acquire_pair(
        &self,
        a: impl Into<String>,
        b: impl Into<String>,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            let guard_a = self.acquire(a).await;
            let guard_b = self.acquire(b).await;
            (guard_a, guard_b)
        } else {
            let guard_b = self.acquire(b).await;
            let guard_a = self.acquire(a).await;
            (guard_a, guard_b)
        }
    }
}
