//! Ordered hit queue shared by every fork of a visitor.

use crate::types::Hit;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

/// FIFO queue of hits awaiting delivery.
///
/// Clones share the same underlying queue.
#[derive(Debug, Clone, Default)]
pub struct HitQueue {
    hits: Arc<Mutex<VecDeque<Hit>>>,
    drain: Arc<AsyncMutex<()>>,
}

impl HitQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn hits(&self) -> MutexGuard<'_, VecDeque<Hit>> {
        // A poisoned lock still guards a consistent queue.
        self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a hit to the back of the queue.
    pub fn push(&self, hit: Hit) {
        self.hits().push_back(hit);
    }

    /// Remove and return the oldest hit.
    pub fn pop_front(&self) -> Option<Hit> {
        self.hits().pop_front()
    }

    /// Get the number of queued hits.
    pub fn len(&self) -> usize {
        self.hits().len()
    }

    /// Copy of the queued hits in delivery order.
    pub fn snapshot(&self) -> Vec<Hit> {
        self.hits().iter().cloned().collect()
    }

    /// Exclusive right to drain; held for the whole delivery loop.
    pub async fn lock_drain(&self) -> AsyncMutexGuard<'_, ()> {
        self.drain.lock().await
    }
}
