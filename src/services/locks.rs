use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serialises mutations of one order within this process.
///
/// Every line-item action reads siblings, mutates and rewrites the order
/// aggregate; holding the order's guard across that sequence keeps two
/// concurrent actions from interleaving. Other processes sharing the
/// database are not covered.
#[derive(Clone, Default)]
pub struct OrderLocks {
    inner: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, order_id: i64) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held while waiting.
        let mutex = self.inner.entry(order_id).or_default().clone();
        mutex.lock_owned().await
    }

    /// Drops entries nobody is holding or waiting on.
    pub fn prune(&self) {
        self.inner.retain(|_, m| Arc::strong_count(m) > 1);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
