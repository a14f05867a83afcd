//! Per-key deduplication of concurrent async work.
//!
//! The first caller for a key becomes the leader and runs the supplied future;
//! callers arriving while it runs wait on the same `OnceCell` and receive a
//! clone of its value. A failed or cancelled leader does not poison the key:
//! the next waiter runs its own future.

use std::{future::Future, hash::Hash, sync::Arc};

use dashmap::DashMap;
use tokio::sync::OnceCell;

pub struct SingleFlight<K, V> {
    flights: DashMap<K, Arc<OnceCell<V>>>,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self { flights: DashMap::new() }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `init` for `key` unless a flight for it is already in progress,
    /// in which case wait for that flight instead.
    pub async fn run<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // Clone the cell out so the shard lock is released before awaiting.
        let cell = Arc::clone(
            self.flights
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        let result = cell.get_or_try_init(init).await.cloned();

        self.flights.remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));
        result
    }

    /// Number of keys with a flight registered right now.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    pub fn clear(&self) {
        self.flights.clear();
    }
}
