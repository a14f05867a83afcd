use std::{collections::HashMap, hash::Hash};
use tokio::sync::RwLock;

/// Generic in-memory key-value map guarded by an async `RwLock`.
///
/// Every mutation takes the write lock, so a check-then-write done inside
/// `update_map` is atomic with respect to other writers.
pub struct MemoryMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for MemoryMapStore<K, V> {
    fn default() -> Self {
        Self { inner: RwLock::new(HashMap::new()) }
    }
}

impl<K, V> MemoryMapStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or overwrite a value by key.
    pub async fn insert(&self, key: K, value: V) {
        self.inner.write().await.insert(key, value);
    }

    /// Insert only when the key is vacant; returns the value now stored.
    pub async fn insert_if_absent(&self, key: K, value: V) -> V {
        let mut map = self.inner.write().await;
        map.entry(key).or_insert(value).clone()
    }

    /// Remove a key; returns the previous value if it existed.
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().await.remove(key)
    }

    /// Apply a mutation to the underlying map while holding the write lock.
    pub async fn update_map<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<T, E>,
    {
        let mut map = self.inner.write().await;
        f(&mut map)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_map_store_crud() {
        let store = MemoryMapStore::<String, String>::new();

        // initially empty
        assert_eq!(store.len().await, 0);

        // insert and check
        store.insert("a".into(), "1".into()).await;
        store.insert("b".into(), "2".into()).await;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        // update_map
        store
            .update_map(|m| {
                if let Some(v) = m.get_mut("a") {
                    *v = "10".into();
                }
                Ok::<_, ()>(())
            })
            .await
            .unwrap();
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("10"));

        // remove
        assert_eq!(store.remove(&"b".into()).await.as_deref(), Some("2"));
        assert_eq!(store.remove(&"b".into()).await, None);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&"b".into()).await, None);
    }

    #[tokio::test]
    async fn clear_empties_the_map() {
        let store = MemoryMapStore::<i64, i64>::new();
        store.insert(1, 1).await;
        store.insert(2, 2).await;
        store.clear().await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_existing_value() {
        let store = MemoryMapStore::<i64, &'static str>::new();
        assert_eq!(store.insert_if_absent(1, "first").await, "first");
        assert_eq!(store.insert_if_absent(1, "second").await, "first");
        assert_eq!(store.get(&1).await, Some("first"));
    }

    #[tokio::test]
    async fn failed_update_map_leaves_map_untouched() {
        let store = MemoryMapStore::<i64, i64>::new();
        store.insert(1, 1).await;
        let res: Result<(), &str> = store
            .update_map(|m| {
                if m.values().any(|v| *v == 1) {
                    return Err("taken");
                }
                m.insert(2, 1);
                Ok(())
            })
            .await;
        assert_eq!(res, Err("taken"));
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&2).await, None);
    }
}
