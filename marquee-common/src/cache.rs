//! Keyed result cache with in-flight de-duplication
//!
//! Each entry is a `OnceCell`: the first caller runs the load, concurrent
//! callers for the same key wait on it, later callers read the stored value.
//! A failed load leaves no entry behind, so the next caller retries.
//!
//! Removal never drops a slot with a load running: a caller arriving after
//! the removal joins that load instead of starting a second one.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Shared cell for one cache entry
pub type Slot<V> = Arc<OnceCell<V>>;

/// Map from key to lazily-resolved value
pub struct KeyedCache<K, V> {
    entries: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the slot for `key`
    pub async fn slot(&self, key: &K) -> Slot<V> {
        let mut entries = self.entries.lock().await;
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Resolve `key`, running `load` only if no value is stored or in flight
    ///
    /// Returns the value and whether it came from an earlier load.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: &K, load: F) -> Result<(V, bool), E>
    where
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key).await;
        if let Some(value) = slot.get() {
            return Ok((value.clone(), true));
        }
        match slot.get_or_try_init(load).await {
            Ok(value) => Ok((value.clone(), false)),
            Err(e) => {
                self.discard_empty(key, &slot).await;
                Err(e)
            }
        }
    }

    /// Drop the entry for `key` if it is still `slot`, empty, and unused
    /// by any other caller
    async fn discard_empty(&self, key: &K, slot: &Slot<V>) {
        let mut entries = self.entries.lock().await;
        let unused = entries.get(key).is_some_and(|stored| {
            // held by the map and by `slot`
            Arc::ptr_eq(stored, slot) && !slot.initialized() && Arc::strong_count(slot) == 2
        });
        if unused {
            entries.remove(key);
        }
    }

    /// Drop every entry whose key matches `predicate`
    ///
    /// Slots with a load in flight are kept; their value lands in the cache
    /// when the load completes.
    pub async fn remove_where(&self, predicate: impl Fn(&K) -> bool) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, slot| !(predicate(key) && is_settled(slot)));
        before - entries.len()
    }

    /// Keys holding a resolved value
    pub async fn resolved_keys(&self) -> Vec<K> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Every key with an entry, resolved or not
    pub async fn keys(&self) -> Vec<K> {
        self.entries.lock().await.keys().cloned().collect()
    }
}

/// Resolved, or empty with no caller holding it
fn is_settled<V>(slot: &Slot<V>) -> bool {
    slot.initialized() || Arc::strong_count(slot) == 1
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
