//! Page cache keyed by (query key, offset)
//!
//! Pages are kept for the most recently fetched query keys only. Fetching
//! under a key moves it to the front; keys beyond the capacity lose their
//! resolved pages.

use crate::page::Page;
use marquee_common::cache::{KeyedCache, Slot};
use marquee_common::{LibraryQueryKey, Result};
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Query keys retained when no capacity is configured
pub const DEFAULT_CACHED_QUERIES: usize = 8;

/// Shared cell for one (key, offset) entry
pub type PageSlot<T> = Slot<Arc<Page<T>>>;

/// Page cache shared by every feed reading the same source
pub struct PageCache<T> {
    inner: KeyedCache<(LibraryQueryKey, u64), Arc<Page<T>>>,
    /// Most recently fetched first
    recent: Mutex<VecDeque<LibraryQueryKey>>,
    capacity: usize,
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHED_QUERIES)
    }

    /// Cache retaining pages for at most `capacity` query keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: KeyedCache::new(),
            recent: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get or create the slot for `(key, offset)`
    pub async fn slot(&self, key: &LibraryQueryKey, offset: u64) -> PageSlot<T> {
        self.inner.slot(&(key.clone(), offset)).await
    }

    /// Resolve `(key, offset)`, running `load` only when nothing is cached
    /// or in flight. The flag is true for cached pages.
    pub async fn get_or_try_load<F, Fut>(
        &self,
        key: &LibraryQueryKey,
        offset: u64,
        load: F,
    ) -> Result<(Arc<Page<T>>, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Page<T>>>>,
    {
        self.inner.get_or_try_load(&(key.clone(), offset), load).await
    }

    /// Mark `key` as most recently used and evict pages of keys past the
    /// capacity. Returns the number of pages dropped.
    pub async fn touch(&self, key: &LibraryQueryKey) -> usize {
        let mut recent = self.recent.lock().await;
        if recent.front() == Some(key) {
            return 0;
        }
        recent.retain(|k| k != key);
        recent.push_front(key.clone());
        recent.truncate(self.capacity);

        let retained: HashSet<&LibraryQueryKey> = recent.iter().collect();
        let evicted = self.inner.remove_where(|(k, _)| !retained.contains(k)).await;
        if evicted > 0 {
            debug!(query = %key, evicted, "Evicted pages of older queries");
        }
        evicted
    }

    /// Drop every page cached for `key`
    pub async fn invalidate(&self, key: &LibraryQueryKey) -> usize {
        self.inner.remove_where(|(k, _)| k == key).await
    }

    /// Resolved offsets for `key`, ascending
    pub async fn resolved_offsets(&self, key: &LibraryQueryKey) -> Vec<u64> {
        let mut offsets: Vec<u64> = self
            .inner
            .resolved_keys()
            .await
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, offset)| offset)
            .collect();
        offsets.sort_unstable();
        offsets
    }

    /// Number of distinct query keys with any entry
    pub async fn cached_queries(&self) -> usize {
        let keys = self.inner.keys().await;
        keys.iter().map(|(k, _)| k).collect::<HashSet<_>>().len()
    }
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
