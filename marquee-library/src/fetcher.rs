//! PaginatedFetcher
//!
//! Retrieves one bounded page for a query key and offset, going through the
//! page cache so each (key, offset) pair hits the content source at most once
//! while it is cached. Only the most recently fetched keys keep their pages.

use crate::cache::PageCache;
use crate::page::Page;
use crate::source::{ContentRequest, ContentSource};
use marquee_common::{Error, LibraryQueryKey, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Cache-backed page loader over a content source
pub struct PaginatedFetcher<T> {
    source: Arc<dyn ContentSource>,
    cache: PageCache<T>,
    filters: Vec<String>,
    limit: u64,
}

impl<T> PaginatedFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Create a fetcher requesting `limit` items per page with fixed
    /// content-type `filters`
    pub fn new(source: Arc<dyn ContentSource>, filters: Vec<String>, limit: u64) -> Self {
        Self {
            source,
            cache: PageCache::new(),
            filters,
            limit: limit.max(1),
        }
    }

    /// Retain pages for at most `capacity` query keys
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = PageCache::with_capacity(capacity);
        self
    }

    /// Page size
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Page cache (shared with feeds for invalidation)
    pub fn cache(&self) -> &PageCache<T> {
        &self.cache
    }

    /// Fetch the page at `offset` for `key`
    ///
    /// # Errors
    /// `Error::SourceUnavailable` if the source fails or any item does not
    /// deserialize. Failures are not cached.
    pub async fn fetch_page(&self, key: &LibraryQueryKey, offset: u64) -> Result<Arc<Page<T>>> {
        self.cache.touch(key).await;

        let (page, cached) = self
            .cache
            .get_or_try_load(key, offset, || self.load(key, offset))
            .await?;
        if cached {
            debug!(query = %key, offset, "Page served from cache");
        }
        Ok(page)
    }

    async fn load(&self, key: &LibraryQueryKey, offset: u64) -> Result<Arc<Page<T>>> {
        let request = ContentRequest {
            filters: self.filters.clone(),
            sort_order: key.sort_id().to_string(),
            text_filter: key.text_filter().to_string(),
            offset,
            limit: self.limit,
        };

        debug!(query = %key, offset, limit = self.limit, "Requesting page from content source");

        let response = self
            .source
            .get_contents(&request)
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let items = response
            .items
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<T>(value).map_err(|e| {
                    Error::SourceUnavailable(format!(
                        "Malformed item {} at offset {}: {}",
                        index, offset, e
                    ))
                })
            })
            .collect::<Result<Vec<T>>>()?;

        debug!(query = %key, offset, items = items.len(), total = response.total_length, "Page loaded");

        Ok(Arc::new(Page {
            items,
            total_length: response.total_length,
            offset,
        }))
    }
}
