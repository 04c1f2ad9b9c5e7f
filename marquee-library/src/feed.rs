//! Library feed - infinite-query state for one library page
//!
//! Holds the active query key and the pages loaded for it so far. Pages are
//! requested strictly in order: the next offset is derived from the last
//! loaded page. Changing the key bumps a generation counter; any response
//! tagged with an older generation is dropped when it arrives.

use crate::artists::{LibraryItem, SortOption, ARTISTS_FILTER, ARTISTS_QUERY};
use crate::cache::PageCache;
use crate::fetcher::PaginatedFetcher;
use crate::page::Page;
use crate::source::ContentSource;
use marquee_common::config::LibraryConfig;
use marquee_common::events::{CatalogEvent, EventBus};
use marquee_common::{LibraryQueryKey, QueryStatus, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Result of one `fetch_next_page` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was appended to the active series
    Appended { offset: u64, item_count: usize },
    /// Another caller already appended this offset
    AlreadyLoaded { offset: u64 },
    /// No further pages exist
    Exhausted,
    /// The key changed while the request was in flight; response dropped
    Superseded,
}

/// Snapshot of the feed for the presentation layer
#[derive(Debug, Clone)]
pub struct LibraryView<T> {
    pub key: LibraryQueryKey,
    pub status: QueryStatus,
    /// Items of every loaded page, flattened in order
    pub items: Vec<T>,
    /// Total reported by the most recent page
    pub total_length: Option<u64>,
    pub has_next_page: bool,
}

impl<T> LibraryView<T> {
    /// Loaded successfully but the library holds nothing
    pub fn is_empty(&self) -> bool {
        self.status == QueryStatus::Ready && self.items.is_empty()
    }
}

struct FeedState<T> {
    key: LibraryQueryKey,
    generation: u64,
    pages: Vec<Arc<Page<T>>>,
    status: QueryStatus,
}

impl<T> FeedState<T> {
    /// Offset the next request must use, `None` once exhausted
    fn next_offset(&self, limit: u64) -> Option<u64> {
        match self.pages.last() {
            None => Some(0),
            Some(last) => last.next_offset(limit),
        }
    }

    fn reset(&mut self, key: LibraryQueryKey) {
        self.key = key;
        self.generation += 1;
        self.pages.clear();
        self.status = QueryStatus::Pending;
    }
}

/// Paginated feed over one query name
pub struct LibraryFeed<T> {
    fetcher: PaginatedFetcher<T>,
    state: Mutex<FeedState<T>>,
    events: EventBus,
}

impl LibraryFeed<LibraryItem> {
    /// Saved artists feed, sorted by name with no text filter
    pub fn artists(
        source: Arc<dyn ContentSource>,
        config: &LibraryConfig,
        events: EventBus,
    ) -> Self {
        let filter = if config.artist_filter.is_empty() {
            ARTISTS_FILTER.to_string()
        } else {
            config.artist_filter.clone()
        };
        let fetcher = PaginatedFetcher::new(source, vec![filter], u64::from(config.page_size))
            .with_cache_capacity(config.cached_queries);
        let key = LibraryQueryKey::new(ARTISTS_QUERY, SortOption::Name.id(), "");
        Self::new(fetcher, key, events)
    }
}

impl<T> LibraryFeed<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: PaginatedFetcher<T>, key: LibraryQueryKey, events: EventBus) -> Self {
        Self {
            fetcher,
            state: Mutex::new(FeedState {
                key,
                generation: 0,
                pages: Vec::new(),
                status: QueryStatus::Pending,
            }),
            events,
        }
    }

    /// Active query key
    pub async fn key(&self) -> LibraryQueryKey {
        self.state.lock().await.key.clone()
    }

    /// Switch to a new key; returns false when `key` is already active
    ///
    /// The loaded pages are dropped and the series restarts at offset 0.
    pub async fn set_key(&self, key: LibraryQueryKey) -> bool {
        let mut state = self.state.lock().await;
        if state.key == key {
            return false;
        }
        debug!(from = %state.key, to = %key, "Library query changed");
        state.reset(key);
        self.events.emit_lossy(CatalogEvent::QueryChanged {
            query: state.key.to_string(),
            timestamp: chrono::Utc::now(),
        });
        true
    }

    /// Switch sort option and text filter, keeping the query name
    pub async fn set_query(&self, sort: SortOption, text_filter: &str) -> bool {
        let query_name = self.state.lock().await.key.query_name().to_string();
        self.set_key(LibraryQueryKey::new(query_name, sort.id(), text_filter))
            .await
    }

    /// Load the next page of the active series
    ///
    /// # Errors
    /// `Error::SourceUnavailable` from the fetcher, for the active key only.
    /// Failures for a superseded key are dropped like their pages.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome> {
        let limit = self.fetcher.limit();

        let (key, generation, offset) = {
            let state = self.state.lock().await;
            match state.next_offset(limit) {
                Some(offset) => (state.key.clone(), state.generation, offset),
                None => return Ok(FetchOutcome::Exhausted),
            }
        };

        let result = self.fetcher.fetch_page(&key, offset).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            match &result {
                Ok(_) => debug!(query = %key, offset, "Dropping response for superseded query"),
                Err(e) => warn!(query = %key, offset, error = %e, "Dropping failure for superseded query"),
            }
            self.events.emit_lossy(CatalogEvent::ResponseDiscarded {
                query: key.to_string(),
                timestamp: chrono::Utc::now(),
            });
            return Ok(FetchOutcome::Superseded);
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(query = %key, offset, error = %e, "Library page fetch failed");
                state.status = QueryStatus::Error;
                self.events.emit_lossy(CatalogEvent::QueryFailed {
                    query: key.to_string(),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                return Err(e);
            }
        };

        if state.next_offset(limit) != Some(page.offset) {
            return Ok(FetchOutcome::AlreadyLoaded { offset });
        }

        let item_count = page.items.len();
        let total_length = page.total_length;
        let exhausted = page.next_offset(limit).is_none();
        state.pages.push(page);
        state.status = QueryStatus::Ready;

        self.events.emit_lossy(CatalogEvent::PageLoaded {
            query: key.to_string(),
            offset,
            item_count,
            total_length,
            timestamp: chrono::Utc::now(),
        });
        if exhausted {
            let loaded_items = state.pages.iter().map(|p| p.items.len()).sum();
            debug!(query = %key, loaded_items, "Pagination exhausted");
            self.events.emit_lossy(CatalogEvent::PaginationExhausted {
                query: key.to_string(),
                loaded_items,
                timestamp: chrono::Utc::now(),
            });
        }

        Ok(FetchOutcome::Appended { offset, item_count })
    }

    /// Drop cached pages for the active key and reload from offset 0
    pub async fn refetch(&self) -> Result<FetchOutcome> {
        {
            let mut state = self.state.lock().await;
            let key = state.key.clone();
            let dropped = self.fetcher.cache().invalidate(&key).await;
            debug!(query = %key, dropped, "Refetching library query");
            state.reset(key);
        }
        self.fetch_next_page().await
    }

    /// Whether another page can be requested
    pub async fn has_next_page(&self) -> bool {
        let state = self.state.lock().await;
        !state.pages.is_empty() && state.next_offset(self.fetcher.limit()).is_some()
    }

    /// Page cache behind this feed
    pub fn page_cache(&self) -> &PageCache<T> {
        self.fetcher.cache()
    }

    /// Offsets of the loaded pages, in order
    pub async fn loaded_offsets(&self) -> Vec<u64> {
        let state = self.state.lock().await;
        state.pages.iter().map(|p| p.offset).collect()
    }

    /// Snapshot for rendering
    pub async fn view(&self) -> LibraryView<T> {
        let state = self.state.lock().await;
        LibraryView {
            key: state.key.clone(),
            status: state.status,
            items: state
                .pages
                .iter()
                .flat_map(|p| p.items.iter().cloned())
                .collect(),
            total_length: state.pages.last().map(|p| p.total_length),
            has_next_page: !state.pages.is_empty()
                && state.next_offset(self.fetcher.limit()).is_some(),
        }
    }
}
