//! Statistics query - cached results for the top-genres page
//!
//! One result per time window, cached by `StatsQueryKey`. Selecting another
//! window supersedes the active one: an aggregation still running for the
//! old window completes into the cache but is not applied to the view.

use crate::orchestrator::{AggregationOrchestrator, StatisticsResult};
use crate::ranking::TimeWindow;
use marquee_common::cache::KeyedCache;
use marquee_common::events::{CatalogEvent, EventBus};
use marquee_common::{Error, QueryStatus, Result, StatsQueryKey};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Query name for the top-genres page
pub const TOP_GENRES_QUERY: &str = "top-genres";

/// Result of one `load` call
#[derive(Debug, Clone)]
pub enum StatsOutcome {
    /// Statistics for the active window
    Ready(Arc<StatisticsResult>),
    /// The window changed while aggregating; result not applied
    Superseded,
}

/// Snapshot of the query for the presentation layer
#[derive(Debug, Clone)]
pub struct StatsView {
    pub key: StatsQueryKey,
    pub window: TimeWindow,
    pub status: QueryStatus,
    pub result: Option<Arc<StatisticsResult>>,
    /// Last failure message for the active window
    pub error: Option<String>,
    /// Last failure was `InsufficientData`
    pub no_data: bool,
}

struct QueryState {
    window: TimeWindow,
    key: StatsQueryKey,
    generation: u64,
    status: QueryStatus,
    result: Option<Arc<StatisticsResult>>,
    error: Option<String>,
    no_data: bool,
}

impl QueryState {
    fn reset(&mut self, window: TimeWindow, key: StatsQueryKey) {
        self.window = window;
        self.key = key;
        self.generation += 1;
        self.status = QueryStatus::Pending;
        self.result = None;
        self.error = None;
        self.no_data = false;
    }
}

/// Per-window statistics with caching and supersession
pub struct StatsQuery {
    orchestrator: Arc<AggregationOrchestrator>,
    cache: KeyedCache<StatsQueryKey, Arc<StatisticsResult>>,
    state: Mutex<QueryState>,
    events: EventBus,
}

impl StatsQuery {
    pub fn new(orchestrator: Arc<AggregationOrchestrator>, events: EventBus) -> Self {
        let window = TimeWindow::default();
        Self {
            orchestrator,
            cache: KeyedCache::new(),
            state: Mutex::new(QueryState {
                window,
                key: key_for(window),
                generation: 0,
                status: QueryStatus::Pending,
                result: None,
                error: None,
                no_data: false,
            }),
            events,
        }
    }

    /// Active time window
    pub async fn window(&self) -> TimeWindow {
        self.state.lock().await.window
    }

    /// Switch time window; returns false when `window` is already active
    pub async fn select(&self, window: TimeWindow) -> bool {
        let mut state = self.state.lock().await;
        if state.window == window {
            return false;
        }
        debug!(from = %state.window, to = %window, "Statistics window changed");
        state.reset(window, key_for(window));
        self.events.emit_lossy(CatalogEvent::QueryChanged {
            query: state.key.to_string(),
            timestamp: chrono::Utc::now(),
        });
        true
    }

    /// Resolve statistics for the active window, from cache when possible
    ///
    /// # Errors
    /// Any aggregation error for the active window. Failures for a
    /// superseded window are dropped.
    pub async fn load(&self) -> Result<StatsOutcome> {
        let (window, key, generation) = {
            let state = self.state.lock().await;
            (state.window, state.key.clone(), state.generation)
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let loaded = self
            .cache
            .get_or_try_load(&key, || async move {
                orchestrator.aggregate(window).await.map(Arc::new)
            })
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            match &loaded {
                Ok(_) => debug!(query = %key, "Dropping statistics for superseded window"),
                Err(e) => warn!(query = %key, error = %e, "Dropping failure for superseded window"),
            }
            self.events.emit_lossy(CatalogEvent::ResponseDiscarded {
                query: key.to_string(),
                timestamp: chrono::Utc::now(),
            });
            return Ok(StatsOutcome::Superseded);
        }

        match loaded {
            Ok((result, cached)) => {
                debug!(query = %key, cached, "Statistics ready");
                state.status = QueryStatus::Ready;
                state.result = Some(Arc::clone(&result));
                state.error = None;
                state.no_data = false;
                self.events.emit_lossy(CatalogEvent::StatisticsReady {
                    query: key.to_string(),
                    record_count: result.release_years().total() as usize,
                    timestamp: chrono::Utc::now(),
                });
                Ok(StatsOutcome::Ready(result))
            }
            Err(e) => {
                warn!(query = %key, error = %e, "Statistics aggregation failed");
                state.status = QueryStatus::Error;
                state.result = None;
                state.error = Some(e.to_string());
                state.no_data = matches!(e, Error::InsufficientData(_));
                self.events.emit_lossy(CatalogEvent::QueryFailed {
                    query: key.to_string(),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Drop the cached result for the active window and aggregate again
    pub async fn refetch(&self) -> Result<StatsOutcome> {
        {
            let mut state = self.state.lock().await;
            let (window, key) = (state.window, state.key.clone());
            self.cache.remove_where(|k| *k == key).await;
            state.reset(window, key);
        }
        self.load().await
    }

    /// Snapshot for rendering
    pub async fn view(&self) -> StatsView {
        let state = self.state.lock().await;
        StatsView {
            key: state.key.clone(),
            window: state.window,
            status: state.status,
            result: state.result.clone(),
            error: state.error.clone(),
            no_data: state.no_data,
        }
    }
}

fn key_for(window: TimeWindow) -> StatsQueryKey {
    StatsQueryKey::new(TOP_GENRES_QUERY, window.id())
}
