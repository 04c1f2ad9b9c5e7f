//! Event types for the Marquee event system
//!
//! Provides the catalog event definitions and the EventBus shared by the
//! library feed and the statistics query.

use serde::Serialize;
use tokio::sync::broadcast;

/// Catalog pipeline events
///
/// Events are broadcast via EventBus and serialize to tagged JSON so a
/// presentation layer can forward them as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// Active query key changed; previous series is superseded
    QueryChanged {
        /// Display form of the new key
        query: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A page was appended to the active series
    PageLoaded {
        query: String,
        offset: u64,
        item_count: usize,
        total_length: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A response arrived for a superseded key and was dropped
    ResponseDiscarded {
        query: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// No further pages exist for the active series
    PaginationExhausted {
        query: String,
        loaded_items: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Statistics computed for a time window
    StatisticsReady {
        query: String,
        record_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A fetch or aggregation for the active key failed
    QueryFailed {
        query: String,
        /// Stable error code (`Error::kind`)
        kind: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CatalogEvent {
    /// Event type name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::QueryChanged { .. } => "QueryChanged",
            CatalogEvent::PageLoaded { .. } => "PageLoaded",
            CatalogEvent::ResponseDiscarded { .. } => "ResponseDiscarded",
            CatalogEvent::PaginationExhausted { .. } => "PaginationExhausted",
            CatalogEvent::StatisticsReady { .. } => "StatisticsReady",
            CatalogEvent::QueryFailed { .. } => "QueryFailed",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use marquee_common::events::{CatalogEvent, EventBus};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(CatalogEvent::QueryChanged {
///     query: "library:artists[sort=0, filter=\"\"]".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(CatalogEvent::QueryChanged { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CatalogEvent,
    ) -> Result<usize, broadcast::error::SendError<CatalogEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CatalogEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
