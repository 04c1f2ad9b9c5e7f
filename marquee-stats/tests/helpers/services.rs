//! In-memory ranking and feature services

use marquee_common::error::CollaboratorError;
use marquee_stats::{FeatureService, FeatureVector, RankingService, TimeWindow};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Ranking service answering from a fixed table per window
///
/// Requests for the held window block until `release()`.
pub struct FakeRankingService {
    ranked: HashMap<TimeWindow, Vec<Value>>,
    calls: AtomicUsize,
    limits: Mutex<Vec<usize>>,
    failing: AtomicBool,
    held: Option<TimeWindow>,
    entered: Notify,
    release: Notify,
}

impl FakeRankingService {
    pub fn new() -> Self {
        Self {
            ranked: HashMap::new(),
            calls: AtomicUsize::new(0),
            limits: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            held: None,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn with(mut self, window: TimeWindow, records: Vec<Value>) -> Self {
        self.ranked.insert(window, records);
        self
    }

    pub fn holding(mut self, window: TimeWindow) -> Self {
        self.held = Some(window);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RankingService for FakeRankingService {
    async fn get_ranked(
        &self,
        window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<Value>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.limits.lock().unwrap().push(limit);

        if self.held == Some(window) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Api(503, "ranking unavailable".to_string()));
        }
        Ok(self.ranked.get(&window).cloned().unwrap_or_default())
    }
}

/// Feature service backed by a fixed id -> vector table
///
/// Unknown ids are silently omitted from responses, like a real lookup.
pub struct FakeFeatureService {
    vectors: HashMap<String, FeatureVector>,
    requests: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
}

impl FakeFeatureService {
    pub fn new() -> Self {
        Self {
            vectors: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with(mut self, id: &str, vector: FeatureVector) -> Self {
        self.vectors.insert(id.to_string(), vector);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Id batches received, in arrival order
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FeatureService for FakeFeatureService {
    async fn get_features(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, FeatureVector>, CollaboratorError> {
        self.requests.lock().unwrap().push(ids.to_vec());

        if self.failing.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Network("feature lookup timed out".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.vectors.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }
}
