//! In-memory content source with call recording and a hold gate
//!
//! Items are generated from the request, so every (sort, text, offset) triple
//! yields stable, distinguishable content. Requests for the held sort id
//! block until `release()` is called, which lets tests resolve a response
//! after the feed has moved on to another key.

use marquee_common::error::CollaboratorError;
use marquee_library::{ContentRequest, ContentResponse, ContentSource};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

pub struct FakeContentSource {
    total_length: u64,
    calls: AtomicUsize,
    requests: Mutex<Vec<ContentRequest>>,
    failing_offsets: Mutex<HashSet<u64>>,
    malformed: bool,
    held_sort: Option<String>,
    entered: Notify,
    release: Notify,
}

impl FakeContentSource {
    pub fn new(total_length: u64) -> Self {
        Self {
            total_length,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            failing_offsets: Mutex::new(HashSet::new()),
            malformed: false,
            held_sort: None,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Return items missing required fields
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    /// Block requests for `sort_id` until `release()`
    pub fn holding(mut self, sort_id: &str) -> Self {
        self.held_sort = Some(sort_id.to_string());
        self
    }

    pub fn fail_at(&self, offset: u64) {
        self.failing_offsets.lock().unwrap().insert(offset);
    }

    pub fn recover_at(&self, offset: u64) {
        self.failing_offsets.lock().unwrap().remove(&offset);
    }

    /// Wait until a held request has reached the source
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ContentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_offsets(&self) -> Vec<u64> {
        self.requests().iter().map(|r| r.offset).collect()
    }
}

#[async_trait::async_trait]
impl ContentSource for FakeContentSource {
    async fn get_contents(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if self.held_sort.as_deref() == Some(request.sort_order.as_str()) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if self.failing_offsets.lock().unwrap().contains(&request.offset) {
            return Err(CollaboratorError::Network("connection reset".to_string()));
        }

        let end = (request.offset + request.limit).min(self.total_length);
        let items = (request.offset..end)
            .map(|i| {
                if self.malformed {
                    json!({ "name": format!("artist {}", i) })
                } else {
                    json!({
                        "uri": format!("spotify:artist:{}-{}", request.sort_order, i),
                        "name": format!("{}artist {}", request.text_filter, i),
                        "images": [{ "url": format!("https://img/{}", i) }],
                    })
                }
            })
            .collect();

        Ok(ContentResponse {
            items,
            total_length: self.total_length,
        })
    }
}
