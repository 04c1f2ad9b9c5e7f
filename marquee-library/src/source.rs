//! Content source collaborator
//!
//! The host platform's library API. Transport is the host's business; the
//! core only sees raw JSON items plus the total length of the result set.

use marquee_common::error::CollaboratorError;
use serde::Serialize;

/// One page request against the content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    /// Content-type filters (e.g. `["1"]` for artists)
    pub filters: Vec<String>,
    /// Sort option id
    pub sort_order: String,
    /// Free-text filter, empty for none
    pub text_filter: String,
    pub offset: u64,
    pub limit: u64,
}

/// Raw page returned by the content source
#[derive(Debug, Clone, Default)]
pub struct ContentResponse {
    /// Items in source order, not yet validated
    pub items: Vec<serde_json::Value>,
    /// Size of the full result set across all pages
    pub total_length: u64,
}

/// Paged content provider
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one page of contents
    async fn get_contents(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, CollaboratorError>;
}
