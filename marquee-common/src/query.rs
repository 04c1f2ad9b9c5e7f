//! Query identity and status
//!
//! A query key identifies one logical fetch series. Equal keys share cached
//! results; a different key starts a new series. Keys are immutable: a new
//! user selection builds a new key.

use serde::Serialize;
use std::fmt;

/// Identity of a paginated library series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LibraryQueryKey {
    query_name: String,
    sort_id: String,
    text_filter: String,
}

impl LibraryQueryKey {
    pub fn new(
        query_name: impl Into<String>,
        sort_id: impl Into<String>,
        text_filter: impl Into<String>,
    ) -> Self {
        Self {
            query_name: query_name.into(),
            sort_id: sort_id.into(),
            text_filter: text_filter.into(),
        }
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    pub fn sort_id(&self) -> &str {
        &self.sort_id
    }

    pub fn text_filter(&self) -> &str {
        &self.text_filter
    }
}

impl fmt::Display for LibraryQueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[sort={}, filter={:?}]", self.query_name, self.sort_id, self.text_filter)
    }
}

/// Identity of a statistics aggregation series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StatsQueryKey {
    query_name: String,
    range_id: String,
}

impl StatsQueryKey {
    pub fn new(query_name: impl Into<String>, range_id: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            range_id: range_id.into(),
        }
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    pub fn range_id(&self) -> &str {
        &self.range_id
    }
}

impl fmt::Display for StatsQueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[range={}]", self.query_name, self.range_id)
    }
}

/// Status signal handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Nothing resolved yet for the active key
    Pending,
    /// Last call for the active key failed
    Error,
    /// Data available for the active key
    Ready,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStatus::Pending => write!(f, "pending"),
            QueryStatus::Error => write!(f, "error"),
            QueryStatus::Ready => write!(f, "ready"),
        }
    }
}
