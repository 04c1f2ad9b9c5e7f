//! Time windows and the ranking collaborator

use crate::record::RawRecord;
use marquee_common::error::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listening-history window a ranking is computed over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[default]
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 3] = [
        TimeWindow::ShortTerm,
        TimeWindow::MediumTerm,
        TimeWindow::LongTerm,
    ];

    /// Range id used in query keys and by the ranking service
    pub fn id(self) -> &'static str {
        match self {
            TimeWindow::ShortTerm => "short_term",
            TimeWindow::MediumTerm => "medium_term",
            TimeWindow::LongTerm => "long_term",
        }
    }

    /// Human label for the dropdown
    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::ShortTerm => "Past Month",
            TimeWindow::MediumTerm => "Past 6 Months",
            TimeWindow::LongTerm => "All Time",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|window| window.id() == id)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Source of a user's top tracks
#[async_trait::async_trait]
pub trait RankingService: Send + Sync {
    /// Top tracks for `window`, best first, at most `limit` entries
    ///
    /// Entries may be catalog or external records; classification happens in
    /// the orchestrator.
    async fn get_ranked(
        &self,
        window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<RawRecord>, CollaboratorError>;
}
