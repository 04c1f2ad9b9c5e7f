//! marquee-stats - listening statistics
//!
//! Aggregation pipeline for the top-genres page:
//! - `record`: source-variant classification (catalog vs external)
//! - `frequency`: genre and release-year distributions
//! - `features`: mean audio-feature vectors from the feature service
//! - `ranking`: time windows and the ranking collaborator
//! - `orchestrator`: one consolidated result per time window
//! - `query`: per-window cached results for the page

pub mod features;
pub mod frequency;
pub mod orchestrator;
pub mod query;
pub mod ranking;
pub mod record;

pub use features::{FeatureAverager, FeatureService, FeatureVector, MeanFeatureVector};
pub use frequency::{aggregate_genres, aggregate_release_years, FrequencyMap};
pub use orchestrator::{AggregationOrchestrator, StatisticsResult};
pub use query::{StatsOutcome, StatsQuery, StatsView};
pub use ranking::{RankingService, TimeWindow};
pub use record::{classify, filter_catalog, CatalogTrack, ExternalTrack, RawRecord, Record};
