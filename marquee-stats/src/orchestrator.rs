//! Aggregation orchestrator
//!
//! Turns the ranked tracks of one time window into a single
//! `StatisticsResult`:
//! 1. fetch and classify ranked records
//! 2. keep catalog tracks (none left -> `InsufficientData`)
//! 3. mean popularity and explicit fraction
//! 4. genre and release-year distributions
//! 5. mean feature vector
//! 6. merge into one analysis map
//!
//! Steps 4 and 5 are independent and are joined; any failure aborts the
//! whole call.

use crate::features::{FeatureAverager, FeatureService};
use crate::frequency::{aggregate_genres, aggregate_release_years, FrequencyMap};
use crate::ranking::{RankingService, TimeWindow};
use crate::record::{classify_all, filter_catalog, CatalogTrack};
use marquee_common::config::StatsConfig;
use marquee_common::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Analysis key for mean popularity (0..=100)
pub const POPULARITY: &str = "popularity";

/// Analysis key for the explicit-track fraction (0..=1)
pub const EXPLICIT: &str = "explicit";

/// Consolidated statistics for one time window
///
/// Built once per aggregation call and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResult {
    analysis: BTreeMap<String, f64>,
    genres: FrequencyMap,
    release_years: FrequencyMap,
}

impl StatisticsResult {
    /// Metric name -> value (popularity, explicit, feature means)
    pub fn analysis(&self) -> &BTreeMap<String, f64> {
        &self.analysis
    }

    pub fn genres(&self) -> &FrequencyMap {
        &self.genres
    }

    pub fn release_years(&self) -> &FrequencyMap {
        &self.release_years
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.analysis.get(name).copied()
    }
}

/// Composes ranking, classification, distributions and feature means
pub struct AggregationOrchestrator {
    ranking: Arc<dyn RankingService>,
    averager: FeatureAverager,
    config: StatsConfig,
}

impl AggregationOrchestrator {
    pub fn new(
        ranking: Arc<dyn RankingService>,
        features: Arc<dyn FeatureService>,
        config: StatsConfig,
    ) -> Self {
        let averager = FeatureAverager::new(features, config.feature_batch_size);
        Self {
            ranking,
            averager,
            config,
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Aggregate statistics for `window`
    ///
    /// # Errors
    /// - `Error::SourceUnavailable` if the ranking service fails
    /// - `Error::MalformedRecord` if a ranked record cannot be classified
    /// - `Error::InsufficientData` if no catalog tracks remain
    /// - `Error::MalformedDate` from the release-year distribution
    /// - `Error::FeatureServiceUnavailable`, `Error::MalformedFeatureVector`
    ///   from the feature mean, or when a configured dimension is missing
    pub async fn aggregate(&self, window: TimeWindow) -> Result<StatisticsResult> {
        let limit = self.config.ranking_limit;

        let mut raw = self
            .ranking
            .get_ranked(window, limit)
            .await
            .map_err(|e| Error::SourceUnavailable(format!("ranking service: {}", e)))?;
        raw.truncate(limit);

        let records = classify_all(&raw)?;
        let ranked_count = records.len();
        let tracks = filter_catalog(records);
        debug!(
            window = %window,
            ranked = ranked_count,
            catalog = tracks.len(),
            "Classified ranked records"
        );

        if tracks.is_empty() {
            return Err(Error::InsufficientData(format!(
                "no catalog tracks among {} ranked records for {}",
                ranked_count, window
            )));
        }

        let (popularity, explicit) = scalar_aggregates(&tracks);
        let ids: BTreeSet<String> = tracks.iter().map(|track| track.id.clone()).collect();

        let distributions = async {
            let genres = aggregate_genres(&tracks);
            let release_years = aggregate_release_years(&tracks)?;
            Ok::<_, Error>((genres, release_years))
        };
        let (features, (genres, release_years)) =
            tokio::try_join!(self.averager.mean_features(&ids), distributions)?;

        let mut analysis: BTreeMap<String, f64> = features.dimensions().clone();
        for dimension in &self.config.feature_dimensions {
            if !analysis.contains_key(dimension) {
                return Err(Error::MalformedFeatureVector(format!(
                    "configured dimension {:?} missing from feature vectors",
                    dimension
                )));
            }
        }
        if let Some(reserved) = [POPULARITY, EXPLICIT]
            .into_iter()
            .find(|name| analysis.contains_key(*name))
        {
            return Err(Error::MalformedFeatureVector(format!(
                "feature dimension {:?} collides with a track aggregate",
                reserved
            )));
        }
        analysis.insert(POPULARITY.to_string(), popularity);
        analysis.insert(EXPLICIT.to_string(), explicit);

        info!(
            window = %window,
            tracks = tracks.len(),
            genres = genres.len(),
            years = release_years.len(),
            "Aggregated listening statistics"
        );

        Ok(StatisticsResult {
            analysis,
            genres,
            release_years,
        })
    }
}

/// Mean popularity and explicit fraction over a non-empty track set
fn scalar_aggregates(tracks: &[CatalogTrack]) -> (f64, f64) {
    let count = tracks.len() as f64;
    let popularity: u64 = tracks.iter().map(|t| u64::from(t.popularity)).sum();
    let explicit = tracks.iter().filter(|t| t.explicit).count();
    (popularity as f64 / count, explicit as f64 / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Album;

    fn track(popularity: u8, explicit: bool) -> CatalogTrack {
        CatalogTrack {
            id: format!("{}-{}", popularity, explicit),
            uri: String::new(),
            name: String::new(),
            images: Vec::new(),
            popularity,
            explicit,
            album: Album {
                release_date: "2001".to_string(),
            },
            artists: Vec::new(),
        }
    }

    #[test]
    fn test_scalar_aggregates() {
        let tracks = vec![track(100, true), track(50, false), track(0, true), track(10, false)];
        let (popularity, explicit) = scalar_aggregates(&tracks);
        assert!((popularity - 40.0).abs() < 1e-12);
        assert!((explicit - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_scalar_aggregates_stay_in_range() {
        let tracks = vec![track(100, true), track(100, true)];
        let (popularity, explicit) = scalar_aggregates(&tracks);
        assert_eq!(popularity, 100.0);
        assert_eq!(explicit, 1.0);
    }
}
