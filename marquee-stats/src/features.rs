//! Mean audio-feature vectors
//!
//! Feature vectors come from an external feature service, one per track id.
//! The batch mean is all-or-nothing: if any id fails to resolve, the whole
//! call fails rather than averaging over a subset.

use marquee_common::error::CollaboratorError;
use marquee_common::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Named numeric dimensions for one track (e.g. "danceability" -> 0.7)
pub type FeatureVector = BTreeMap<String, f64>;

/// Per-track feature lookup
#[async_trait::async_trait]
pub trait FeatureService: Send + Sync {
    /// Fetch vectors for `ids`; ids the service does not know are omitted
    async fn get_features(
        &self,
        ids: &[String],
    ) -> std::result::Result<HashMap<String, FeatureVector>, CollaboratorError>;
}

/// Coordinate-wise mean of a non-empty batch of feature vectors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanFeatureVector {
    dimensions: FeatureVector,
    sample_count: usize,
}

impl MeanFeatureVector {
    /// Average `vectors`, which must share one dimension set
    ///
    /// # Errors
    /// - `Error::EmptyBatch` for zero vectors
    /// - `Error::MalformedFeatureVector` for mismatched dimensions or
    ///   non-finite values
    pub fn from_vectors<'a, I>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let mut vectors = vectors.into_iter();
        let first = vectors.next().ok_or(Error::EmptyBatch)?;

        let mut sums = FeatureVector::new();
        let mut sample_count = 0;
        for vector in std::iter::once(first).chain(vectors) {
            if !vector.keys().eq(first.keys()) {
                return Err(Error::MalformedFeatureVector(format!(
                    "dimension set {:?} differs from {:?}",
                    vector.keys().collect::<Vec<_>>(),
                    first.keys().collect::<Vec<_>>()
                )));
            }
            for (dimension, value) in vector {
                if !value.is_finite() {
                    return Err(Error::MalformedFeatureVector(format!(
                        "non-finite value {} for {}",
                        value, dimension
                    )));
                }
                *sums.entry(dimension.clone()).or_insert(0.0) += value;
            }
            sample_count += 1;
        }

        let dimensions = sums
            .into_iter()
            .map(|(dimension, sum)| (dimension, sum / sample_count as f64))
            .collect();

        Ok(Self {
            dimensions,
            sample_count,
        })
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.dimensions.get(dimension).copied()
    }

    pub fn dimensions(&self) -> &FeatureVector {
        &self.dimensions
    }

    /// Number of vectors averaged
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

/// Batches id lookups against the feature service and averages the result
pub struct FeatureAverager {
    service: Arc<dyn FeatureService>,
    batch_size: usize,
}

impl FeatureAverager {
    pub fn new(service: Arc<dyn FeatureService>, batch_size: usize) -> Self {
        Self {
            service,
            batch_size: batch_size.max(1),
        }
    }

    /// Mean feature vector over `ids`
    ///
    /// Ids are requested in chunks of the configured batch size; chunks are
    /// issued together and all must succeed.
    ///
    /// # Errors
    /// - `Error::EmptyBatch` when `ids` is empty
    /// - `Error::FeatureServiceUnavailable` when the service fails or omits
    ///   any id
    /// - `Error::MalformedFeatureVector` when vectors disagree on dimensions
    pub async fn mean_features(&self, ids: &BTreeSet<String>) -> Result<MeanFeatureVector> {
        if ids.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let ids: Vec<String> = ids.iter().cloned().collect();
        let chunks = ids.chunks(self.batch_size).map(|chunk| async move {
            self.service
                .get_features(chunk)
                .await
                .map_err(|e| Error::FeatureServiceUnavailable(e.to_string()))
        });
        let responses = futures::future::try_join_all(chunks).await?;

        let mut resolved: HashMap<String, FeatureVector> =
            responses.into_iter().flatten().collect();

        let vectors = ids
            .iter()
            .map(|id| {
                resolved.remove(id).ok_or_else(|| {
                    Error::FeatureServiceUnavailable(format!("no features returned for {}", id))
                })
            })
            .collect::<Result<Vec<FeatureVector>>>()?;

        debug!(
            ids = ids.len(),
            requests = ids.len().div_ceil(self.batch_size),
            "Resolved feature vectors"
        );

        MeanFeatureVector::from_vectors(&vectors)
    }
}
