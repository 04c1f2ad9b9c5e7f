//! Common error types for Marquee

use thiserror::Error;

/// Common result type for Marquee operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the library and statistics pipelines
///
/// Every failure is surfaced to the caller of the page or aggregation call
/// that triggered it. Nothing here is retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// Content source unreachable, failed, or returned malformed data
    #[error("Content source unavailable: {0}")]
    SourceUnavailable(String),

    /// Feature service failed or could not resolve one or more ids
    #[error("Feature service unavailable: {0}")]
    FeatureServiceUnavailable(String),

    /// Raw record has a partial or invalid catalog shape
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Release date too short to derive a year label
    #[error("Malformed release date: {0:?}")]
    MalformedDate(String),

    /// Feature vectors disagree on their dimension set
    #[error("Malformed feature vector: {0}")]
    MalformedFeatureVector(String),

    /// Mean requested over zero ids
    #[error("Empty feature batch")]
    EmptyBatch,

    /// No catalog records left after classification
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable snake_case code for logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            Error::SourceUnavailable(_) => "source_unavailable",
            Error::FeatureServiceUnavailable(_) => "feature_service_unavailable",
            Error::MalformedRecord(_) => "malformed_record",
            Error::MalformedDate(_) => "malformed_date",
            Error::MalformedFeatureVector(_) => "malformed_feature_vector",
            Error::EmptyBatch => "empty_batch",
            Error::InsufficientData(_) => "insufficient_data",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }
}

/// Failure reported by an external collaborator (content source, ranking
/// service, feature service)
///
/// The core maps these onto [`Error`] depending on which collaborator failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Collaborator could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Collaborator answered with an error status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Collaborator answered with an unparsable body
    #[error("Parse error: {0}")]
    Parse(String),
}
