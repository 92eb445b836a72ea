use thiserror::Error;

use crate::domain::Pillar;

/// Contract errors for domain values that must be valid on construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("invalid ticker '{value}', expected at most 5 characters: letters with an optional class suffix")]
    InvalidTicker { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("unknown pillar '{value}', expected one of fundamental, technical, sentiment")]
    InvalidPillar { value: String },
}

/// Raised only for structurally broken provider payloads.
///
/// Out-of-range or missing values are not errors; validators return `None` for those.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataValidationError {
    #[error("api response is empty or absent")]
    EmptyResponse,
    #[error("api response is missing required fields: {}", missing.join(", "))]
    MissingFields { missing: Vec<String> },
}

/// Reasons an aggregation run is rejected as a whole.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregationError {
    #[error("weights must sum to 1.0 (got {sum})")]
    WeightsNotNormalized { sum: f64 },
    #[error("weight for pillar '{pillar}' must be within [0, 1] (got {weight})")]
    WeightOutOfRange { pillar: Pillar, weight: f64 },
    #[error("recommendation thresholds must be strictly descending within [0, 100]")]
    InvalidThresholds,
    #[error("score for {ticker}/{pillar} must be within [0, 100] (got {score})")]
    ScoreOutOfRange {
        ticker: String,
        pillar: Pillar,
        score: f64,
    },
    #[error("duplicate {pillar} score for {ticker}")]
    DuplicatePillarScore { ticker: String, pillar: Pillar },
    #[error("cannot aggregate an empty universe")]
    EmptyUniverse,
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DataValidation(#[from] DataValidationError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Job(#[from] crate::jobs::JobError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
