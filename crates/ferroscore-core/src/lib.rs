//! # Ferroscore Core
//!
//! Multi-pillar equity scoring: validation, rate limiting, pillar scoring
//! and composite aggregation.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`validation`] | Defensive normalization of provider inputs |
//! | [`throttling`] | Sliding-window and smoothed quota policies |
//! | [`pillars`] | Pillar scorer trait and factor-based scorer |
//! | [`aggregation`] | Composite scores, percentiles, recommendations |
//! | [`jobs`] | Job registry and bounded worker pool |
//! | [`config`] | TOML configuration |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`domain`] | Tickers, pillars, weights, raw metrics |
//! | [`error`] | Error types |
//!
//! ## Pipeline
//!
//! ```text
//! raw metrics ──▶ validation ──▶ pillar scorers ──▶ aggregator ──▶ ScoringRun
//!                                     │
//!                                     ▼
//!                               quota policy
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ferroscore_core::{CompositeAggregator, Pillar, PillarScore, Ticker, WeightSet};
//!
//! let aapl = Ticker::parse("AAPL")?;
//! let scores = vec![
//!     PillarScore::new(aapl.clone(), Pillar::Fundamental, 72.0),
//!     PillarScore::new(aapl.clone(), Pillar::Technical, 55.0),
//!     PillarScore::new(aapl, Pillar::Sentiment, 61.0),
//! ];
//!
//! let run = CompositeAggregator::new(WeightSet::default()).aggregate(&scores)?;
//! assert_eq!(run.universe_size(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregation;
pub mod config;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod pillars;
pub mod throttling;
pub mod validation;

// Aggregation
pub use aggregation::{
    percentile_ranks, CompositeAggregator, CompositeScore, MissingPillarPolicy, ScoringRun,
};

// Configuration
pub use config::{Config, JobPoolConfig, RateLimitConfig, RateLimitStrategy};

// Domain models
pub use domain::{
    format_iso_date, format_rfc3339, is_valid_ticker, parse_iso_date, MetricSet, Pillar,
    PillarBreakdown, PillarDetail, PillarScore, RawMetric, Recommendation,
    RecommendationThresholds, Ticker, WeightSet, WEIGHT_SUM_TOLERANCE,
};

// Error types
pub use error::{AggregationError, ConfigError, CoreError, DataValidationError, ValidationError};

// Jobs
pub use jobs::{JobError, JobId, JobRegistry, JobSnapshot, JobStatus, WorkerPool};

// Logging
pub use logging::{init_logging, LogFormat};

// Pillar scoring
pub use pillars::{
    score_universe, Factor, FactorScorer, MetricKind, PillarScorer, RateLimitedScorer,
};

// Throttling
pub use throttling::{
    quota_from_config, QuotaPolicy, RateLimitGuard, SlidingWindowLimiter, SmoothedQuota,
};

// Validation
pub use validation::{
    validate_api_response, validate_date, validate_date_at, validate_numeric,
    validate_percentage, validate_ratio, NumericBounds,
};
