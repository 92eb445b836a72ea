//! # Domain Models
//!
//! Canonical scoring types for ferroscore.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated equity ticker |
//! | [`Pillar`] | Fundamental, technical or sentiment dimension |
//! | [`PillarScore`] | One pillar score for one ticker |
//! | [`WeightSet`] | Pillar weights, normalized to one |
//! | [`Recommendation`] | Tier derived from a percentile |
//! | [`RawMetric`] | Unvalidated provider scalar |
//! | [`MetricSet`] | Raw metrics for one ticker |

mod calendar;
mod metric;
mod pillar;
mod recommendation;
mod ticker;

pub use calendar::{format_iso_date, format_rfc3339, parse_iso_date};
pub(crate) use calendar::parse_flexible_datetime;
pub use metric::{MetricSet, RawMetric};
pub use pillar::{
    Pillar, PillarBreakdown, PillarDetail, PillarScore, WeightSet, WEIGHT_SUM_TOLERANCE,
};
pub use recommendation::{Recommendation, RecommendationThresholds};
pub use ticker::{is_valid_ticker, Ticker};
