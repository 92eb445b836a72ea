//! Pillar scorers: turn validated metrics into 0-100 pillar scores.
//!
//! Factor math is provider specific. [`FactorScorer`] covers the common case
//! of a weighted mean over linearly banded metrics; anything more elaborate
//! implements [`PillarScorer`] directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::throttling::QuotaPolicy;
use crate::validation::{validate_numeric, validate_percentage, validate_ratio, NumericBounds};
use crate::{MetricSet, Pillar, PillarScore, RawMetric, Ticker};

/// Produces one pillar's score for a ticker, or `None` when no input is usable.
pub trait PillarScorer: Send + Sync {
    fn pillar(&self) -> Pillar;

    fn score(&self, ticker: &Ticker, metrics: &MetricSet) -> Option<PillarScore>;
}

/// How a factor's raw metric is validated before banding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricKind {
    Numeric(NumericBounds),
    /// Percentage in `[0, 100]`, or `[0, 1]` when `as_decimal`.
    Percentage { as_decimal: bool },
    /// Non-negative ratio with an optional plausibility cap.
    Ratio { max: Option<f64> },
}

impl MetricKind {
    fn validate(self, value: &RawMetric) -> Option<f64> {
        match self {
            Self::Numeric(bounds) => validate_numeric(value.clone(), bounds),
            Self::Percentage { as_decimal } => validate_percentage(value.clone(), as_decimal),
            Self::Ratio { max } => validate_ratio(value.clone(), max),
        }
    }
}

/// One metric mapped linearly onto 0-100.
///
/// `worst` maps to 0 and `best` to 100; either may be the larger bound, so
/// "lower is better" metrics such as P/E set `worst > best`.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub metric: String,
    pub kind: MetricKind,
    pub worst: f64,
    pub best: f64,
    pub weight: f64,
}

impl Factor {
    pub fn new(metric: impl Into<String>, kind: MetricKind, worst: f64, best: f64) -> Self {
        Self {
            metric: metric.into(),
            kind,
            worst,
            best,
            weight: 1.0,
        }
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sub-score in `[0, 100]`, or `None` if the metric is missing or invalid.
    pub fn sub_score(&self, metrics: &MetricSet) -> Option<f64> {
        let value = self.kind.validate(metrics.get(&self.metric)?)?;
        let span = self.best - self.worst;
        if span == 0.0 || !span.is_finite() {
            return None;
        }
        let scaled = (value - self.worst) / span * 100.0;
        Some(scaled.clamp(0.0, 100.0))
    }
}

/// Weighted mean of banded factors for one pillar.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScorer {
    pillar: Pillar,
    factors: Vec<Factor>,
}

impl FactorScorer {
    pub fn new(pillar: Pillar, factors: Vec<Factor>) -> Self {
        Self { pillar, factors }
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }
}

impl PillarScorer for FactorScorer {
    fn pillar(&self) -> Pillar {
        self.pillar
    }

    fn score(&self, ticker: &Ticker, metrics: &MetricSet) -> Option<PillarScore> {
        let mut breakdown = BTreeMap::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for factor in &self.factors {
            if factor.weight <= 0.0 || !factor.weight.is_finite() {
                continue;
            }
            match factor.sub_score(metrics) {
                Some(sub_score) => {
                    weighted += sub_score * factor.weight;
                    total_weight += factor.weight;
                    breakdown.insert(factor.metric.clone(), sub_score);
                }
                None => debug!(
                    %ticker,
                    pillar = %self.pillar,
                    metric = %factor.metric,
                    "factor unavailable, skipping"
                ),
            }
        }

        if total_weight == 0.0 {
            return None;
        }

        let score = (weighted / total_weight).clamp(0.0, 100.0);
        Some(PillarScore::new(ticker.clone(), self.pillar, score).with_factors(breakdown))
    }
}

/// Applies a quota policy before every call to the wrapped scorer.
pub struct RateLimitedScorer<S> {
    inner: S,
    quota: Arc<dyn QuotaPolicy>,
}

impl<S> RateLimitedScorer<S> {
    pub fn new(inner: S, quota: Arc<dyn QuotaPolicy>) -> Self {
        Self { inner, quota }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: PillarScorer> PillarScorer for RateLimitedScorer<S> {
    fn pillar(&self) -> Pillar {
        self.inner.pillar()
    }

    fn score(&self, ticker: &Ticker, metrics: &MetricSet) -> Option<PillarScore> {
        self.quota.wait_if_needed();
        self.inner.score(ticker, metrics)
    }
}

/// Scores every ticker with every scorer.
///
/// Output follows ticker order, then scorer order. Tickers a scorer cannot
/// score are simply absent for that pillar.
pub fn score_universe(
    scorers: &[Box<dyn PillarScorer>],
    universe: &BTreeMap<Ticker, MetricSet>,
) -> Vec<PillarScore> {
    universe
        .iter()
        .flat_map(|(ticker, metrics)| {
            scorers
                .iter()
                .filter_map(move |scorer| scorer.score(ticker, metrics))
        })
        .collect()
}
