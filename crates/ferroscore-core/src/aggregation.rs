//! Composite aggregation: weighted pillar sums, cross-sectional percentiles
//! and recommendation tiers for one scoring run.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    AggregationError, Pillar, PillarBreakdown, PillarDetail, PillarScore, Recommendation,
    RecommendationThresholds, Ticker, WeightSet,
};

/// How a ticker with a missing pillar is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPillarPolicy {
    /// Missing pillars contribute zero; present weights are not rescaled.
    #[default]
    Reduce,
    /// Present weights are rescaled to sum to one.
    Renormalize,
}

/// Composite result for one ticker in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub ticker: Ticker,
    pub fundamental_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub composite_score: f64,
    pub composite_percentile: f64,
    pub recommendation: Recommendation,
}

impl CompositeScore {
    pub fn pillar_score(&self, pillar: Pillar) -> Option<f64> {
        match pillar {
            Pillar::Fundamental => self.fundamental_score,
            Pillar::Technical => self.technical_score,
            Pillar::Sentiment => self.sentiment_score,
        }
    }
}

/// Output of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRun {
    /// Ordered by composite descending, ticker ascending on ties.
    pub composites: Vec<CompositeScore>,
    pub pillar_detail: BTreeMap<Ticker, PillarDetail>,
    pub weights: WeightSet,
    pub thresholds: RecommendationThresholds,
    pub missing_pillars: MissingPillarPolicy,
}

impl ScoringRun {
    pub fn universe_size(&self) -> usize {
        self.composites.len()
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&CompositeScore> {
        self.composites
            .iter()
            .find(|composite| &composite.ticker == ticker)
    }
}

/// Combines pillar scores into composites.
#[derive(Debug, Clone, Default)]
pub struct CompositeAggregator {
    weights: WeightSet,
    thresholds: RecommendationThresholds,
    missing_pillars: MissingPillarPolicy,
}

impl CompositeAggregator {
    pub fn new(weights: WeightSet) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self {
            weights: config.weights.clone(),
            thresholds: config.thresholds,
            missing_pillars: config.missing_pillars,
        }
    }

    pub fn with_thresholds(mut self, thresholds: RecommendationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_missing_pillars(mut self, policy: MissingPillarPolicy) -> Self {
        self.missing_pillars = policy;
        self
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    /// Aggregates a complete run. Any invalid input rejects the whole run.
    pub fn aggregate(&self, scores: &[PillarScore]) -> Result<ScoringRun, AggregationError> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        if scores.is_empty() {
            return Err(AggregationError::EmptyUniverse);
        }

        let pillar_detail = group_by_ticker(scores)?;

        let mut composites: Vec<CompositeScore> = pillar_detail
            .iter()
            .map(|(ticker, detail)| self.composite_for(ticker, detail))
            .collect();

        // Ranking needs the closed set; `composites` is already in ticker order.
        let values: Vec<f64> = composites
            .iter()
            .map(|composite| composite.composite_score)
            .collect();
        let percentiles = percentile_ranks(&values);
        for (composite, percentile) in composites.iter_mut().zip(percentiles) {
            composite.composite_percentile = percentile;
            composite.recommendation = self.thresholds.classify(percentile);
        }

        composites.sort_by(|left, right| {
            right
                .composite_score
                .partial_cmp(&left.composite_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.ticker.cmp(&right.ticker))
        });

        info!(
            universe_size = composites.len(),
            pillar_scores = scores.len(),
            policy = ?self.missing_pillars,
            "aggregated scoring run"
        );

        Ok(ScoringRun {
            composites,
            pillar_detail,
            weights: self.weights.clone(),
            thresholds: self.thresholds,
            missing_pillars: self.missing_pillars,
        })
    }

    fn composite_for(&self, ticker: &Ticker, detail: &PillarDetail) -> CompositeScore {
        let mut weighted = 0.0;
        let mut present_weight = 0.0;
        for pillar in Pillar::ALL {
            if let Some(breakdown) = detail.get(&pillar) {
                let weight = self.weights.weight(pillar);
                weighted += weight * breakdown.score;
                present_weight += weight;
            }
        }

        if detail.len() < Pillar::ALL.len() {
            debug!(
                %ticker,
                present = detail.len(),
                policy = ?self.missing_pillars,
                "ticker is missing pillar scores"
            );
        }

        let raw = match self.missing_pillars {
            MissingPillarPolicy::Reduce => weighted,
            MissingPillarPolicy::Renormalize if present_weight > 0.0 => weighted / present_weight,
            MissingPillarPolicy::Renormalize => 0.0,
        };

        let score_of = |pillar: Pillar| detail.get(&pillar).map(|breakdown| breakdown.score);
        CompositeScore {
            ticker: ticker.clone(),
            fundamental_score: score_of(Pillar::Fundamental),
            technical_score: score_of(Pillar::Technical),
            sentiment_score: score_of(Pillar::Sentiment),
            composite_score: round_to(raw, 2),
            composite_percentile: 0.0,
            recommendation: Recommendation::Hold,
        }
    }
}

fn group_by_ticker(
    scores: &[PillarScore],
) -> Result<BTreeMap<Ticker, PillarDetail>, AggregationError> {
    let mut grouped: BTreeMap<Ticker, PillarDetail> = BTreeMap::new();
    for score in scores {
        if !score.score.is_finite() || !(0.0..=100.0).contains(&score.score) {
            return Err(AggregationError::ScoreOutOfRange {
                ticker: score.ticker.to_string(),
                pillar: score.pillar,
                score: score.score,
            });
        }

        let detail = grouped.entry(score.ticker.clone()).or_default();
        if detail.contains_key(&score.pillar) {
            return Err(AggregationError::DuplicatePillarScore {
                ticker: score.ticker.to_string(),
                pillar: score.pillar,
            });
        }
        detail.insert(
            score.pillar,
            PillarBreakdown {
                score: score.score,
                factors: score.factors.clone(),
            },
        );
    }
    Ok(grouped)
}

/// Average-rank percentiles (`rank / n * 100`), ties sharing the mean rank.
///
/// Output is index-aligned with `values`.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&left, &right| {
        values[left]
            .partial_cmp(&values[right])
            .unwrap_or(Ordering::Equal)
            .then(left.cmp(&right))
    });

    let mut percentiles = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group spans ranks start+1 ..= end.
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let percentile = round_to(average_rank / n as f64 * 100.0, 2);
        for &index in &order[start..end] {
            percentiles[index] = percentile;
        }
        start = end;
    }
    percentiles
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
