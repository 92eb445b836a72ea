use ferroscore_core::{
    parse_iso_date, CompositeScore, PillarDetail, Recommendation, ScoringRun, Ticker,
    ValidationError, WeightSet,
};
use serde::{Deserialize, Serialize};
use time::Date;

/// Narrow view of a finished scoring run, all the store needs to persist it.
pub trait SnapshotSource {
    /// Composite scores in the order they should be recorded.
    fn composite_scores(&self) -> &[CompositeScore];

    fn pillar_detail(&self, ticker: &Ticker) -> Option<&PillarDetail>;

    fn weights(&self) -> &WeightSet;
}

impl SnapshotSource for ScoringRun {
    fn composite_scores(&self) -> &[CompositeScore] {
        &self.composites
    }

    fn pillar_detail(&self, ticker: &Ticker) -> Option<&PillarDetail> {
        self.pillar_detail.get(ticker)
    }

    fn weights(&self) -> &WeightSet {
        &self.weights
    }
}

/// Persisted, point-in-time record of one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// `YYYY-MM-DD`; the record's identity.
    pub snapshot_date: String,
    pub universe_size: usize,
    /// RFC3339 time the record was written.
    pub created_at: String,
    pub weights: WeightSet,
    pub scores: Vec<SnapshotEntry>,
}

impl SnapshotRecord {
    pub fn date(&self) -> Result<Date, ValidationError> {
        parse_iso_date(&self.snapshot_date)
    }

    pub fn entry(&self, ticker: &str) -> Option<&SnapshotEntry> {
        self.scores
            .iter()
            .find(|entry| entry.ticker.as_str() == ticker)
    }
}

/// One ticker's row within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub ticker: Ticker,
    pub fundamental_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub composite_score: f64,
    pub composite_percentile: f64,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub pillar_detail: PillarDetail,
}

impl SnapshotEntry {
    pub fn new(composite: &CompositeScore, pillar_detail: PillarDetail) -> Self {
        Self {
            ticker: composite.ticker.clone(),
            fundamental_score: composite.fundamental_score,
            technical_score: composite.technical_score,
            sentiment_score: composite.sentiment_score,
            composite_score: composite.composite_score,
            composite_percentile: composite.composite_percentile,
            recommendation: composite.recommendation,
            pillar_detail,
        }
    }

    /// Rebuilds the composite this row was recorded from.
    pub fn to_composite(&self) -> CompositeScore {
        CompositeScore {
            ticker: self.ticker.clone(),
            fundamental_score: self.fundamental_score,
            technical_score: self.technical_score,
            sentiment_score: self.sentiment_score,
            composite_score: self.composite_score,
            composite_percentile: self.composite_percentile,
            recommendation: self.recommendation,
        }
    }
}
