use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AggregationError, Ticker, ValidationError};

/// Tolerance used when checking that a weight set sums to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Independent analytical dimension contributing to a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Fundamental,
    Technical,
    Sentiment,
}

impl Pillar {
    /// Fixed evaluation order. Sums over pillars always follow it.
    pub const ALL: [Pillar; 3] = [Pillar::Fundamental, Pillar::Technical, Pillar::Sentiment];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fundamental => "fundamental",
            Self::Technical => "technical",
            Self::Sentiment => "sentiment",
        }
    }
}

impl Display for Pillar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pillar {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fundamental" => Ok(Self::Fundamental),
            "technical" => Ok(Self::Technical),
            "sentiment" => Ok(Self::Sentiment),
            _ => Err(ValidationError::InvalidPillar {
                value: value.to_owned(),
            }),
        }
    }
}

/// One pillar's 0-100 score for one ticker in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub ticker: Ticker,
    pub pillar: Pillar,
    pub score: f64,
    /// Sub-factor scores that produced `score`, kept for snapshot detail.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub factors: BTreeMap<String, f64>,
}

impl PillarScore {
    pub fn new(ticker: Ticker, pillar: Pillar, score: f64) -> Self {
        Self {
            ticker,
            pillar,
            score,
            factors: BTreeMap::new(),
        }
    }

    pub fn with_factors(mut self, factors: BTreeMap<String, f64>) -> Self {
        self.factors = factors;
        self
    }
}

/// Pillar weights applied when computing composites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet(BTreeMap<Pillar, f64>);

impl Default for WeightSet {
    fn default() -> Self {
        Self::new(0.40, 0.35, 0.25)
    }
}

impl WeightSet {
    pub fn new(fundamental: f64, technical: f64, sentiment: f64) -> Self {
        Self(BTreeMap::from([
            (Pillar::Fundamental, fundamental),
            (Pillar::Technical, technical),
            (Pillar::Sentiment, sentiment),
        ]))
    }

    /// Weight for `pillar`; pillars without an entry weigh zero.
    pub fn weight(&self, pillar: Pillar) -> f64 {
        self.0.get(&pillar).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        Pillar::ALL.iter().map(|pillar| self.weight(*pillar)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pillar, f64)> + '_ {
        self.0.iter().map(|(pillar, weight)| (*pillar, *weight))
    }

    /// Rejects weight sets that would silently corrupt every composite.
    pub fn validate(&self) -> Result<(), AggregationError> {
        for (pillar, weight) in self.iter() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(AggregationError::WeightOutOfRange { pillar, weight });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AggregationError::WeightsNotNormalized { sum });
        }
        Ok(())
    }
}

/// Score and sub-factors of one pillar, as recorded in snapshot detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarBreakdown {
    pub score: f64,
    #[serde(default)]
    pub factors: BTreeMap<String, f64>,
}

/// Per-ticker pillar detail keyed by pillar.
pub type PillarDetail = BTreeMap<Pillar, PillarBreakdown>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_normalized() {
        let weights = WeightSet::default();
        assert!(weights.validate().is_ok());
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let err = WeightSet::new(0.5, 0.5, 0.5).validate().expect_err("must fail");
        assert!(matches!(err, AggregationError::WeightsNotNormalized { .. }));
    }

    #[test]
    fn rejects_negative_weight() {
        let err = WeightSet::new(1.2, -0.1, -0.1)
            .validate()
            .expect_err("must fail");
        assert!(matches!(err, AggregationError::WeightOutOfRange { .. }));
    }

    #[test]
    fn weights_serialize_keyed_by_pillar_name() {
        let json = serde_json::to_value(WeightSet::new(0.5, 0.3, 0.2)).expect("serialize");
        assert_eq!(json["fundamental"], 0.5);
        assert_eq!(json["technical"], 0.3);
        assert_eq!(json["sentiment"], 0.2);
    }

    #[test]
    fn pillar_parses_case_insensitively() {
        assert_eq!("Technical".parse::<Pillar>(), Ok(Pillar::Technical));
        assert!("momentum".parse::<Pillar>().is_err());
    }
}
