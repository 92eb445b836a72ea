use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AggregationError;

/// Recommendation tier derived from a composite percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG SELL",
        }
    }
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STRONG BUY" => Ok(Self::StrongBuy),
            "BUY" => Ok(Self::Buy),
            "HOLD" => Ok(Self::Hold),
            "SELL" => Ok(Self::Sell),
            "STRONG SELL" => Ok(Self::StrongSell),
            other => Err(format!("unknown recommendation '{other}'")),
        }
    }
}

/// Inclusive lower percentile bounds for each tier above `STRONG SELL`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    pub strong_buy: f64,
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 85.0,
            buy: 65.0,
            hold: 35.0,
            sell: 15.0,
        }
    }
}

impl RecommendationThresholds {
    pub fn validate(&self) -> Result<(), AggregationError> {
        let cuts = [self.strong_buy, self.buy, self.hold, self.sell];
        let in_range = cuts
            .iter()
            .all(|cut| cut.is_finite() && (0.0..=100.0).contains(cut));
        let descending = cuts.windows(2).all(|pair| pair[0] > pair[1]);
        if in_range && descending {
            Ok(())
        } else {
            Err(AggregationError::InvalidThresholds)
        }
    }

    pub fn classify(&self, percentile: f64) -> Recommendation {
        if percentile >= self.strong_buy {
            Recommendation::StrongBuy
        } else if percentile >= self.buy {
            Recommendation::Buy
        } else if percentile >= self.hold {
            Recommendation::Hold
        } else if percentile >= self.sell {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }
}
