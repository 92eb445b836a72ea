use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 5;
const MAX_CLASS_LEN: usize = 2;

/// Normalized equity ticker, e.g. `AAPL` or `BRK.B`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        check_ticker(&normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` when `value` is a plausible listed-equity ticker.
///
/// At most 5 characters in total: ASCII letters, with at most one embedded
/// `.` or `-` introducing a share-class suffix of 1-2 letters (`BRK.B`, `BF-B`).
pub fn is_valid_ticker(value: Option<&str>) -> bool {
    value.is_some_and(|value| check_ticker(value).is_ok())
}

fn check_ticker(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyTicker);
    }
    let invalid = || ValidationError::InvalidTicker {
        value: value.to_owned(),
    };
    if value.len() > MAX_TICKER_LEN {
        return Err(invalid());
    }

    let (base, class) = match value.find(|ch: char| ch == '.' || ch == '-') {
        Some(index) => (&value[..index], Some(&value[index + 1..])),
        None => (value, None),
    };

    let letters = |part: &str, max: usize| {
        !part.is_empty() && part.len() <= max && part.chars().all(|ch| ch.is_ascii_alphabetic())
    };

    if letters(base, MAX_TICKER_LEN) && class.map_or(true, |class| letters(class, MAX_CLASS_LEN)) {
        Ok(())
    } else {
        Err(invalid())
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
