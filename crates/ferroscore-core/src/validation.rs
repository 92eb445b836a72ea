//! Defensive normalization of provider inputs before they reach scoring.
//!
//! Every validator returns `None` (or a caller-supplied default) for
//! ordinary bad data. Only [`validate_api_response`] fails, and only for
//! structurally broken payloads.

use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::domain::parse_flexible_datetime;
use crate::{DataValidationError, RawMetric};

pub use crate::domain::is_valid_ticker;

/// Acceptance rules for [`validate_numeric`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allow_zero: bool,
    /// Returned in place of any rejected value.
    pub default: Option<f64>,
}

impl Default for NumericBounds {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            allow_zero: true,
            default: None,
        }
    }
}

impl NumericBounds {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn non_zero(mut self) -> Self {
        self.allow_zero = false;
        self
    }

    pub fn or_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    fn accepts(&self, value: f64) -> bool {
        value.is_finite()
            && self.min.map_or(true, |min| value >= min)
            && self.max.map_or(true, |max| value <= max)
            && (self.allow_zero || value != 0.0)
    }
}

/// Returns the value when it is finite and satisfies `bounds`, otherwise `bounds.default`.
pub fn validate_numeric(value: impl Into<RawMetric>, bounds: NumericBounds) -> Option<f64> {
    match value.into().as_f64() {
        Some(number) if bounds.accepts(number) => Some(number),
        _ => bounds.default,
    }
}

/// Percentages live in `[0, 100]`, or `[0, 1]` when `as_decimal` is set.
pub fn validate_percentage(value: impl Into<RawMetric>, as_decimal: bool) -> Option<f64> {
    let max = if as_decimal { 1.0 } else { 100.0 };
    validate_numeric(value, NumericBounds::between(0.0, max))
}

/// Ratios are zero or positive, optionally capped by a plausibility limit.
pub fn validate_ratio(value: impl Into<RawMetric>, max_value: Option<f64>) -> Option<f64> {
    validate_numeric(
        value,
        NumericBounds {
            min: Some(0.0),
            max: max_value,
            ..NumericBounds::default()
        },
    )
}

/// Parses a date-like input and rejects it when older than `max_age_days`.
pub fn validate_date(value: impl Into<RawMetric>, max_age_days: Option<u32>) -> Option<OffsetDateTime> {
    validate_date_at(value, max_age_days, OffsetDateTime::now_utc())
}

/// [`validate_date`] against an explicit "now".
pub fn validate_date_at(
    value: impl Into<RawMetric>,
    max_age_days: Option<u32>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    let parsed = match value.into() {
        RawMetric::Date(date) => date.midnight().assume_utc(),
        RawMetric::DateTime(datetime) => datetime.to_offset(time::UtcOffset::UTC),
        RawMetric::Text(text) => parse_flexible_datetime(&text)?,
        RawMetric::Null | RawMetric::Bool(_) | RawMetric::Number(_) => return None,
    };

    if let Some(max_age_days) = max_age_days {
        if now - parsed > Duration::days(i64::from(max_age_days)) {
            return None;
        }
    }

    Some(parsed)
}

/// Fails fast on absent/empty payloads and on payloads missing required fields.
pub fn validate_api_response(
    response: Option<&Value>,
    required_fields: &[&str],
) -> Result<(), DataValidationError> {
    let fields = match response {
        Some(Value::Object(fields)) if !fields.is_empty() => fields,
        _ => return Err(DataValidationError::EmptyResponse),
    };

    let missing: Vec<String> = required_fields
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| (*field).to_owned())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataValidationError::MissingFields { missing })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn numeric_accepts_in_range_and_rejects_out_of_range() {
        let bounds = NumericBounds::between(0.0, 10.0);
        assert_eq!(validate_numeric(5.0, bounds), Some(5.0));
        assert_eq!(validate_numeric(0.0, bounds), Some(0.0));
        assert_eq!(validate_numeric(10.0, bounds), Some(10.0));
        assert_eq!(validate_numeric(10.5, bounds), None);
        assert_eq!(validate_numeric(-0.1, bounds), None);
    }

    #[test]
    fn numeric_returns_default_for_rejected_values() {
        let bounds = NumericBounds::at_least(1.0).or_default(1.0);
        assert_eq!(validate_numeric(0.5, bounds), Some(1.0));
        assert_eq!(validate_numeric("abc", bounds), Some(1.0));
        assert_eq!(validate_numeric(None::<f64>, bounds), Some(1.0));
    }

    #[test]
    fn numeric_rejects_non_finite_and_non_numeric() {
        let bounds = NumericBounds::default();
        assert_eq!(validate_numeric(f64::NAN, bounds), None);
        assert_eq!(validate_numeric(f64::INFINITY, bounds), None);
        assert_eq!(validate_numeric("not a number", bounds), None);
        assert_eq!(validate_numeric(true, bounds), None);
        assert_eq!(validate_numeric("42.5", bounds), Some(42.5));
    }

    #[test]
    fn numeric_can_reject_zero() {
        let bounds = NumericBounds::default().non_zero();
        assert_eq!(validate_numeric(0.0, bounds), None);
        assert_eq!(validate_numeric(0.01, bounds), Some(0.01));
    }

    #[test]
    fn percentage_ranges() {
        assert_eq!(validate_percentage(55.0, false), Some(55.0));
        assert_eq!(validate_percentage(101.0, false), None);
        assert_eq!(validate_percentage(-1.0, false), None);
        assert_eq!(validate_percentage(0.55, true), Some(0.55));
        assert_eq!(validate_percentage(55.0, true), None);
    }

    #[test]
    fn ratio_rejects_negative_and_implausible() {
        assert_eq!(validate_ratio(0.0, None), Some(0.0));
        assert_eq!(validate_ratio(3.5, None), Some(3.5));
        assert_eq!(validate_ratio(-0.2, None), None);
        assert_eq!(validate_ratio(250.0, Some(100.0)), None);
        assert_eq!(validate_ratio(99.0, Some(100.0)), Some(99.0));
    }

    #[test]
    fn date_parses_supported_shapes() {
        let now = datetime!(2025-03-01 12:00 UTC);
        assert_eq!(
            validate_date_at("2025-02-28", None, now),
            Some(datetime!(2025-02-28 00:00 UTC))
        );
        assert_eq!(
            validate_date_at(date!(2025 - 02 - 01), None, now),
            Some(datetime!(2025-02-01 00:00 UTC))
        );
        assert_eq!(validate_date_at("garbage", None, now), None);
        assert_eq!(validate_date_at(20250101.0, None, now), None);
        assert_eq!(validate_date_at(None::<f64>, None, now), None);
    }

    #[test]
    fn date_older_than_max_age_is_stale() {
        let now = datetime!(2025-03-01 00:00 UTC);
        assert!(validate_date_at("2025-02-25", Some(7), now).is_some());
        assert!(validate_date_at("2025-02-20", Some(7), now).is_none());
    }

    #[test]
    fn api_response_requires_fields() {
        let response = json!({ "symbol": "AAPL", "price": 190.1 });
        assert_eq!(validate_api_response(Some(&response), &["symbol", "price"]), Ok(()));

        let err = validate_api_response(Some(&response), &["symbol", "volume", "eps"])
            .expect_err("missing fields");
        assert_eq!(
            err,
            DataValidationError::MissingFields {
                missing: vec![String::from("volume"), String::from("eps")]
            }
        );
    }

    #[test]
    fn api_response_rejects_empty_payloads() {
        assert_eq!(
            validate_api_response(None, &["symbol"]),
            Err(DataValidationError::EmptyResponse)
        );
        assert_eq!(
            validate_api_response(Some(&json!({})), &[]),
            Err(DataValidationError::EmptyResponse)
        );
        assert_eq!(
            validate_api_response(Some(&Value::Null), &[]),
            Err(DataValidationError::EmptyResponse)
        );
    }

    proptest! {
        #[test]
        fn numeric_returns_value_iff_within_bounds(
            value in -1.0e6f64..1.0e6,
            a in -1.0e6f64..1.0e6,
            span in 0.0f64..1.0e6,
        ) {
            let b = a + span;
            let result = validate_numeric(value, NumericBounds::between(a, b).or_default(-7.0));
            if a <= value && value <= b {
                prop_assert_eq!(result, Some(value));
            } else {
                prop_assert_eq!(result, Some(-7.0));
            }
        }
    }
}
