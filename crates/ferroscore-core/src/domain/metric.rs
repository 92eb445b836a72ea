use std::collections::BTreeMap;

use serde_json::Value;
use time::{Date, OffsetDateTime};

/// Untyped scalar as received from an external source.
///
/// Carries no invariants; see [`crate::validation`] for turning it into a
/// usable value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawMetric {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(Date),
    DateTime(OffsetDateTime),
}

impl RawMetric {
    /// Numeric coercion: numbers as-is, text parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
            Self::Null | Self::Bool(_) | Self::Date(_) | Self::DateTime(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<f64> for RawMetric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for RawMetric {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for RawMetric {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for RawMetric {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u64> for RawMetric {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for RawMetric {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for RawMetric {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawMetric {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Date> for RawMetric {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<OffsetDateTime> for RawMetric {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T> From<Option<T>> for RawMetric
where
    T: Into<RawMetric>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&Value> for RawMetric {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(_) | Value::Object(_) => Self::Null,
        }
    }
}

impl From<Value> for RawMetric {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

/// Raw metrics for one ticker, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet(BTreeMap<String, RawMetric>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawMetric>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawMetric>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&RawMetric> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a metric set from the top-level fields of a JSON object.
    pub fn from_json_object(value: &Value) -> Self {
        let mut metrics = Self::new();
        if let Value::Object(fields) = value {
            for (name, field) in fields {
                metrics.insert(name.clone(), field);
            }
        }
        metrics
    }
}
