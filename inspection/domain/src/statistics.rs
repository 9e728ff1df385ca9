use serde::{Deserialize, Serialize};
use std::fmt;

/// A min or max value as reported by the footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Text(String),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Text(value) => f.write_str(value),
            StatValue::Double(value) => write!(f, "{}", value),
            StatValue::Int(value) => write!(f, "{}", value),
            StatValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// Column chunk statistics. Every field may be missing from a footer, and
/// writers commonly omit them, so each one is optional on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    min: Option<StatValue>,
    max: Option<StatValue>,
    null_count: Option<u64>,
    distinct_count: Option<u64>,
    num_values: u64,
}

impl Statistics {
    pub fn new(min: Option<StatValue>, max: Option<StatValue>) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    pub fn with_null_count(mut self, null_count: Option<u64>) -> Self {
        self.null_count = null_count;
        self
    }

    pub fn with_distinct_count(mut self, distinct_count: Option<u64>) -> Self {
        self.distinct_count = distinct_count;
        self
    }

    pub fn with_num_values(mut self, num_values: u64) -> Self {
        self.num_values = num_values;
        self
    }

    pub fn min(&self) -> Option<&StatValue> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&StatValue> {
        self.max.as_ref()
    }

    pub fn has_min_max(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    pub fn null_count(&self) -> Option<u64> {
        self.null_count
    }

    pub fn distinct_count(&self) -> Option<u64> {
        self.distinct_count
    }

    pub fn num_values(&self) -> u64 {
        self.num_values
    }
}
