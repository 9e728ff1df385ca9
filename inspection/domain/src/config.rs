use serde::{Deserialize, Serialize};

/// Floor on the uncompressed size of column chunks considered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinSize(u64);

impl MinSize {
    pub fn new(bytes: i64) -> Result<Self, ConfigurationError> {
        u64::try_from(bytes)
            .map(Self)
            .map_err(|_| ConfigurationError::NegativeMinSize(bytes))
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unknown sort key '{0}'")]
    UnknownSortKey(String),

    #[error("Sort key '{key}' is not available for {operation} (expected one of: {allowed})")]
    UnsupportedSortKey {
        key: String,
        operation: String,
        allowed: String,
    },

    #[error("{0} does not support sorting")]
    SortNotSupported(String),

    #[error("Minimum size must not be negative, got {0}")]
    NegativeMinSize(i64),

    #[error("{0} has no HTML output")]
    HtmlNotSupported(String),
}
