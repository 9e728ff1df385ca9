use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Uncompressed/compressed size ratio, rounded half-up to one decimal place.
///
/// Stored as integer tenths so that equal display values are equal buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompressionRatio {
    tenths: u64,
}

impl CompressionRatio {
    /// Returns `None` when nothing was stored compressed, the ratio is undefined then.
    pub fn new(compressed: u64, uncompressed: u64) -> Option<Self> {
        if compressed == 0 {
            return None;
        }

        let compressed = u128::from(compressed);
        let uncompressed = u128::from(uncompressed);
        let tenths = (20 * uncompressed + compressed) / (2 * compressed);

        Some(Self {
            tenths: u64::try_from(tenths).unwrap_or(u64::MAX),
        })
    }

    pub fn from_tenths(tenths: u64) -> Self {
        Self { tenths }
    }

    pub fn tenths(&self) -> u64 {
        self.tenths
    }

    pub fn as_f64(&self) -> f64 {
        self.tenths as f64 / 10.0
    }
}

impl fmt::Display for CompressionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:1", self.tenths / 10, self.tenths % 10)
    }
}

/// Compares two exact ratios `u1/c1` and `u2/c2` without rounding.
/// Both compressed sizes must be non-zero.
pub fn compare_exact(c1: u64, u1: u64, c2: u64, u2: u64) -> Ordering {
    (u128::from(u1) * u128::from(c2)).cmp(&(u128::from(u2) * u128::from(c1)))
}
