use crate::config::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Order in which the aggregator emitted the rows.
    Position,
    Records,
    RowGroups,
    Ratio,
    Size,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Accepted spellings on the command line. The first entry per key is canonical.
const SORT_KEY_NAMES: &[(&str, SortKey)] = &[
    ("position", SortKey::Position),
    ("records", SortKey::Records),
    ("num_records", SortKey::Records),
    ("num_rg", SortKey::RowGroups),
    ("row-groups", SortKey::RowGroups),
    ("ratio", SortKey::Ratio),
    ("size", SortKey::Size),
    ("name", SortKey::Name),
];

impl SortKey {
    pub fn parse(name: &str) -> Result<Self, ConfigurationError> {
        SORT_KEY_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, key)| *key)
            .ok_or_else(|| ConfigurationError::UnknownSortKey(name.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        SORT_KEY_NAMES
            .iter()
            .find(|(_, key)| key == self)
            .map(|(name, _)| *name)
            .unwrap_or("position")
    }

    pub fn natural_order(&self) -> SortOrder {
        match self {
            SortKey::Position | SortKey::Ratio | SortKey::Name => SortOrder::Ascending,
            SortKey::Records | SortKey::RowGroups | SortKey::Size => SortOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    key: SortKey,
    order: SortOrder,
}

impl SortSpec {
    /// `reverse` flips the key's natural order.
    pub fn new(key: SortKey, reverse: bool) -> Self {
        let order = if reverse {
            key.natural_order().reversed()
        } else {
            key.natural_order()
        };
        Self { key, order }
    }

    pub fn key(&self) -> SortKey {
        self.key
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Index(usize),
    Count(u64),
    Text(String),
}

/// Rows of an aggregated view that can be reordered by a [`SortKey`].
pub trait Sortable {
    /// Keys this row type supports, the first one is the default.
    const SORT_KEYS: &'static [SortKey];

    fn sort_value(&self, key: SortKey) -> SortValue;

    /// Secondary ascending key for rows that compare equal on the primary one.
    fn tie_break(&self) -> Option<SortValue> {
        None
    }
}

pub fn ensure_supported(
    key: SortKey,
    supported: &[SortKey],
    operation: &str,
) -> Result<(), ConfigurationError> {
    if supported.is_empty() {
        return Err(ConfigurationError::SortNotSupported(operation.to_string()));
    }
    if supported.contains(&key) {
        return Ok(());
    }
    Err(ConfigurationError::UnsupportedSortKey {
        key: key.as_str().to_string(),
        operation: operation.to_string(),
        allowed: supported
            .iter()
            .map(SortKey::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Stable sort: rows equal on the key and tie-break keep emission order.
pub fn sort_rows<T: Sortable>(rows: &mut [T], spec: SortSpec) -> Result<(), ConfigurationError> {
    ensure_supported(spec.key(), T::SORT_KEYS, "this view")?;

    rows.sort_by(|a, b| {
        let primary = a.sort_value(spec.key()).cmp(&b.sort_value(spec.key()));
        let primary = match spec.order() {
            SortOrder::Ascending => primary,
            SortOrder::Descending => primary.reverse(),
        };
        primary.then_with(|| compare_tie_break(a, b))
    });

    Ok(())
}

fn compare_tie_break<T: Sortable>(a: &T, b: &T) -> Ordering {
    a.tie_break().cmp(&b.tie_break())
}
