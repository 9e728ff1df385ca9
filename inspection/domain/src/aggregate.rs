//! Folds over a [`FileMetadata`] tree.
//!
//! Every function here is pure: it borrows the parsed footer, walks row
//! groups in on-disk order and column chunks in schema order, and returns an
//! owned view whose row order is deterministic (first-seen order unless
//! documented otherwise).

use crate::model::{ColumnChunk, FileMetadata, PhysicalType};
use crate::ratio::{compare_exact, CompressionRatio};
use crate::sort::{SortKey, SortValue, Sortable};
use crate::statistics::StatValue;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

/// "`num_rg` row groups hold exactly `num_records` records each".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBucket {
    pub num_records: u64,
    pub num_rg: usize,
    pub position: usize,
}

impl Sortable for RecordBucket {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Position, SortKey::Records, SortKey::RowGroups];

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Records => SortValue::Count(self.num_records),
            SortKey::RowGroups => SortValue::Count(self.num_rg as u64),
            _ => SortValue::Index(self.position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSize {
    pub column: String,
    pub bytes: u64,
    pub position: usize,
}

impl Sortable for ColumnSize {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Size, SortKey::Name];

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Name => SortValue::Text(self.column.clone()),
            SortKey::Size => SortValue::Count(self.bytes),
            _ => SortValue::Index(self.position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSize {
    pub physical_type: PhysicalType,
    pub bytes: u64,
    pub position: usize,
}

impl Sortable for TypeSize {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Size, SortKey::Name];

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Name => SortValue::Text(self.physical_type.as_str().to_string()),
            SortKey::Size => SortValue::Count(self.bytes),
            _ => SortValue::Index(self.position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeColumnSize {
    pub physical_type: PhysicalType,
    pub column: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRatio {
    pub row_group: usize,
    pub column: String,
    pub compressed: u64,
    pub uncompressed: u64,
    pub ratio: CompressionRatio,
    pub position: usize,
}

impl Sortable for ChunkRatio {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Position, SortKey::Ratio, SortKey::Name];

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Ratio => SortValue::Count(self.ratio.tenths()),
            SortKey::Name => SortValue::Text(self.column.clone()),
            _ => SortValue::Index(self.position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioBucket {
    pub ratio: CompressionRatio,
    pub num_rg: usize,
}

impl Sortable for RatioBucket {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Ratio, SortKey::RowGroups];

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::RowGroups => SortValue::Count(self.num_rg as u64),
            _ => SortValue::Count(self.ratio.tenths()),
        }
    }

    fn tie_break(&self) -> Option<SortValue> {
        Some(SortValue::Count(self.ratio.tenths()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MostCompressed<'a> {
    pub row_group: usize,
    pub chunk: &'a ColumnChunk,
    pub ratio: CompressionRatio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxRow {
    pub row_group: usize,
    pub min: Option<StatValue>,
    pub max: Option<StatValue>,
}

impl Sortable for MinMaxRow {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Position];

    fn sort_value(&self, _key: SortKey) -> SortValue {
        SortValue::Index(self.row_group)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Column not found in schema: {path}")]
pub struct ColumnNotFoundError {
    pub path: String,
}

/// Sums `value` per key, keeping keys in first-seen order.
fn sum_in_first_seen_order<K, I>(items: I) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, u64)>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut sums: Vec<(K, u64)> = Vec::new();

    for (key, value) in items {
        match slots.get(&key) {
            Some(&slot) => sums[slot].1 += value,
            None => {
                slots.insert(key.clone(), sums.len());
                sums.push((key, value));
            }
        }
    }

    sums
}

pub fn records_per_row_group(file: &FileMetadata) -> Vec<RecordBucket> {
    let counts = sum_in_first_seen_order(
        file.row_groups()
            .iter()
            .map(|row_group| (row_group.num_rows(), 1)),
    );

    counts
        .into_iter()
        .enumerate()
        .map(|(position, (num_records, num_rg))| RecordBucket {
            num_records,
            num_rg: num_rg as usize,
            position,
        })
        .collect()
}

pub fn column_sizes(file: &FileMetadata) -> Vec<ColumnSize> {
    sum_in_first_seen_order(
        file.chunks()
            .map(|(_, chunk)| (chunk.path().to_string(), chunk.compressed_size())),
    )
    .into_iter()
    .enumerate()
    .map(|(position, (column, bytes))| ColumnSize {
        column,
        bytes,
        position,
    })
    .collect()
}

pub fn type_sizes(file: &FileMetadata) -> Vec<TypeSize> {
    sum_in_first_seen_order(
        file.chunks()
            .map(|(_, chunk)| (chunk.physical_type(), chunk.compressed_size())),
    )
    .into_iter()
    .enumerate()
    .map(|(position, (physical_type, bytes))| TypeSize {
        physical_type,
        bytes,
        position,
    })
    .collect()
}

pub fn type_column_sizes(file: &FileMetadata) -> Vec<TypeColumnSize> {
    sum_in_first_seen_order(file.chunks().map(|(_, chunk)| {
        (
            (chunk.physical_type(), chunk.path().to_string()),
            chunk.compressed_size(),
        )
    }))
    .into_iter()
    .map(|((physical_type, column), bytes)| TypeColumnSize {
        physical_type,
        column,
        bytes,
    })
    .collect()
}

/// Distinct codec names, lexicographic.
pub fn schemes(file: &FileMetadata) -> Vec<String> {
    file.chunks()
        .map(|(_, chunk)| chunk.compression().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One row per chunk in row-group-then-column order. Chunks that stored
/// nothing compressed have no ratio and are skipped.
pub fn ratios_by_row_group_column(file: &FileMetadata) -> Vec<ChunkRatio> {
    file.chunks()
        .filter_map(|(row_group, chunk)| {
            CompressionRatio::new(chunk.compressed_size(), chunk.uncompressed_size()).map(|ratio| {
                (row_group.index(), chunk, ratio)
            })
        })
        .enumerate()
        .map(|(position, (row_group, chunk, ratio))| ChunkRatio {
            row_group,
            column: chunk.path().to_string(),
            compressed: chunk.compressed_size(),
            uncompressed: chunk.uncompressed_size(),
            ratio,
            position,
        })
        .collect()
}

/// Counts row groups per whole-row-group ratio bucket, buckets ascending.
pub fn ratio_histogram(file: &FileMetadata) -> Vec<RatioBucket> {
    let mut buckets: BTreeMap<CompressionRatio, usize> = BTreeMap::new();

    for row_group in file.row_groups() {
        if let Some(ratio) =
            CompressionRatio::new(row_group.compressed_size(), row_group.uncompressed_size())
        {
            *buckets.entry(ratio).or_insert(0) += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(ratio, num_rg)| RatioBucket { ratio, num_rg })
        .collect()
}

/// Chunk with the highest exact ratio among those with at least `min_size`
/// uncompressed bytes. Ties go to the larger chunk, then the earlier one.
pub fn most_compressed(file: &FileMetadata, min_size: u64) -> Option<MostCompressed<'_>> {
    let mut best: Option<(usize, &ColumnChunk)> = None;

    for (row_group, chunk) in file.chunks() {
        if chunk.uncompressed_size() < min_size || chunk.compressed_size() == 0 {
            continue;
        }

        let wins = match best {
            None => true,
            Some((_, current)) => {
                let by_ratio = compare_exact(
                    chunk.compressed_size(),
                    chunk.uncompressed_size(),
                    current.compressed_size(),
                    current.uncompressed_size(),
                );
                by_ratio
                    .then_with(|| chunk.uncompressed_size().cmp(&current.uncompressed_size()))
                    == Ordering::Greater
            }
        };

        if wins {
            best = Some((row_group.index(), chunk));
        }
    }

    best.and_then(|(row_group, chunk)| {
        CompressionRatio::new(chunk.compressed_size(), chunk.uncompressed_size())
            .map(|ratio| MostCompressed {
                row_group,
                chunk,
                ratio,
            })
    })
}

/// Per-row-group statistics bounds of one column, in row-group order.
pub fn min_max(file: &FileMetadata, column: &str) -> Result<Vec<MinMaxRow>, ColumnNotFoundError> {
    if !file.has_column(column) {
        return Err(ColumnNotFoundError {
            path: column.to_string(),
        });
    }

    Ok(file
        .row_groups()
        .iter()
        .map(|row_group| {
            let statistics = row_group.column(column).and_then(ColumnChunk::statistics);
            MinMaxRow {
                row_group: row_group.index(),
                min: statistics.and_then(|s| s.min()).cloned(),
                max: statistics.and_then(|s| s.max()).cloned(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RowGroup, SchemaColumn};
    use crate::sort::{sort_rows, SortSpec};
    use crate::statistics::Statistics;

    fn chunk(path: &str, compressed: u64, uncompressed: u64) -> ColumnChunk {
        ColumnChunk::new(path, PhysicalType::Int64, "ZSTD", compressed, uncompressed)
    }

    fn file(row_groups: Vec<Vec<ColumnChunk>>, rows: &[u64]) -> FileMetadata {
        let row_groups: Vec<RowGroup> = row_groups
            .into_iter()
            .zip(rows)
            .enumerate()
            .map(|(index, (columns, rows))| RowGroup::new(index, *rows, 0, columns))
            .collect();
        let mut schema: Vec<SchemaColumn> = Vec::new();
        for row_group in &row_groups {
            for chunk in row_group.columns() {
                if !schema.iter().any(|c| c.path() == chunk.path()) {
                    schema.push(SchemaColumn::new(chunk.path(), chunk.physical_type()));
                }
            }
        }
        let total = rows.iter().sum();
        FileMetadata::new(2, total, schema, row_groups)
    }

    fn two_row_group_file() -> FileMetadata {
        file(
            vec![vec![chunk("x", 74789, 503536)], vec![chunk("x", 1000, 1000)]],
            &[100, 100],
        )
    }

    #[test]
    fn test_ratios_by_row_group_column_scenario() {
        let ratios = ratios_by_row_group_column(&two_row_group_file());

        let rendered: Vec<(usize, &str, u64, u64, String)> = ratios
            .iter()
            .map(|r| {
                (
                    r.row_group,
                    r.column.as_str(),
                    r.compressed,
                    r.uncompressed,
                    r.ratio.to_string(),
                )
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                (0, "x", 74789, 503536, "6.7:1".to_string()),
                (1, "x", 1000, 1000, "1.0:1".to_string()),
            ]
        );
    }

    #[test]
    fn test_ratios_skip_zero_compressed_chunks() {
        let file = file(vec![vec![chunk("x", 0, 10), chunk("y", 5, 10)]], &[1]);
        let ratios = ratios_by_row_group_column(&file);

        assert_eq!(ratios.len(), 1);
        assert_eq!(ratios[0].column, "y");
        assert!(ratios.iter().all(|r| r.compressed > 0));
    }

    #[test]
    fn test_records_per_row_group_buckets_equal_counts() {
        let file = file(
            vec![vec![], vec![], vec![], vec![]],
            &[1000, 1000, 250, 1000],
        );

        let buckets = records_per_row_group(&file);

        assert_eq!(
            buckets,
            vec![
                RecordBucket { num_records: 1000, num_rg: 3, position: 0 },
                RecordBucket { num_records: 250, num_rg: 1, position: 1 },
            ]
        );
        let total: usize = buckets.iter().map(|b| b.num_rg).sum();
        assert_eq!(total, file.num_row_groups());
    }

    #[test]
    fn test_records_sorted_by_records_descending() {
        let file = file(vec![vec![], vec![], vec![]], &[5, 50, 5]);
        let mut buckets = records_per_row_group(&file);

        sort_rows(&mut buckets, SortSpec::new(SortKey::Records, false)).unwrap();

        assert_eq!(buckets[0].num_records, 50);
        assert_eq!(buckets[1].num_records, 5);
    }

    #[test]
    fn test_column_sizes_sum_across_row_groups() {
        let file = file(
            vec![
                vec![chunk("a", 10, 20), chunk("b", 1, 1)],
                vec![chunk("a", 5, 20)],
            ],
            &[1, 1],
        );

        let sizes = column_sizes(&file);

        assert_eq!(sizes.len(), 2);
        assert_eq!((sizes[0].column.as_str(), sizes[0].bytes), ("a", 15));
        assert_eq!((sizes[1].column.as_str(), sizes[1].bytes), ("b", 1));
    }

    #[test]
    fn test_nested_paths_are_not_conflated() {
        let file = file(
            vec![vec![
                chunk("sources.list.element.confidence", 7, 7),
                chunk("names.list.element.confidence", 3, 3),
            ]],
            &[1],
        );

        let sizes = column_sizes(&file);

        assert_eq!(sizes.len(), 2);
    }

    #[test]
    fn test_type_sizes_sum_to_file_total() {
        let file = file(
            vec![vec![
                chunk("a", 10, 20),
                ColumnChunk::new("b", PhysicalType::ByteArray, "SNAPPY", 30, 40),
                ColumnChunk::new("c", PhysicalType::ByteArray, "SNAPPY", 2, 4),
            ]],
            &[1],
        );

        let types = type_sizes(&file);

        assert_eq!(types.len(), 2);
        assert_eq!(types[1].physical_type, PhysicalType::ByteArray);
        assert_eq!(types[1].bytes, 32);
        let total: u64 = types.iter().map(|t| t.bytes).sum();
        assert_eq!(total, file.total_compressed_size());
    }

    #[test]
    fn test_type_column_sizes_keep_columns_under_type() {
        let file = file(
            vec![
                vec![chunk("a", 10, 20), ColumnChunk::new("s", PhysicalType::ByteArray, "SNAPPY", 3, 4)],
                vec![chunk("a", 1, 2)],
            ],
            &[1, 1],
        );

        let sizes = type_column_sizes(&file);

        assert_eq!(
            sizes,
            vec![
                TypeColumnSize { physical_type: PhysicalType::Int64, column: "a".to_string(), bytes: 11 },
                TypeColumnSize { physical_type: PhysicalType::ByteArray, column: "s".to_string(), bytes: 3 },
            ]
        );
    }

    #[test]
    fn test_schemes_are_sorted_and_deduplicated() {
        let file = file(
            vec![vec![
                ColumnChunk::new("a", PhysicalType::Int32, "ZSTD", 1, 1),
                ColumnChunk::new("b", PhysicalType::Int32, "ZSTD", 1, 1),
                ColumnChunk::new("c", PhysicalType::Int32, "SNAPPY", 1, 1),
            ]],
            &[1],
        );

        assert_eq!(schemes(&file), vec!["SNAPPY".to_string(), "ZSTD".to_string()]);
    }

    #[test]
    fn test_ratio_histogram_counts_row_groups() {
        let file = file(
            vec![
                vec![chunk("a", 10, 20), chunk("b", 10, 20)],
                vec![chunk("a", 5, 10)],
                vec![chunk("a", 10, 50)],
                vec![chunk("a", 0, 50)],
            ],
            &[1, 1, 1, 1],
        );

        let histogram = ratio_histogram(&file);

        assert_eq!(
            histogram,
            vec![
                RatioBucket { ratio: CompressionRatio::from_tenths(20), num_rg: 2 },
                RatioBucket { ratio: CompressionRatio::from_tenths(50), num_rg: 1 },
            ]
        );
    }

    #[test]
    fn test_ratio_histogram_ties_break_by_bucket() {
        let file = file(
            vec![
                vec![chunk("a", 10, 50)],
                vec![chunk("a", 10, 20)],
                vec![chunk("a", 10, 30)],
                vec![chunk("a", 10, 30)],
            ],
            &[1, 1, 1, 1],
        );
        let mut histogram = ratio_histogram(&file);

        sort_rows(&mut histogram, SortSpec::new(SortKey::RowGroups, true)).unwrap();

        let order: Vec<String> = histogram.iter().map(|b| b.ratio.to_string()).collect();
        assert_eq!(order, vec!["2.0:1", "5.0:1", "3.0:1"]);
    }

    #[test]
    fn test_most_compressed_picks_highest_ratio() {
        let file = file(
            vec![
                vec![chunk("a", 10, 20), chunk("b", 10, 90)],
                vec![chunk("a", 10, 50)],
            ],
            &[1, 1],
        );

        let best = most_compressed(&file, 0).unwrap();

        assert_eq!(best.row_group, 0);
        assert_eq!(best.chunk.path(), "b");
        assert_eq!(best.ratio.to_string(), "9.0:1");
    }

    #[test]
    fn test_most_compressed_respects_floor() {
        let file = file(
            vec![vec![chunk("small", 1, 90), chunk("large", 100, 400)]],
            &[1],
        );

        let best = most_compressed(&file, 100).unwrap();

        assert_eq!(best.chunk.path(), "large");
        assert!(best.chunk.uncompressed_size() >= 100);
    }

    #[test]
    fn test_most_compressed_tie_prefers_larger_then_first() {
        let file = file(
            vec![
                vec![chunk("first", 10, 40), chunk("bigger", 100, 400)],
                vec![chunk("later", 100, 400)],
            ],
            &[1, 1],
        );

        let best = most_compressed(&file, 0).unwrap();

        assert_eq!((best.row_group, best.chunk.path()), (0, "bigger"));
    }

    #[test]
    fn test_most_compressed_floor_can_exclude_everything() {
        assert!(most_compressed(&two_row_group_file(), 10_000_000).is_none());
    }

    #[test]
    fn test_min_max_reports_missing_statistics_as_unavailable() {
        let with_stats = chunk("x", 1, 1).with_statistics(Statistics::new(
            Some(StatValue::Int(1)),
            Some(StatValue::Int(9)),
        ));
        let file = file(vec![vec![with_stats], vec![chunk("x", 1, 1)]], &[1, 1]);

        let rows = min_max(&file, "x").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].min, Some(StatValue::Int(1)));
        assert_eq!(rows[0].max, Some(StatValue::Int(9)));
        assert_eq!(rows[1].min, None);
        assert_eq!(rows[1].max, None);
    }

    #[test]
    fn test_min_max_unknown_column_fails() {
        let err = min_max(&two_row_group_file(), "schemes").unwrap_err();
        assert_eq!(err.path, "schemes");
    }
}
