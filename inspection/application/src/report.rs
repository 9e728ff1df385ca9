//! Turns aggregated views into printable reports or chart series.

use inspection_domain::{
    ChunkRatio, ColumnSize, FileMetadata, MinMaxRow, MostCompressed, RatioBucket, RecordBucket,
    StatValue, TypeColumnSize, TypeSize,
};
use serde::Serialize;
use std::fmt;
use tabled::builder::Builder;
use tabled::settings::Style;

const OTHER_LABEL: &str = "Other";
const UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Table(Table),
    Summary(Summary),
    List(Vec<String>),
    Detail { headline: String, summary: Summary },
    Series(Series),
    /// A filter left nothing to report.
    Empty(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|header| header.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(self.headers.clone());
        for row in &self.rows {
            builder.push_record(row.clone());
        }

        let mut table = builder.build();
        table.with(Style::markdown());
        write!(f, "{}", table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    title: String,
    fields: Vec<(String, String)>,
}

impl Summary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(candidate, _)| candidate.trim_start() == key)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for (key, value) in &self.fields {
            if value.is_empty() {
                write!(f, "\n  {}:", key)?;
            } else {
                write!(f, "\n  {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Sunburst,
    Heatmap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub group: String,
    pub label: String,
    pub value: f64,
}

/// Flat label/value data handed to an external chart template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub chart: ChartKind,
    pub points: Vec<SeriesPoint>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Table(table) => write!(f, "{}", table),
            Report::Summary(summary) => write!(f, "{}", summary),
            Report::List(items) => write!(f, "{}", items.join("\n")),
            Report::Detail { headline, summary } => write!(f, "{}\n\n{}", headline, summary),
            Report::Series(series) => {
                let json = serde_json::to_string_pretty(series).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Report::Empty(message) => f.write_str(message),
        }
    }
}

/// Decimal unit scaling with one decimal place: `1 Byte`, `40.4 kB`, `1.2 GB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes == 1 {
        return "1 Byte".to_string();
    }
    if bytes < 1000 {
        return format!("{} Bytes", bytes);
    }

    let mut value = bytes as f64;
    for unit in UNITS {
        value /= 1000.0;
        if value < 1000.0 {
            return format!("{:.1} {}", value, unit);
        }
    }
    format!("{:.1} EB", value)
}

/// Groups digits in thousands: `1234567` -> `1,234,567`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn stat_or_unavailable(value: Option<&StatValue>) -> String {
    value
        .map(StatValue::to_string)
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "None".to_string())
}

pub fn overall(file: &FileMetadata) -> Report {
    Report::Summary(
        Summary::new("File metadata")
            .field("created_by", file.created_by().unwrap_or("unknown"))
            .field("num_columns", file.num_columns())
            .field("num_rows", file.num_rows())
            .field("num_row_groups", file.num_row_groups())
            .field("format_version", file.version())
            .field(
                "serialized_size",
                file.footer_size()
                    .map(|size| size.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
    )
}

pub fn record_buckets(rows: &[RecordBucket]) -> Report {
    let mut table = Table::new(&["num_records", "num_rg"]);
    for row in rows {
        table.push_row(vec![
            format_count(row.num_records),
            format_count(row.num_rg as u64),
        ]);
    }
    Report::Table(table)
}

pub fn schemes(names: Vec<String>) -> Report {
    Report::List(names)
}

pub fn column_sizes(rows: &[ColumnSize]) -> Report {
    let mut table = Table::new(&["size", "column"]);
    for row in rows {
        table.push_row(vec![format_bytes(row.bytes), row.column.clone()]);
    }
    Report::Table(table)
}

pub fn type_sizes(rows: &[TypeSize]) -> Report {
    let mut table = Table::new(&["size", "type"]);
    for row in rows {
        table.push_row(vec![
            format_bytes(row.bytes),
            row.physical_type.as_str().to_string(),
        ]);
    }
    Report::Table(table)
}

pub fn chunk_ratios(rows: &[ChunkRatio]) -> Report {
    let mut table = Table::new(&["row_group", "column", "compressed", "uncompressed", "ratio"]);
    for row in rows {
        table.push_row(vec![
            row.row_group.to_string(),
            row.column.clone(),
            format_bytes(row.compressed),
            format_bytes(row.uncompressed),
            row.ratio.to_string(),
        ]);
    }
    Report::Table(table)
}

pub fn ratio_histogram(rows: &[RatioBucket]) -> Report {
    let mut table = Table::new(&["ratio", "num_rg"]);
    for row in rows {
        table.push_row(vec![row.ratio.to_string(), format_count(row.num_rg as u64)]);
    }
    Report::Table(table)
}

pub fn min_max(rows: &[MinMaxRow]) -> Report {
    let mut table = Table::new(&["rg_num", "min", "max"]);
    for row in rows {
        table.push_row(vec![
            row.row_group.to_string(),
            stat_or_unavailable(row.min.as_ref()),
            stat_or_unavailable(row.max.as_ref()),
        ]);
    }
    Report::Table(table)
}

pub fn most_compressed(found: Option<MostCompressed<'_>>, min_size: u64) -> Report {
    let Some(found) = found else {
        return Report::Empty(format!(
            "No column chunk with an uncompressed size of at least {} bytes",
            min_size
        ));
    };

    let chunk = found.chunk;
    let headline = format!(
        "From {} to {} (ratio of {})",
        format_bytes(chunk.uncompressed_size()),
        format_bytes(chunk.compressed_size()),
        found.ratio
    );

    let mut summary = Summary::new("Column chunk metadata")
        .field("row_group", found.row_group)
        .field("path_in_schema", chunk.path())
        .field("physical_type", chunk.physical_type())
        .field("num_values", chunk.num_values())
        .field("compression", chunk.compression())
        .field("encodings", format!("({})", chunk.encodings().join(", ")))
        .field("has_dictionary_page", chunk.has_dictionary_page())
        .field("dictionary_page_offset", optional(chunk.dictionary_page_offset()))
        .field("data_page_offset", chunk.data_page_offset())
        .field("total_compressed_size", chunk.compressed_size())
        .field("total_uncompressed_size", chunk.uncompressed_size())
        .field("is_stats_set", chunk.statistics().is_some());

    summary = match chunk.statistics() {
        Some(stats) => summary
            .field("statistics", "")
            .field("  has_min_max", stats.has_min_max())
            .field("  min", optional(stats.min()))
            .field("  max", optional(stats.max()))
            .field("  null_count", optional(stats.null_count()))
            .field("  distinct_count", optional(stats.distinct_count()))
            .field("  num_values", stats.num_values()),
        None => summary.field("statistics", "None"),
    };

    Report::Detail { headline, summary }
}

/// Type -> column hierarchy. Columns at or below `group_under` bytes are
/// folded into one "Other" slice per type.
pub fn type_sunburst(rows: &[TypeColumnSize], group_under: u64) -> Report {
    let mut groups: Vec<(String, Vec<(String, u64)>)> = Vec::new();

    for row in rows {
        let group = row.physical_type.as_str();
        let label = if row.bytes > group_under {
            row.column.as_str()
        } else {
            OTHER_LABEL
        };

        let slot = match groups.iter().position(|(name, _)| name.as_str() == group) {
            Some(slot) => slot,
            None => {
                groups.push((group.to_string(), Vec::new()));
                groups.len() - 1
            }
        };
        let children = &mut groups[slot].1;
        match children.iter_mut().find(|(name, _)| name.as_str() == label) {
            Some((_, bytes)) => *bytes += row.bytes,
            None => children.push((label.to_string(), row.bytes)),
        }
    }

    let points = groups
        .into_iter()
        .flat_map(|(group, children)| {
            children.into_iter().map(move |(label, bytes)| SeriesPoint {
                group: group.clone(),
                label,
                value: bytes as f64,
            })
        })
        .collect();

    Report::Series(Series {
        chart: ChartKind::Sunburst,
        points,
    })
}

/// Row group x column grid of compression ratios.
pub fn ratio_heatmap(rows: &[ChunkRatio]) -> Report {
    let points = rows
        .iter()
        .map(|row| SeriesPoint {
            group: row.row_group.to_string(),
            label: row.column.clone(),
            value: row.ratio.as_f64(),
        })
        .collect();

    Report::Series(Series {
        chart: ChartKind::Heatmap,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspection_domain::{ColumnChunk, CompressionRatio, PhysicalType, Statistics};

    #[test]
    fn test_format_bytes_uses_decimal_units() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(1), "1 Byte");
        assert_eq!(format_bytes(999), "999 Bytes");
        assert_eq!(format_bytes(40_400), "40.4 kB");
        assert_eq!(format_bytes(189_800_000), "189.8 MB");
        assert_eq!(format_bytes(1_200_000_000), "1.2 GB");
    }

    #[test]
    fn test_format_count_groups_thousands() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_table_renders_markdown_pipes() {
        let report = record_buckets(&[RecordBucket {
            num_records: 122880,
            num_rg: 3,
            position: 0,
        }]);

        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| num_records"));
        assert!(lines[1].starts_with("|-"));
        assert!(lines[2].contains("122,880"));
    }

    #[test]
    fn test_min_max_marks_missing_values() {
        let report = min_max(&[MinMaxRow {
            row_group: 0,
            min: None,
            max: Some(StatValue::Int(3)),
        }]);

        let Report::Table(table) = report else {
            panic!("expected a table");
        };
        assert_eq!(table.rows()[0], vec!["0", "unavailable", "3"]);
    }

    #[test]
    fn test_most_compressed_headline_and_dump() {
        let chunk = ColumnChunk::new("x", PhysicalType::Int64, "ZSTD", 74789, 503536)
            .with_encodings(vec!["PLAIN".to_string(), "RLE".to_string()])
            .with_statistics(Statistics::new(Some(StatValue::Int(1)), Some(StatValue::Int(9))));
        let found = MostCompressed {
            row_group: 0,
            chunk: &chunk,
            ratio: CompressionRatio::new(74789, 503536).unwrap(),
        };

        let rendered = most_compressed(Some(found), 0).to_string();

        assert!(rendered.starts_with("From 503.5 kB to 74.8 kB (ratio of 6.7:1)\n\n"));
        assert!(rendered.contains("  path_in_schema: x"));
        assert!(rendered.contains("  encodings: (PLAIN, RLE)"));
        assert!(rendered.contains("    min: 1"));
        assert!(rendered.contains("    distinct_count: None"));
    }

    #[test]
    fn test_most_compressed_nothing_found() {
        let report = most_compressed(None, 500);
        assert_eq!(
            report,
            Report::Empty("No column chunk with an uncompressed size of at least 500 bytes".to_string())
        );
    }

    #[test]
    fn test_sunburst_folds_small_columns_into_other() {
        let rows = vec![
            TypeColumnSize { physical_type: PhysicalType::Int64, column: "a".to_string(), bytes: 100 },
            TypeColumnSize { physical_type: PhysicalType::ByteArray, column: "s".to_string(), bytes: 5 },
            TypeColumnSize { physical_type: PhysicalType::Int64, column: "b".to_string(), bytes: 3 },
            TypeColumnSize { physical_type: PhysicalType::Int64, column: "c".to_string(), bytes: 4 },
        ];

        let Report::Series(series) = type_sunburst(&rows, 10) else {
            panic!("expected a series");
        };

        let points: Vec<(&str, &str, f64)> = series
            .points
            .iter()
            .map(|p| (p.group.as_str(), p.label.as_str(), p.value))
            .collect();
        assert_eq!(
            points,
            vec![
                ("INT64", "a", 100.0),
                ("INT64", "Other", 7.0),
                ("BYTE_ARRAY", "Other", 5.0),
            ]
        );
    }

    #[test]
    fn test_series_renders_as_json() {
        let report = Report::Series(Series {
            chart: ChartKind::Heatmap,
            points: vec![SeriesPoint {
                group: "0".to_string(),
                label: "x".to_string(),
                value: 6.7,
            }],
        });

        let json: serde_json::Value = serde_json::from_str(&report.to_string()).unwrap();

        assert_eq!(json["chart"], "heatmap");
        assert_eq!(json["points"][0]["label"], "x");
        assert_eq!(json["points"][0]["value"], 6.7);
    }
}
