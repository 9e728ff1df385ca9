use crate::statistics::Statistics;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray,
}

impl PhysicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Int32 => "INT32",
            PhysicalType::Int64 => "INT64",
            PhysicalType::Int96 => "INT96",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::ByteArray => "BYTE_ARRAY",
            PhysicalType::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "BOOLEAN" => Some(PhysicalType::Boolean),
            "INT32" => Some(PhysicalType::Int32),
            "INT64" => Some(PhysicalType::Int64),
            "INT96" => Some(PhysicalType::Int96),
            "FLOAT" => Some(PhysicalType::Float),
            "DOUBLE" => Some(PhysicalType::Double),
            "BYTE_ARRAY" => Some(PhysicalType::ByteArray),
            "FIXED_LEN_BYTE_ARRAY" => Some(PhysicalType::FixedLenByteArray),
            _ => None,
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf column as declared in the file schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    path: String,
    physical_type: PhysicalType,
}

impl SchemaColumn {
    pub fn new(path: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self {
            path: path.into(),
            physical_type,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }
}

/// Storage of one column inside one row group.
///
/// `path` is the fully qualified, dot-joined schema path, so
/// `a.list.element.x` and `b.list.element.x` are distinct columns.
/// Compressed size is not required to be smaller than the uncompressed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChunk {
    path: String,
    physical_type: PhysicalType,
    compression: String,
    compressed_size: u64,
    uncompressed_size: u64,
    encodings: Vec<String>,
    num_values: u64,
    data_page_offset: u64,
    dictionary_page_offset: Option<u64>,
    statistics: Option<Statistics>,
}

impl ColumnChunk {
    pub fn new(
        path: impl Into<String>,
        physical_type: PhysicalType,
        compression: impl Into<String>,
        compressed_size: u64,
        uncompressed_size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            physical_type,
            compression: compression.into(),
            compressed_size,
            uncompressed_size,
            encodings: Vec::new(),
            num_values: 0,
            data_page_offset: 0,
            dictionary_page_offset: None,
            statistics: None,
        }
    }

    pub fn with_encodings(mut self, encodings: Vec<String>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_num_values(mut self, num_values: u64) -> Self {
        self.num_values = num_values;
        self
    }

    pub fn with_page_offsets(mut self, data_page: u64, dictionary_page: Option<u64>) -> Self {
        self.data_page_offset = data_page;
        self.dictionary_page_offset = dictionary_page;
        self
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    pub fn compression(&self) -> &str {
        &self.compression
    }

    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }

    pub fn num_values(&self) -> u64 {
        self.num_values
    }

    pub fn data_page_offset(&self) -> u64 {
        self.data_page_offset
    }

    pub fn dictionary_page_offset(&self) -> Option<u64> {
        self.dictionary_page_offset
    }

    pub fn has_dictionary_page(&self) -> bool {
        self.dictionary_page_offset.is_some()
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowGroup {
    index: usize,
    num_rows: u64,
    total_byte_size: u64,
    columns: Vec<ColumnChunk>,
}

impl RowGroup {
    pub fn new(index: usize, num_rows: u64, total_byte_size: u64, columns: Vec<ColumnChunk>) -> Self {
        Self {
            index,
            num_rows,
            total_byte_size,
            columns,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn total_byte_size(&self) -> u64 {
        self.total_byte_size
    }

    pub fn columns(&self) -> &[ColumnChunk] {
        &self.columns
    }

    pub fn column(&self, path: &str) -> Option<&ColumnChunk> {
        self.columns.iter().find(|chunk| chunk.path() == path)
    }

    pub fn compressed_size(&self) -> u64 {
        self.columns.iter().map(ColumnChunk::compressed_size).sum()
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.columns.iter().map(ColumnChunk::uncompressed_size).sum()
    }
}

/// Parsed footer of one file. Built once per command, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    created_by: Option<String>,
    version: i32,
    num_rows: u64,
    footer_size: Option<u64>,
    schema: Vec<SchemaColumn>,
    row_groups: Vec<RowGroup>,
}

impl FileMetadata {
    pub fn new(
        version: i32,
        num_rows: u64,
        schema: Vec<SchemaColumn>,
        row_groups: Vec<RowGroup>,
    ) -> Self {
        Self {
            created_by: None,
            version,
            num_rows,
            footer_size: None,
            schema,
            row_groups,
        }
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn with_footer_size(mut self, footer_size: u64) -> Self {
        self.footer_size = Some(footer_size);
        self
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    pub fn num_row_groups(&self) -> usize {
        self.row_groups.len()
    }

    pub fn footer_size(&self) -> Option<u64> {
        self.footer_size
    }

    pub fn schema(&self) -> &[SchemaColumn] {
        &self.schema
    }

    pub fn row_groups(&self) -> &[RowGroup] {
        &self.row_groups
    }

    /// True when the path names a schema column or appears in any row group.
    pub fn has_column(&self, path: &str) -> bool {
        self.schema.iter().any(|column| column.path() == path)
            || self
                .row_groups
                .iter()
                .any(|row_group| row_group.column(path).is_some())
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&RowGroup, &ColumnChunk)> {
        self.row_groups
            .iter()
            .flat_map(|row_group| row_group.columns().iter().map(move |chunk| (row_group, chunk)))
    }

    pub fn total_compressed_size(&self) -> u64 {
        self.row_groups.iter().map(RowGroup::compressed_size).sum()
    }
}
