pub mod aggregate;
pub mod config;
pub mod model;
pub mod ratio;
pub mod sort;
pub mod statistics;

pub use aggregate::{
    ChunkRatio, ColumnNotFoundError, ColumnSize, MinMaxRow, MostCompressed, RatioBucket,
    RecordBucket, TypeColumnSize, TypeSize,
};
pub use config::{ConfigurationError, MinSize};
pub use model::{ColumnChunk, FileMetadata, PhysicalType, RowGroup, SchemaColumn};
pub use ratio::CompressionRatio;
pub use sort::{SortKey, SortOrder, SortSpec, Sortable};
pub use statistics::{StatValue, Statistics};
