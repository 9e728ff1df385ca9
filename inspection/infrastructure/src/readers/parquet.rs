use inspection_application::ports::{FormatError, MetadataSource};
use inspection_domain::{
    ColumnChunk, FileMetadata, PhysicalType, RowGroup, SchemaColumn, StatValue, Statistics,
};
use parquet::basic::{Compression, Type};
use parquet::file::metadata::{ColumnChunkMetaData, ParquetMetaData, RowGroupMetaData};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::statistics::Statistics as ParquetStatistics;
use shaku::Component;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info};

/// 4-byte little-endian footer length followed by the magic.
const FOOTER_TAIL_LEN: usize = 8;
const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// Reads only the footer of a parquet file; column pages are never touched.
#[derive(Component, Default)]
#[shaku(interface = MetadataSource)]
pub struct ParquetFooterReader {}

impl ParquetFooterReader {
    fn footer_length(mut file: &File) -> std::io::Result<Option<u64>> {
        let mut tail = [0u8; FOOTER_TAIL_LEN];
        file.seek(SeekFrom::End(-(FOOTER_TAIL_LEN as i64)))?;
        file.read_exact(&mut tail)?;

        if &tail[4..] != PARQUET_MAGIC {
            return Ok(None);
        }
        let length = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        Ok(Some(u64::from(length)))
    }

    fn convert(path: &Path, metadata: &ParquetMetaData) -> Result<FileMetadata, FormatError> {
        let file_metadata = metadata.file_metadata();

        let schema = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|column| {
                Ok(SchemaColumn::new(
                    column.path().string(),
                    Self::physical_type(path, column.physical_type())?,
                ))
            })
            .collect::<Result<Vec<_>, FormatError>>()?;

        let row_groups = metadata
            .row_groups()
            .iter()
            .enumerate()
            .map(|(index, row_group)| Self::convert_row_group(path, index, row_group))
            .collect::<Result<Vec<_>, _>>()?;

        let num_rows = Self::non_negative(path, "num_rows", file_metadata.num_rows())?;
        let mut converted = FileMetadata::new(file_metadata.version(), num_rows, schema, row_groups);
        if let Some(created_by) = file_metadata.created_by() {
            converted = converted.with_created_by(created_by);
        }

        Ok(converted)
    }

    fn convert_row_group(
        path: &Path,
        index: usize,
        row_group: &RowGroupMetaData,
    ) -> Result<RowGroup, FormatError> {
        let columns = row_group
            .columns()
            .iter()
            .map(|chunk| Self::convert_chunk(path, chunk))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Row group {}: {} rows, {} column chunks",
            index,
            row_group.num_rows(),
            columns.len()
        );

        Ok(RowGroup::new(
            index,
            Self::non_negative(path, "num_rows", row_group.num_rows())?,
            Self::non_negative(path, "total_byte_size", row_group.total_byte_size())?,
            columns,
        ))
    }

    fn convert_chunk(path: &Path, chunk: &ColumnChunkMetaData) -> Result<ColumnChunk, FormatError> {
        let num_values = Self::non_negative(path, "num_values", chunk.num_values())?;
        let data_page_offset =
            Self::non_negative(path, "data_page_offset", chunk.data_page_offset())?;
        let dictionary_page_offset = chunk
            .dictionary_page_offset()
            .map(|offset| Self::non_negative(path, "dictionary_page_offset", offset))
            .transpose()?;

        let mut converted = ColumnChunk::new(
            chunk.column_path().string(),
            Self::physical_type(path, chunk.column_type())?,
            codec_name(chunk.compression()),
            Self::non_negative(path, "total_compressed_size", chunk.compressed_size())?,
            Self::non_negative(path, "total_uncompressed_size", chunk.uncompressed_size())?,
        )
        .with_encodings(
            chunk
                .encodings()
                .into_iter()
                .map(|encoding| encoding.to_string())
                .collect(),
        )
        .with_num_values(num_values)
        .with_page_offsets(data_page_offset, dictionary_page_offset);

        if let Some(statistics) = chunk.statistics() {
            converted = converted.with_statistics(convert_statistics(statistics, num_values));
        }

        Ok(converted)
    }

    fn physical_type(path: &Path, physical_type: Type) -> Result<PhysicalType, FormatError> {
        PhysicalType::from_str(&physical_type.to_string()).ok_or_else(|| {
            FormatError::InvalidFooter {
                path: path.display().to_string(),
                reason: format!("unsupported physical type {}", physical_type),
            }
        })
    }

    fn non_negative(path: &Path, field: &'static str, value: i64) -> Result<u64, FormatError> {
        u64::try_from(value).map_err(|_| FormatError::InvalidValue {
            path: path.display().to_string(),
            field,
            value,
        })
    }
}

impl MetadataSource for ParquetFooterReader {
    fn load(&self, path: &Path) -> Result<FileMetadata, FormatError> {
        let unreadable = |source| FormatError::Unreadable {
            path: path.display().to_string(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        let reader = SerializedFileReader::new(file.try_clone().map_err(unreadable)?).map_err(
            |e| FormatError::InvalidFooter {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        )?;
        let footer_length = Self::footer_length(&file).map_err(unreadable)?;

        let mut metadata = Self::convert(path, reader.metadata())?;
        if let Some(length) = footer_length {
            metadata = metadata.with_footer_size(length);
        }

        info!(
            "Read footer of {}: {} row groups, {} columns",
            path.display(),
            metadata.num_row_groups(),
            metadata.num_columns()
        );

        Ok(metadata)
    }
}

fn codec_name(compression: Compression) -> &'static str {
    match compression {
        Compression::UNCOMPRESSED => "UNCOMPRESSED",
        Compression::SNAPPY => "SNAPPY",
        Compression::GZIP(_) => "GZIP",
        Compression::LZO => "LZO",
        Compression::BROTLI(_) => "BROTLI",
        Compression::LZ4 => "LZ4",
        Compression::ZSTD(_) => "ZSTD",
        Compression::LZ4_RAW => "LZ4_RAW",
    }
}

fn convert_statistics(statistics: &ParquetStatistics, num_values: u64) -> Statistics {
    let (min, max) = match statistics {
        ParquetStatistics::Boolean(s) => bounds(s.min_opt(), s.max_opt(), |v| StatValue::Bool(*v)),
        ParquetStatistics::Int32(s) => {
            bounds(s.min_opt(), s.max_opt(), |v| StatValue::Int(i64::from(*v)))
        }
        ParquetStatistics::Int64(s) => bounds(s.min_opt(), s.max_opt(), |v| StatValue::Int(*v)),
        ParquetStatistics::Int96(s) => bounds(s.min_opt(), s.max_opt(), |v| {
            StatValue::Text(format!("{:?}", v.data()))
        }),
        ParquetStatistics::Float(s) => {
            bounds(s.min_opt(), s.max_opt(), |v| StatValue::Double(f64::from(*v)))
        }
        ParquetStatistics::Double(s) => {
            bounds(s.min_opt(), s.max_opt(), |v| StatValue::Double(*v))
        }
        ParquetStatistics::ByteArray(s) => {
            bounds(s.min_opt(), s.max_opt(), |v| bytes_value(v.data()))
        }
        ParquetStatistics::FixedLenByteArray(s) => {
            bounds(s.min_opt(), s.max_opt(), |v| bytes_value(v.data()))
        }
    };

    Statistics::new(min, max)
        .with_null_count(statistics.null_count_opt())
        .with_distinct_count(statistics.distinct_count_opt())
        .with_num_values(num_values)
}

fn bounds<T>(
    min: Option<&T>,
    max: Option<&T>,
    convert: impl Fn(&T) -> StatValue,
) -> (Option<StatValue>, Option<StatValue>) {
    (min.map(&convert), max.map(&convert))
}

/// UTF-8 text when it decodes, upper-case hex otherwise.
fn bytes_value(bytes: &[u8]) -> StatValue {
    match std::str::from_utf8(bytes) {
        Ok(text) => StatValue::Text(text.to_string()),
        Err(_) => StatValue::Text(bytes.iter().map(|b| format!("{:02X}", b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::basic::ZstdLevel;

    #[test]
    fn test_codec_names_drop_levels() {
        assert_eq!(codec_name(Compression::ZSTD(ZstdLevel::default())), "ZSTD");
        assert_eq!(codec_name(Compression::SNAPPY), "SNAPPY");
        assert_eq!(codec_name(Compression::UNCOMPRESSED), "UNCOMPRESSED");
    }

    #[test]
    fn test_bytes_value_falls_back_to_hex() {
        assert_eq!(bytes_value(b"abc"), StatValue::Text("abc".to_string()));
        assert_eq!(bytes_value(&[0xff, 0x01]), StatValue::Text("FF01".to_string()));
    }

    #[test]
    fn test_negative_sizes_are_rejected() {
        let err = ParquetFooterReader::non_negative(Path::new("f.parquet"), "num_rows", -1)
            .unwrap_err();

        assert!(matches!(
            err,
            FormatError::InvalidValue {
                field: "num_rows",
                value: -1,
                ..
            }
        ));
    }
}
