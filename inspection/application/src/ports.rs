use inspection_domain::FileMetadata;
use shaku::Interface;
use std::path::Path;

/// Produces the footer model of a file. Implementations read only the
/// footer, never row data.
pub trait MetadataSource: Interface {
    fn load(&self, path: &Path) -> Result<FileMetadata, FormatError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid parquet file: {reason}")]
    InvalidFooter { path: String, reason: String },

    #[error("{path} has an invalid {field} in its footer: {value}")]
    InvalidValue {
        path: String,
        field: &'static str,
        value: i64,
    },
}
