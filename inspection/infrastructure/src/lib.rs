pub mod readers;

pub use readers::ParquetFooterReader;
