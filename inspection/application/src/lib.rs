pub mod ports;
pub mod report;
pub mod request;
pub mod services;

pub use ports::{FormatError, MetadataSource};
pub use report::{ChartKind, Report, Series, SeriesPoint, Summary, Table};
pub use request::{InspectionRequest, Operation};
pub use services::{InspectionError, InspectionService, InspectionServiceImpl};
