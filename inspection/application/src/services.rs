use crate::ports::{FormatError, MetadataSource};
use crate::report::{self, Report};
use crate::request::{InspectionRequest, Operation};
use inspection_domain::aggregate;
use inspection_domain::sort::{sort_rows, Sortable};
use inspection_domain::{ColumnNotFoundError, ConfigurationError, FileMetadata, SortSpec};
use shaku::{Component, Interface};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub trait InspectionService: Interface {
    fn inspect(&self, request: &InspectionRequest) -> Result<Report, InspectionError>;
}

#[derive(Component)]
#[shaku(interface = InspectionService)]
pub struct InspectionServiceImpl {
    #[shaku(inject)]
    source: Arc<dyn MetadataSource>,
    /// Sunburst slices at or below this many bytes are merged into "Other".
    group_under: u64,
}

impl InspectionServiceImpl {
    pub fn new(source: Arc<dyn MetadataSource>, group_under: u64) -> Self {
        Self {
            source,
            group_under,
        }
    }

    fn build_report(
        &self,
        file: &FileMetadata,
        request: &InspectionRequest,
    ) -> Result<Report, InspectionError> {
        let sort = request.sort();

        let report = match request.operation() {
            Operation::Overall => report::overall(file),
            Operation::RowGroups => {
                report::record_buckets(&sorted(aggregate::records_per_row_group(file), sort)?)
            }
            Operation::Schemes => report::schemes(aggregate::schemes(file)),
            Operation::Sizes => report::column_sizes(&sorted(aggregate::column_sizes(file), sort)?),
            Operation::Types if request.html() => {
                report::type_sunburst(&aggregate::type_column_sizes(file), self.group_under)
            }
            Operation::Types => report::type_sizes(&sorted(aggregate::type_sizes(file), sort)?),
            Operation::MostCompressed => {
                let min_size = request.min_size().bytes();
                let found = aggregate::most_compressed(file, min_size);
                if found.is_none() {
                    warn!(
                        "No column chunk reaches the minimum size of {} bytes",
                        min_size
                    );
                }
                report::most_compressed(found, min_size)
            }
            Operation::Ratios => {
                report::ratio_histogram(&sorted(aggregate::ratio_histogram(file), sort)?)
            }
            Operation::RatiosByColumn => {
                let rows = sorted(aggregate::ratios_by_row_group_column(file), sort)?;
                if request.html() {
                    report::ratio_heatmap(&rows)
                } else {
                    report::chunk_ratios(&rows)
                }
            }
            Operation::MinMax { column } => {
                report::min_max(&sorted(aggregate::min_max(file, column)?, sort)?)
            }
        };

        Ok(report)
    }
}

impl InspectionService for InspectionServiceImpl {
    fn inspect(&self, request: &InspectionRequest) -> Result<Report, InspectionError> {
        info!(
            "Inspecting {} ({})",
            request.path().display(),
            request.operation().name()
        );

        let file = self.source.load(request.path())?;
        debug!(
            "Loaded footer: {} row groups, {} columns, {} rows, {} compressed bytes",
            file.num_row_groups(),
            file.num_columns(),
            file.num_rows(),
            file.total_compressed_size()
        );

        self.build_report(&file, request)
    }
}

fn sorted<T: Sortable>(mut rows: Vec<T>, sort: Option<SortSpec>) -> Result<Vec<T>, InspectionError> {
    if let Some(spec) = sort {
        sort_rows(&mut rows, spec)?;
    }
    Ok(rows)
}

#[derive(Debug, thiserror::Error)]
pub enum InspectionError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("{0}")]
    ColumnNotFound(#[from] ColumnNotFoundError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
