use inspection_domain::sort::{ensure_supported, SortKey, SortSpec, Sortable};
use inspection_domain::{
    ChunkRatio, ColumnSize, ConfigurationError, MinMaxRow, MinSize, RatioBucket, RecordBucket,
    TypeSize,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Overall,
    RowGroups,
    Schemes,
    Sizes,
    Types,
    MostCompressed,
    Ratios,
    RatiosByColumn,
    MinMax { column: String },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Overall => "overall",
            Operation::RowGroups => "row-groups",
            Operation::Schemes => "schemes",
            Operation::Sizes => "sizes",
            Operation::Types => "types",
            Operation::MostCompressed => "most-compressed",
            Operation::Ratios => "ratios",
            Operation::RatiosByColumn => "ratios-by-column",
            Operation::MinMax { .. } => "minmax",
        }
    }

    /// Sort keys of the view this operation produces, default first.
    pub fn sort_keys(&self) -> &'static [SortKey] {
        match self {
            Operation::RowGroups => RecordBucket::SORT_KEYS,
            Operation::Sizes => ColumnSize::SORT_KEYS,
            Operation::Types => TypeSize::SORT_KEYS,
            Operation::Ratios => RatioBucket::SORT_KEYS,
            Operation::RatiosByColumn => ChunkRatio::SORT_KEYS,
            Operation::MinMax { .. } => MinMaxRow::SORT_KEYS,
            Operation::Overall | Operation::Schemes | Operation::MostCompressed => &[],
        }
    }

    pub fn supports_html(&self) -> bool {
        matches!(self, Operation::Types | Operation::RatiosByColumn)
    }
}

/// A validated command. Building one never touches the file, so bad
/// parameters are rejected before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionRequest {
    path: PathBuf,
    operation: Operation,
    sort: Option<SortSpec>,
    min_size: MinSize,
    html: bool,
}

impl InspectionRequest {
    pub fn new(path: impl Into<PathBuf>, operation: Operation) -> Self {
        let sort = operation
            .sort_keys()
            .first()
            .map(|key| SortSpec::new(*key, false));

        Self {
            path: path.into(),
            operation,
            sort,
            min_size: MinSize::default(),
            html: false,
        }
    }

    pub fn with_sort(
        mut self,
        sort_key: Option<&str>,
        reverse: bool,
    ) -> Result<Self, ConfigurationError> {
        if sort_key.is_none() && !reverse {
            return Ok(self);
        }

        let supported = self.operation.sort_keys();
        let key = match sort_key {
            Some(name) => SortKey::parse(name)?,
            None => match supported.first() {
                Some(key) => *key,
                None => {
                    return Err(ConfigurationError::SortNotSupported(
                        self.operation.name().to_string(),
                    ))
                }
            },
        };
        ensure_supported(key, supported, self.operation.name())?;

        self.sort = Some(SortSpec::new(key, reverse));
        Ok(self)
    }

    pub fn with_min_size(mut self, bytes: i64) -> Result<Self, ConfigurationError> {
        self.min_size = MinSize::new(bytes)?;
        Ok(self)
    }

    pub fn with_html(mut self, html: bool) -> Result<Self, ConfigurationError> {
        if html && !self.operation.supports_html() {
            return Err(ConfigurationError::HtmlNotSupported(
                self.operation.name().to_string(),
            ));
        }
        self.html = html;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn min_size(&self) -> MinSize {
        self.min_size
    }

    pub fn html(&self) -> bool {
        self.html
    }
}
